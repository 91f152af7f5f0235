use crate::adapters::http::build_client;
use crate::adapters::llm::build_generator;
use crate::adapters::providers::{CatalogStore, EdxProvider, MitOcwProvider, OpenStaxProvider};
use crate::config::toml_config::AppConfig;
use crate::core::aggregator::Aggregator;
use crate::core::planner::PathPlanner;
use crate::core::quiz::QuizMaster;
use crate::core::ranker::{Ranker, Ranking};
use crate::domain::model::{
    CourseDetails, CourseQuery, CourseRecord, DifficultyFilter, LearningPath, Quiz, QuizGrade, QuizSubmission,
    RankedCourse, UserProfile,
};
use crate::domain::ports::{CourseProvider, TextGenerator};
use crate::utils::error::Result;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const TRENDING_TOPICS: [&str; 4] = ["python", "machine learning", "data science", "web development"];
const TRENDING_PER_TOPIC: usize = 3;
const TRENDING_LIMIT: usize = 10;

/// Tunables shared by the engine's components.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub provider_timeout: Duration,
    pub generation_timeout: Duration,
    pub top_k: usize,
    pub max_results: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl EngineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            provider_timeout: config.providers.timeout(),
            generation_timeout: config.llm.timeout(),
            top_k: config.ranking.top_k,
            max_results: config.providers.max_results,
        }
    }
}

/// 組合根：把 providers、generator 與各個元件接在一起。
///
/// Every dependency is constructed once and injected; nothing here is global.
pub struct LearningEngine {
    aggregator: Aggregator,
    trending_source: Option<Arc<dyn CourseProvider>>,
    catalog: CatalogStore,
    ranker: Ranker,
    planner: PathPlanner,
    quiz: QuizMaster,
    settings: EngineSettings,
}

impl LearningEngine {
    pub fn new(
        providers: Vec<Arc<dyn CourseProvider>>,
        trending_source: Option<Arc<dyn CourseProvider>>,
        generator: Arc<dyn TextGenerator>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            aggregator: Aggregator::new(providers, settings.provider_timeout),
            trending_source,
            catalog: CatalogStore::new(),
            ranker: Ranker::new(generator.clone(), settings.generation_timeout),
            planner: PathPlanner::new(generator.clone(), settings.generation_timeout),
            quiz: QuizMaster::new(generator, settings.generation_timeout),
            settings,
        }
    }

    /// Builds providers in the order edX, MIT OCW, OpenStax, catalog, skipping
    /// disabled ones. Each remote provider gets its own HTTP client.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let providers_config = &config.providers;
        let mut providers: Vec<Arc<dyn CourseProvider>> = Vec::new();
        let mut edx: Option<Arc<dyn CourseProvider>> = None;

        if providers_config.enable_edx {
            let provider: Arc<dyn CourseProvider> = Arc::new(EdxProvider::new(
                build_client(providers_config.timeout())?,
                &providers_config.edx_endpoint,
                providers_config.page_size,
            ));
            edx = Some(provider.clone());
            providers.push(provider);
        }
        if providers_config.enable_mit_ocw {
            providers.push(Arc::new(MitOcwProvider::new(
                build_client(providers_config.timeout())?,
                &providers_config.mit_ocw_endpoint,
            )));
        }
        if providers_config.enable_openstax {
            providers.push(Arc::new(OpenStaxProvider::new(
                build_client(providers_config.timeout())?,
                &providers_config.openstax_endpoint,
            )));
        }
        if providers_config.enable_catalog {
            providers.push(Arc::new(CatalogStore::new()));
        }

        let generator = build_generator(&config.llm)?;
        let engine = Self::new(providers, edx, generator, EngineSettings::from_config(config));

        info!(
            "🚀 Learning engine ready with providers [{}]",
            engine
                .aggregator
                .providers()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(engine)
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Full aggregated listing.
    pub async fn search(&self, query: &CourseQuery) -> Vec<CourseRecord> {
        self.aggregator.aggregate(query).await
    }

    /// Aggregated listing capped at `max_results`.
    pub async fn list_courses(&self, query: &CourseQuery) -> Vec<CourseRecord> {
        let mut courses = self.search(query).await;
        courses.truncate(self.settings.max_results);
        courses
    }

    /// Aggregates, then ranks. `top_k` defaults to the configured value.
    pub async fn recommend(
        &self,
        query: &CourseQuery,
        profile: Option<&UserProfile>,
        top_k: Option<usize>,
    ) -> Ranking {
        let candidates = self.search(query).await;
        let k = top_k.unwrap_or(self.settings.top_k);
        self.ranker.rank_with_outcome(profile, &candidates, k).await
    }

    /// 熱門課程：並行查詢固定主題，每個主題取前三筆，依評分排序後取前十筆
    pub async fn trending(&self) -> Vec<CourseRecord> {
        let Some(source) = &self.trending_source else {
            return self.catalog.trending();
        };

        let searches = TRENDING_TOPICS.iter().map(|topic| {
            let query = CourseQuery::new(*topic, "en", DifficultyFilter::All);
            let source = source.clone();
            let timeout = self.settings.provider_timeout;
            async move {
                match tokio::time::timeout(timeout, source.search(&query)).await {
                    Ok(courses) => courses,
                    Err(_) => {
                        warn!(topic = %query.query, "Trending search timed out");
                        Vec::new()
                    }
                }
            }
        });

        let mut courses: Vec<CourseRecord> = join_all(searches)
            .await
            .into_iter()
            .flat_map(|group| group.into_iter().take(TRENDING_PER_TOPIC))
            .collect();

        if courses.is_empty() {
            warn!("Trending searches returned nothing, serving the static list");
            return self.catalog.trending();
        }

        courses.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        courses.truncate(TRENDING_LIMIT);
        for course in &mut courses {
            course.trending = Some(true);
        }
        courses
    }

    pub fn details(&self, course_id: &str) -> CourseDetails {
        self.catalog.details(course_id)
    }

    pub async fn plan(&self, profile: &UserProfile, courses: &[RankedCourse]) -> LearningPath {
        self.planner.plan(profile, courses).await
    }

    pub async fn generate_quiz(&self, course_id: &str, module_id: &str, difficulty: &str) -> Quiz {
        self.quiz.generate_quiz(course_id, module_id, difficulty).await
    }

    pub async fn grade_quiz(&self, submission: &QuizSubmission) -> QuizGrade {
        self.quiz.grade_quiz(submission).await
    }
}
