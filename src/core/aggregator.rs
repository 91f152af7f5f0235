use crate::domain::model::{CourseQuery, CourseRecord, DifficultyFilter, Provider};
use crate::domain::ports::CourseProvider;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Fans a search out to every registered provider and merges the answers.
pub struct Aggregator {
    providers: Vec<Arc<dyn CourseProvider>>,
    timeout: Duration,
}

impl Aggregator {
    pub fn new(providers: Vec<Arc<dyn CourseProvider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    pub fn providers(&self) -> impl Iterator<Item = Provider> + '_ {
        self.providers.iter().map(|provider| provider.provider())
    }

    /// 所有來源並行查詢，單一 join point 之後才過濾與去重
    ///
    /// Never fails: a provider that errors or exceeds the timeout simply
    /// contributes nothing. Groups keep provider registration order.
    pub async fn aggregate(&self, query: &CourseQuery) -> Vec<CourseRecord> {
        let searches = self
            .providers
            .iter()
            .map(|provider| self.search_with_timeout(provider.as_ref(), query));
        let groups = join_all(searches).await;

        let counts: Vec<String> = self
            .providers
            .iter()
            .zip(&groups)
            .map(|(provider, courses)| format!("{}={}", provider.provider(), courses.len()))
            .collect();

        let courses = merge(groups, query.difficulty);

        info!(
            "📚 Aggregated '{}' (difficulty={}): [{}] -> {} courses",
            query.query,
            query.difficulty,
            counts.join(", "),
            courses.len()
        );
        courses
    }

    async fn search_with_timeout(&self, provider: &dyn CourseProvider, query: &CourseQuery) -> Vec<CourseRecord> {
        match tokio::time::timeout(self.timeout, provider.search(query)).await {
            Ok(courses) => courses,
            Err(_) => {
                warn!(
                    provider = %provider.provider(),
                    timeout = ?self.timeout,
                    "Provider search timed out, treating as empty"
                );
                Vec::new()
            }
        }
    }
}

/// Concatenates provider groups in order, applies the difficulty filter, then
/// drops repeated `(provider, id)` pairs keeping the first occurrence.
pub fn merge(groups: Vec<Vec<CourseRecord>>, difficulty: DifficultyFilter) -> Vec<CourseRecord> {
    let mut seen: HashSet<(Provider, String)> = HashSet::new();

    groups
        .into_iter()
        .flatten()
        .filter(|course| difficulty.matches(course.difficulty))
        .filter(|course| seen.insert((course.provider, course.id.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{course, FailingProvider, SlowProvider, StaticProvider};
    use crate::domain::model::Difficulty;

    fn static_provider(provider: Provider, courses: Vec<CourseRecord>) -> Arc<dyn CourseProvider> {
        Arc::new(StaticProvider { provider, courses })
    }

    fn query(difficulty: DifficultyFilter) -> CourseQuery {
        CourseQuery::new("python", "en", difficulty)
    }

    #[tokio::test]
    async fn test_duplicate_records_are_kept_once() {
        let e1 = course(Provider::Edx, "e1", "Intro to Python", 4.0, Difficulty::Beginner);
        let aggregator = Aggregator::new(
            vec![static_provider(Provider::Edx, vec![e1.clone(), e1.clone()])],
            Duration::from_secs(1),
        );

        let courses = aggregator.aggregate(&query(DifficultyFilter::All)).await;

        assert_eq!(courses, vec![e1]);
    }

    #[tokio::test]
    async fn test_same_id_from_different_providers_is_not_a_duplicate() {
        let aggregator = Aggregator::new(
            vec![
                static_provider(
                    Provider::Edx,
                    vec![course(Provider::Edx, "101", "Python A", 4.0, Difficulty::Beginner)],
                ),
                static_provider(
                    Provider::MitOcw,
                    vec![course(Provider::MitOcw, "101", "Python A", 4.5, Difficulty::Beginner)],
                ),
            ],
            Duration::from_secs(1),
        );

        let courses = aggregator.aggregate(&query(DifficultyFilter::All)).await;

        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].provider, Provider::Edx);
        assert_eq!(courses[1].provider, Provider::MitOcw);
    }

    #[tokio::test]
    async fn test_difficulty_filter() {
        let aggregator = Aggregator::new(
            vec![
                static_provider(
                    Provider::Edx,
                    vec![
                        course(Provider::Edx, "e1", "Basics", 4.0, Difficulty::Beginner),
                        course(Provider::Edx, "e2", "Deeper", 4.2, Difficulty::Intermediate),
                    ],
                ),
                static_provider(
                    Provider::MitOcw,
                    vec![course(Provider::MitOcw, "m1", "Deepest", 4.5, Difficulty::Intermediate)],
                ),
            ],
            Duration::from_secs(1),
        );

        let filtered = aggregator
            .aggregate(&query(DifficultyFilter::Only(Difficulty::Intermediate)))
            .await;
        let ids: Vec<&str> = filtered.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["e2", "m1"]);
        assert!(filtered.iter().all(|c| c.difficulty == Difficulty::Intermediate));

        let everything = aggregator.aggregate(&query(DifficultyFilter::All)).await;
        assert_eq!(everything.len(), 3);
    }

    #[tokio::test]
    async fn test_failing_provider_does_not_affect_others() {
        let m1 = course(Provider::MitOcw, "m1", "Algorithms", 4.8, Difficulty::Beginner);
        let aggregator = Aggregator::new(
            vec![
                Arc::new(FailingProvider(Provider::Edx)) as Arc<dyn CourseProvider>,
                static_provider(Provider::MitOcw, vec![m1.clone()]),
            ],
            Duration::from_secs(1),
        );

        let courses = aggregator.aggregate(&query(DifficultyFilter::All)).await;

        assert_eq!(courses, vec![m1]);
    }

    #[tokio::test]
    async fn test_slow_provider_is_cut_off() {
        let e1 = course(Provider::Edx, "e1", "Fast course", 4.0, Difficulty::Beginner);
        let aggregator = Aggregator::new(
            vec![
                Arc::new(SlowProvider {
                    provider: Provider::OpenStax,
                    delay: Duration::from_secs(30),
                }) as Arc<dyn CourseProvider>,
                static_provider(Provider::Edx, vec![e1.clone()]),
            ],
            Duration::from_millis(50),
        );

        let started = std::time::Instant::now();
        let courses = aggregator.aggregate(&query(DifficultyFilter::All)).await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(courses, vec![e1]);
    }

    #[tokio::test]
    async fn test_output_never_smaller_than_largest_provider() {
        let edx: Vec<CourseRecord> = (0..4)
            .map(|i| course(Provider::Edx, &format!("e{}", i), "Edx course", 4.0, Difficulty::Beginner))
            .collect();
        let mit: Vec<CourseRecord> = (0..2)
            .map(|i| course(Provider::MitOcw, &format!("m{}", i), "Mit course", 4.0, Difficulty::Beginner))
            .collect();
        let aggregator = Aggregator::new(
            vec![
                static_provider(Provider::Edx, edx.clone()),
                static_provider(Provider::MitOcw, mit),
            ],
            Duration::from_secs(1),
        );

        let courses = aggregator.aggregate(&query(DifficultyFilter::All)).await;

        assert!(courses.len() >= edx.len());
        assert_eq!(courses.len(), 6);
        assert_eq!(courses[..4], edx[..]);
    }

    #[tokio::test]
    async fn test_no_providers_yields_empty_result() {
        let aggregator = Aggregator::new(Vec::new(), Duration::from_secs(1));
        assert!(aggregator.aggregate(&query(DifficultyFilter::All)).await.is_empty());
    }
}
