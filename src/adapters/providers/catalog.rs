use crate::domain::model::{
    CourseDetails, CourseModule, CourseQuery, CourseRecord, Difficulty, DifficultyFilter, Provider,
};
use crate::domain::ports::CourseProvider;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Built-in course store. Always answers, which keeps listings non-empty when
/// every remote catalog is down.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore;

impl CatalogStore {
    pub fn new() -> Self {
        Self
    }

    /// 查不到的 id 也回傳通用的課程結構
    pub fn details(&self, course_id: &str) -> CourseDetails {
        let module = |id: &str, title: &str, duration: &str, content: &str| CourseModule {
            id: id.to_string(),
            title: title.to_string(),
            duration: duration.to_string(),
            content: content.to_string(),
        };

        CourseDetails {
            id: course_id.to_string(),
            title: format!("Detailed Course {}", course_id),
            description: "A comprehensive course covering the core content, learning objectives, and prerequisites."
                .to_string(),
            modules: vec![
                module("module-1", "Introduction", "2 weeks", "Basic concepts and setup"),
                module("module-2", "Core Concepts", "4 weeks", "Main learning objectives"),
                module("module-3", "Advanced Topics", "2 weeks", "Advanced concepts and applications"),
            ],
            duration: "8 weeks".to_string(),
            difficulty: Difficulty::Beginner,
            instructor: "Dr. Sample Instructor".to_string(),
            prerequisites: vec!["Basic programming knowledge".to_string()],
            certificate: true,
            enrollment_count: 1250,
        }
    }

    /// Static trending list served when live trending searches come back empty.
    pub fn trending(&self) -> Vec<CourseRecord> {
        vec![
            CourseRecord {
                id: "trending-1".to_string(),
                title: "Python for Data Science".to_string(),
                description: "Learn Python programming for data analysis".to_string(),
                provider: Provider::Edx,
                language: "en".to_string(),
                difficulty: Difficulty::Beginner,
                duration: "8 weeks".to_string(),
                rating: 4.8,
                url: None,
                trending: Some(true),
            },
            CourseRecord {
                id: "trending-2".to_string(),
                title: "Machine Learning Fundamentals".to_string(),
                description: "Introduction to machine learning concepts".to_string(),
                provider: Provider::MitOcw,
                language: "en".to_string(),
                difficulty: Difficulty::Intermediate,
                duration: "12 weeks".to_string(),
                rating: 4.7,
                url: None,
                trending: Some(true),
            },
        ]
    }
}

#[async_trait]
impl CourseProvider for CatalogStore {
    fn provider(&self) -> Provider {
        Provider::Catalog
    }

    async fn fetch(&self, query: &CourseQuery) -> Result<Vec<CourseRecord>> {
        let requested = match query.difficulty {
            DifficultyFilter::Only(difficulty) => difficulty,
            DifficultyFilter::All => Difficulty::Beginner,
        };

        Ok(vec![
            CourseRecord {
                id: "course-1".to_string(),
                title: format!("Sample Course for '{}'", query.query),
                description: "This is a sample course description".to_string(),
                provider: Provider::Catalog,
                language: query.language.clone(),
                difficulty: requested,
                duration: "8 weeks".to_string(),
                rating: 4.5,
                url: None,
                trending: None,
            },
            CourseRecord {
                id: "course-2".to_string(),
                title: format!("Advanced Course for '{}'", query.query),
                description: "This is an advanced course description".to_string(),
                provider: Provider::Catalog,
                language: query.language.clone(),
                difficulty: Difficulty::Intermediate,
                duration: "12 weeks".to_string(),
                rating: 4.8,
                url: None,
                trending: None,
            },
        ])
    }
}
