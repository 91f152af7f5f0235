use crate::domain::model::{CourseQuery, CourseRecord, Provider};
use crate::utils::error::Result;
use async_trait::async_trait;

/// A course catalog source.
///
/// Implementors only write `fetch`; callers go through `search`, which turns
/// every failure into an empty listing so one bad provider never leaks an
/// error into the aggregation.
#[async_trait]
pub trait CourseProvider: Send + Sync {
    fn provider(&self) -> Provider;

    async fn fetch(&self, query: &CourseQuery) -> Result<Vec<CourseRecord>>;

    async fn search(&self, query: &CourseQuery) -> Vec<CourseRecord> {
        match self.fetch(query).await {
            Ok(courses) => {
                tracing::debug!(
                    provider = %self.provider(),
                    count = courses.len(),
                    "Provider search returned courses"
                );
                courses
            }
            Err(e) => {
                tracing::warn!(
                    provider = %self.provider(),
                    category = ?e.category(),
                    error = %e,
                    "Provider search failed, treating as empty"
                );
                Vec::new()
            }
        }
    }
}

/// A single generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: Option<String>,
    pub user: String,
    pub temperature: f32,
}

impl Prompt {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            system: None,
            user: user.into(),
            temperature: 0.7,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Text-generation capability (an LLM behind some API).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &Prompt) -> Result<String>;
}
