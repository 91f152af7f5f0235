//! Scripted providers and generators shared by the core unit tests.

use crate::domain::model::{CourseQuery, CourseRecord, Difficulty, Provider};
use crate::domain::ports::{CourseProvider, Prompt, TextGenerator};
use crate::utils::error::{LearnPathError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

pub fn course(provider: Provider, id: &str, title: &str, rating: f64, difficulty: Difficulty) -> CourseRecord {
    CourseRecord {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("About {}", title),
        provider,
        language: "en".to_string(),
        difficulty,
        duration: "4 weeks".to_string(),
        rating,
        url: None,
        trending: None,
    }
}

pub struct StaticProvider {
    pub provider: Provider,
    pub courses: Vec<CourseRecord>,
}

#[async_trait]
impl CourseProvider for StaticProvider {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn fetch(&self, _query: &CourseQuery) -> Result<Vec<CourseRecord>> {
        Ok(self.courses.clone())
    }
}

pub struct FailingProvider(pub Provider);

#[async_trait]
impl CourseProvider for FailingProvider {
    fn provider(&self) -> Provider {
        self.0
    }

    async fn fetch(&self, _query: &CourseQuery) -> Result<Vec<CourseRecord>> {
        Err(LearnPathError::HttpStatus {
            source_name: self.0.to_string(),
            status: 502,
        })
    }
}

pub struct SlowProvider {
    pub provider: Provider,
    pub delay: Duration,
}

#[async_trait]
impl CourseProvider for SlowProvider {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn fetch(&self, query: &CourseQuery) -> Result<Vec<CourseRecord>> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![course(self.provider, "slow-1", &format!("Slow {}", query.query), 5.0, Difficulty::Beginner)])
    }
}

/// Replays canned replies in order; `None` entries fail. Records every prompt.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Option<String>>>,
    pub prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Option<&str>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| r.map(str::to_string)).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.clone());
        match self.replies.lock().unwrap().pop_front().flatten() {
            Some(reply) => Ok(reply),
            None => Err(LearnPathError::GenerationUnavailable {
                reason: "scripted failure".to_string(),
            }),
        }
    }
}

/// Never answers within any reasonable timeout.
pub struct HangingGenerator;

#[async_trait]
impl TextGenerator for HangingGenerator {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn generate(&self, _prompt: &Prompt) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("too late".to_string())
    }
}
