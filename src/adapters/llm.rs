use crate::adapters::http::{build_client, send_json};
use crate::config::toml_config::LlmConfig;
use crate::domain::ports::{Prompt, TextGenerator};
use crate::utils::error::{LearnPathError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

// ============================================
// OpenAI-compatible chat completions
// ============================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiGenerator {
    /// `endpoint` is the API base, e.g. `https://api.openai.com/v1`.
    pub fn new(client: Client, endpoint: &str, api_key: &str, model: &str, max_tokens: u32) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &prompt.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &prompt.user,
        });

        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: prompt.temperature,
        };

        let http_request = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&request);
        let response: ChatResponse = send_json("text generation", http_request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LearnPathError::parse("text generation", "response carried no content"))
    }
}

// ============================================
// Disabled generator
// ============================================

/// Stands in when no API key is configured. Every call fails immediately, so
/// callers take their deterministic fallback paths.
#[derive(Debug, Clone)]
pub struct DisabledGenerator {
    reason: String,
}

impl DisabledGenerator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for DisabledGenerator {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _prompt: &Prompt) -> Result<String> {
        Err(LearnPathError::GenerationUnavailable {
            reason: self.reason.clone(),
        })
    }
}

/// Picks the generator the configuration asks for.
pub fn build_generator(config: &LlmConfig) -> Result<Arc<dyn TextGenerator>> {
    match config.usable_api_key() {
        Some(api_key) => {
            let client = build_client(Duration::from_secs(config.timeout_seconds))?;
            tracing::info!("🤖 Text generation enabled with model {}", config.model);
            Ok(Arc::new(OpenAiGenerator::new(
                client,
                &config.endpoint,
                api_key,
                &config.model,
                config.max_tokens,
            )))
        }
        None => {
            tracing::warn!("No LLM API key configured; AI ranking and planning will use fallbacks");
            Ok(Arc::new(DisabledGenerator::new("no API key configured")))
        }
    }
}
