//! Completion gateway
//!
//! Chat-completions client for the language model that turns retrieved
//! context into answers and study aids. Model output is returned verbatim;
//! format compliance for quiz/flashcard micro-formats is delegated to the
//! prompt, not enforced here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::config::CompletionConfig;
use crate::errors::{AppError, Result};

/// Sampling parameters for one completion call
#[derive(Debug, Clone, Copy)]
pub struct CompletionParams {
    pub temperature: f32,
    pub max_tokens: usize,
}

/// Trait for completion generation
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate a completion for a single user prompt
    async fn complete(&self, prompt: &str, params: &CompletionParams) -> Result<String>;
}

/// Client for an OpenAI-compatible chat-completions API
pub struct ChatCompletionClient {
    client: reqwest::Client,
    config: CompletionConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl ChatCompletionClient {
    pub fn new(config: CompletionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("failed to build completion HTTP client: {e}"),
            })?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl CompletionClient for ChatCompletionClient {
    async fn complete(&self, prompt: &str, params: &CompletionParams) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.as_deref().unwrap_or_default()),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::CompletionUnavailable {
                message: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::CompletionUnavailable {
                message: format!("API error {status}: {body}"),
            });
        }

        let result: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| AppError::CompletionUnavailable {
                    message: format!("failed to parse response: {e}"),
                })?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::CompletionUnavailable {
                message: "empty response".to_string(),
            })
    }
}

/// Mock completion client for tests and keyless development runs.
///
/// Records every prompt it receives so tests can assert on what the
/// orchestrators actually send.
#[derive(Default)]
pub struct MockCompletionClient {
    prompts: Mutex<Vec<String>>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prompts received so far, in call order
    #[cfg(test)]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, prompt: &str, _params: &CompletionParams) -> Result<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());
        Ok("Mock completion grounded in the provided context.".to_string())
    }
}

/// Create a completion client based on configuration
pub fn create_completion_client(config: &CompletionConfig) -> Result<Arc<dyn CompletionClient>> {
    match config.api_key.as_deref() {
        None | Some("mock") => {
            tracing::warn!("No completion API key configured - using mock completion client");
            Ok(Arc::new(MockCompletionClient::new()))
        }
        Some(_) => Ok(Arc::new(ChatCompletionClient::new(config.clone())?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_prompts_in_order() {
        let client = MockCompletionClient::new();
        let params = CompletionParams {
            temperature: 0.5,
            max_tokens: 100,
        };

        client.complete("first prompt", &params).await.unwrap();
        client.complete("second prompt", &params).await.unwrap();

        assert_eq!(client.prompts(), vec!["first prompt", "second prompt"]);
    }
}
