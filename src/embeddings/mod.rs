//! Embedding gateway
//!
//! Turns text into vector representations via an external inference API.
//! The client is length- and order-preserving: the vector at position `i`
//! always corresponds to `texts[i]`. Bounded retry with exponential backoff
//! lives here; callers never retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::EmbeddingConfig;
use crate::errors::{AppError, Result};
use crate::metrics;

/// Whether a text is being embedded for storage or for querying.
///
/// Asymmetric embedding models encode passages and queries differently, so
/// the distinction is part of the gateway contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Passage,
    Query,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Passage => "passage",
            InputType::Query => "query",
        }
    }
}

/// Trait for embedding generation
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embeddings for a batch of texts, one vector per input in
    /// input order
    async fn embed(&self, texts: &[String], input_type: InputType) -> Result<Vec<Vec<f32>>>;

    /// Get the model name
    fn model_name(&self) -> &str;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;
}

/// Base delay for exponential backoff (ms)
const RETRY_BASE_DELAY_MS: u64 = 100;

/// Embedding client for a hosted inference API
pub struct InferenceEmbedder {
    client: reqwest::Client,
    config: EmbeddingConfig,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    inputs: Vec<EmbedInput<'a>>,
    parameters: EmbedParameters<'a>,
}

#[derive(Serialize)]
struct EmbedInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct EmbedParameters<'a> {
    input_type: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    values: Vec<f32>,
}

impl InferenceEmbedder {
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("failed to build embedding HTTP client: {e}"),
            })?;

        Ok(Self { client, config })
    }

    /// Make one embedding request with retry on transient failure
    async fn request_with_retry(
        &self,
        texts: &[String],
        input_type: InputType,
    ) -> Result<Vec<Vec<f32>>> {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(RETRY_BASE_DELAY_MS * 2_u64.pow(attempt));
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();
            match self.make_request(texts, input_type).await {
                Ok(embeddings) => {
                    metrics::record_embedding(
                        start.elapsed().as_secs_f64(),
                        &self.config.model,
                        true,
                    );
                    return Ok(embeddings);
                }
                Err(e) => {
                    metrics::record_embedding(
                        start.elapsed().as_secs_f64(),
                        &self.config.model,
                        false,
                    );
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        error = %e,
                        "Embedding request failed, retrying"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AppError::EmbeddingUnavailable {
            message: "unknown error after retries".to_string(),
        }))
    }

    async fn make_request(&self, texts: &[String], input_type: InputType) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embed", self.config.api_base.trim_end_matches('/'));

        let request = EmbedRequest {
            model: &self.config.model,
            inputs: texts.iter().map(|t| EmbedInput { text: t.as_str() }).collect(),
            parameters: EmbedParameters {
                input_type: input_type.as_str(),
            },
        };

        let response = self
            .client
            .post(&url)
            .header("Api-Key", self.config.api_key.as_deref().unwrap_or_default())
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::EmbeddingUnavailable {
                message: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::EmbeddingUnavailable {
                message: format!("API error {status}: {body}"),
            });
        }

        let result: EmbedResponse =
            response
                .json()
                .await
                .map_err(|e| AppError::EmbeddingUnavailable {
                    message: format!("failed to parse response: {e}"),
                })?;

        if result.data.len() != texts.len() {
            return Err(AppError::EmbeddingUnavailable {
                message: format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    result.data.len()
                ),
            });
        }

        Ok(result.data.into_iter().map(|d| d.values).collect())
    }
}

#[async_trait]
impl Embedder for InferenceEmbedder {
    async fn embed(&self, texts: &[String], input_type: InputType) -> Result<Vec<Vec<f32>>> {
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.config.batch_size.max(1)) {
            let embeddings = self.request_with_retry(batch, input_type).await?;
            all_embeddings.extend(embeddings);
        }

        Ok(all_embeddings)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

/// Deterministic mock embedder for tests and keyless development runs.
///
/// The vector is derived from the text alone, so the same text always embeds
/// to the same point and a query matches the passage with identical content.
pub struct MockEmbedder {
    dimension: usize,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        use rand::{Rng, SeedableRng};
        use std::hash::{Hash, Hasher};

        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        text.hash(&mut hasher);
        let mut rng = rand::rngs::StdRng::seed_from_u64(hasher.finish());

        (0..self.dimension).map(|_| rng.gen_range(-1.0..1.0)).collect()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, texts: &[String], _input_type: InputType) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn model_name(&self) -> &str {
        "mock-embedding"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Create an embedder based on configuration
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.api_key.as_deref() {
        None | Some("mock") => {
            tracing::warn!("No embedding API key configured - using mock embedder");
            Ok(Arc::new(MockEmbedder::new(config.dimension)))
        }
        Some(_) => Ok(Arc::new(InferenceEmbedder::new(config.clone())?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_embedder_dimension() {
        let embedder = MockEmbedder::new(1024);
        let embeddings = embedder
            .embed(&["test text".to_string()], InputType::Passage)
            .await
            .unwrap();
        assert_eq!(embeddings.len(), 1);
        assert_eq!(embeddings[0].len(), 1024);
    }

    #[tokio::test]
    async fn test_mock_embedder_is_deterministic() {
        let embedder = MockEmbedder::new(64);
        let texts = vec!["alpha".to_string(), "beta".to_string()];
        let first = embedder.embed(&texts, InputType::Passage).await.unwrap();
        let second = embedder.embed(&texts, InputType::Query).await.unwrap();
        assert_eq!(first, second);
        assert_ne!(first[0], first[1]);
    }

    #[tokio::test]
    async fn test_mock_embedder_preserves_order_and_length() {
        let embedder = MockEmbedder::new(16);
        let texts: Vec<String> = (0..5).map(|i| format!("text {i}")).collect();
        let embeddings = embedder.embed(&texts, InputType::Passage).await.unwrap();
        assert_eq!(embeddings.len(), texts.len());
        let solo = embedder
            .embed(&texts[3..4], InputType::Passage)
            .await
            .unwrap();
        assert_eq!(embeddings[3], solo[0]);
    }

    #[test]
    fn test_input_type_wire_values() {
        assert_eq!(InputType::Passage.as_str(), "passage");
        assert_eq!(InputType::Query.as_str(), "query");
    }
}
