//! Vector store gateway
//!
//! Persists chunk vectors with metadata and serves nearest-neighbor queries
//! against an external index. Upserts overwrite on id collision, which is
//! what makes same-name re-uploads idempotent. An in-memory implementation
//! backs tests and keyless development runs.

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::config::VectorStoreConfig;
use crate::errors::{AppError, Result};

/// Metadata stored alongside each chunk vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// The chunk text itself
    pub text: String,
    /// Originating document
    pub filename: String,
    /// 0-based ordinal within the document
    pub chunk_index: usize,
}

/// The persisted unit: id + vector + metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: ChunkMetadata,
}

/// A single retrieval result
#[derive(Debug, Clone, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    pub score: f32,
    pub metadata: Option<ChunkMetadata>,
}

/// Trait for vector storage and retrieval
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or overwrite records by id
    async fn upsert(&self, records: Vec<ChunkRecord>) -> Result<()>;

    /// Nearest-neighbor query. Results are sorted by descending score.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>>;
}

/// Client for a hosted vector index (data-plane REST API)
pub struct RemoteIndex {
    client: reqwest::Client,
    config: VectorStoreConfig,
    index_url: String,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [ChunkRecord],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    matches: Vec<QueryMatch>,
}

impl RemoteIndex {
    pub fn new(config: VectorStoreConfig) -> Result<Self> {
        let index_url = config
            .index_url
            .clone()
            .ok_or_else(|| AppError::Configuration {
                message: "vector_store.index_url is required for the remote index".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("failed to build vector store HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            config,
            index_url,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.index_url.trim_end_matches('/'))
    }

    async fn upsert_batch(&self, batch: &[ChunkRecord]) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("vectors/upsert"))
            .header("Api-Key", self.config.api_key.as_deref().unwrap_or_default())
            .json(&UpsertRequest { vectors: batch })
            .send()
            .await
            .map_err(|e| AppError::VectorStoreUnavailable {
                message: format!("upsert request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::VectorStoreUnavailable {
                message: format!("upsert error {status}: {body}"),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl VectorStore for RemoteIndex {
    async fn upsert(&self, records: Vec<ChunkRecord>) -> Result<()> {
        let batch_size = self.config.upsert_batch_size.max(1);
        try_join_all(records.chunks(batch_size).map(|b| self.upsert_batch(b))).await?;

        tracing::debug!(records = records.len(), "Vectors upserted");
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>> {
        let response = self
            .client
            .post(self.endpoint("query"))
            .header("Api-Key", self.config.api_key.as_deref().unwrap_or_default())
            .json(&QueryRequest {
                vector,
                top_k,
                include_metadata,
            })
            .send()
            .await
            .map_err(|e| AppError::VectorStoreUnavailable {
                message: format!("query request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::VectorStoreUnavailable {
                message: format!("query error {status}: {body}"),
            });
        }

        let result: QueryResponse =
            response
                .json()
                .await
                .map_err(|e| AppError::VectorStoreUnavailable {
                    message: format!("failed to parse query response: {e}"),
                })?;

        Ok(result.matches)
    }
}

/// In-memory vector store for tests and keyless development runs
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<HashMap<String, ChunkRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn upsert(&self, records: Vec<ChunkRecord>) -> Result<()> {
        let mut store = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for record in records {
            store.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>> {
        let store = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut matches: Vec<QueryMatch> = store
            .values()
            .map(|record| QueryMatch {
                id: record.id.clone(),
                score: cosine_similarity(vector, &record.values),
                metadata: include_metadata.then(|| record.metadata.clone()),
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);
        Ok(matches)
    }
}

/// Create a vector store based on configuration
pub fn create_vector_store(config: &VectorStoreConfig) -> Result<Arc<dyn VectorStore>> {
    if config.index_url.is_some() {
        Ok(Arc::new(RemoteIndex::new(config.clone())?))
    } else {
        tracing::warn!("No vector index configured - using in-memory store, contents are lost on restart");
        Ok(Arc::new(InMemoryStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, values: Vec<f32>) -> ChunkRecord {
        ChunkRecord {
            id: id.to_string(),
            values,
            metadata: ChunkMetadata {
                text: format!("text for {id}"),
                filename: "file.txt".to_string(),
                chunk_index: 0,
            },
        }
    }

    #[test]
    fn test_upsert_overwrites_same_id() {
        let store = InMemoryStore::new();
        tokio_test::block_on(async {
            store
                .upsert(vec![record("file.txt_0", vec![1.0, 0.0])])
                .await
                .unwrap();
            store
                .upsert(vec![record("file.txt_0", vec![0.0, 1.0])])
                .await
                .unwrap();

            let matches = store.query(&[0.0, 1.0], 10, true).await.unwrap();
            assert_eq!(matches.len(), 1);
            assert_eq!(matches[0].id, "file.txt_0");
            assert!((matches[0].score - 1.0).abs() < 1e-6);
        });
    }

    #[test]
    fn test_query_ranks_by_descending_similarity() {
        let store = InMemoryStore::new();
        tokio_test::block_on(async {
            store
                .upsert(vec![
                    record("a_0", vec![1.0, 0.0]),
                    record("b_0", vec![0.7, 0.7]),
                    record("c_0", vec![0.0, 1.0]),
                ])
                .await
                .unwrap();

            let matches = store.query(&[1.0, 0.0], 2, true).await.unwrap();
            assert_eq!(matches.len(), 2);
            assert_eq!(matches[0].id, "a_0");
            assert_eq!(matches[1].id, "b_0");
            assert!(matches[0].score >= matches[1].score);
        });
    }

    #[test]
    fn test_query_without_metadata() {
        let store = InMemoryStore::new();
        tokio_test::block_on(async {
            store
                .upsert(vec![record("a_0", vec![1.0, 0.0])])
                .await
                .unwrap();
            let matches = store.query(&[1.0, 0.0], 5, false).await.unwrap();
            assert!(matches[0].metadata.is_none());
        });
    }

    #[test]
    fn test_cosine_similarity_edge_cases() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }
}
