//! Configuration management
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{env}, config/local)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ingestion::chunker::ChunkingConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Embedding gateway configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Vector store gateway configuration
    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    /// Completion gateway configuration
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted upload body size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    /// Inference API base URL
    #[serde(default = "default_embedding_api_base")]
    pub api_base: String,

    /// API key; unset (or "mock") selects the deterministic mock embedder
    #[serde(default)]
    pub api_key: Option<String>,

    /// Embedding model
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension; fixed for the lifetime of the vector store
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Request timeout in seconds
    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Texts per embedding request
    #[serde(default = "default_embedding_batch_size")]
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VectorStoreConfig {
    /// Index data-plane URL; unset selects the in-memory store
    #[serde(default)]
    pub index_url: Option<String>,

    /// API key for the index
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,

    /// Records per upsert request
    #[serde(default = "default_upsert_batch_size")]
    pub upsert_batch_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompletionConfig {
    /// Chat-completions endpoint
    #[serde(default = "default_completion_endpoint")]
    pub endpoint: String,

    /// API key; unset selects the mock completion client
    #[serde(default)]
    pub api_key: Option<String>,

    /// Completion model
    #[serde(default = "default_completion_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_completion_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Prometheus metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}
fn default_embedding_api_base() -> String {
    "https://api.pinecone.io".to_string()
}
fn default_embedding_model() -> String {
    "llama-text-embed-v2".to_string()
}
fn default_embedding_dimension() -> usize {
    1024
}
fn default_gateway_timeout() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_embedding_batch_size() -> usize {
    96
}
fn default_upsert_batch_size() -> usize {
    100
}
fn default_completion_endpoint() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}
fn default_completion_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}
fn default_completion_timeout() -> u64 {
    60
}
fn default_log_level() -> String {
    "info,studyforge=debug".to_string()
}
fn default_json_logging() -> bool {
    true
}
fn default_metrics_port() -> u16 {
    9090
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_base: default_embedding_api_base(),
            api_key: None,
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            timeout_secs: default_gateway_timeout(),
            max_retries: default_max_retries(),
            batch_size: default_embedding_batch_size(),
        }
    }
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            index_url: None,
            api_key: None,
            timeout_secs: default_gateway_timeout(),
            upsert_batch_size: default_upsert_batch_size(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_completion_endpoint(),
            api_key: None,
            model: default_completion_model(),
            timeout_secs: default_completion_timeout(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: default_metrics_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            chunking: ChunkingConfig::default(),
            embedding: EmbeddingConfig::default(),
            vector_store: VectorStoreConfig::default(),
            completion: CompletionConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=8080
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 50);
        assert_eq!(config.embedding.model, "llama-text-embed-v2");
        assert_eq!(config.embedding.dimension, 1024);
        assert_eq!(config.completion.model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_keyless_defaults_select_mocks() {
        let config = AppConfig::default();
        assert!(config.embedding.api_key.is_none());
        assert!(config.vector_store.index_url.is_none());
        assert!(config.completion.api_key.is_none());
    }
}
