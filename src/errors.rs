//! Error types for the StudyForge backend
//!
//! Provides:
//! - Distinct error types for each failure mode
//! - Deterministic HTTP status code mapping
//! - Structured error responses with machine-readable codes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    ValidationError,
    UnsupportedFileType,
    InvalidUpload,
    NoDocuments,

    // Ingestion errors
    ChunkingConfig,

    // External service errors
    EmbeddingUnavailable,
    VectorStoreUnavailable,
    CompletionUnavailable,
    UpstreamError,

    // Internal errors
    InternalError,
    ConfigurationError,
    SerializationError,
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Unsupported file type: {extension:?} (only .pdf and .txt are accepted)")]
    UnsupportedFileType { extension: String },

    #[error("Invalid upload: {message}")]
    InvalidUpload { message: String },

    #[error("No documents uploaded yet")]
    NoDocuments,

    // Ingestion errors
    #[error("Chunk overlap {overlap} must be smaller than chunk size {size}")]
    ChunkingConfig { size: usize, overlap: usize },

    // External service errors
    #[error("Embedding service error: {message}")]
    EmbeddingUnavailable { message: String },

    #[error("Vector store error: {message}")]
    VectorStoreUnavailable { message: String },

    #[error("Completion service error: {message}")]
    CompletionUnavailable { message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::UnsupportedFileType { .. } => ErrorCode::UnsupportedFileType,
            AppError::InvalidUpload { .. } => ErrorCode::InvalidUpload,
            AppError::NoDocuments => ErrorCode::NoDocuments,
            AppError::ChunkingConfig { .. } => ErrorCode::ChunkingConfig,
            AppError::EmbeddingUnavailable { .. } => ErrorCode::EmbeddingUnavailable,
            AppError::VectorStoreUnavailable { .. } => ErrorCode::VectorStoreUnavailable,
            AppError::CompletionUnavailable { .. } => ErrorCode::CompletionUnavailable,
            AppError::HttpClient(_) => ErrorCode::UpstreamError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. }
            | AppError::UnsupportedFileType { .. }
            | AppError::InvalidUpload { .. }
            | AppError::NoDocuments => StatusCode::BAD_REQUEST,

            // 500 Internal Server Error
            AppError::ChunkingConfig { .. }
            | AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::EmbeddingUnavailable { .. }
            | AppError::VectorStoreUnavailable { .. }
            | AppError::CompletionUnavailable { .. }
            | AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for the API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = ErrorResponse {
            error: ErrorDetails { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AppError::InvalidUpload {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::UnsupportedFileType {
            extension: "docx".into(),
        };
        assert_eq!(err.code(), ErrorCode::UnsupportedFileType);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_empty_store_error() {
        let err = AppError::NoDocuments;
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_gateway_errors_are_bad_gateway() {
        for err in [
            AppError::EmbeddingUnavailable {
                message: "timeout".into(),
            },
            AppError::VectorStoreUnavailable {
                message: "index offline".into(),
            },
            AppError::CompletionUnavailable {
                message: "model overloaded".into(),
            },
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
            assert!(err.is_server_error());
        }
    }

    #[test]
    fn test_chunking_guard_is_server_error() {
        let err = AppError::ChunkingConfig {
            size: 50,
            overlap: 50,
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("50"));
    }
}
