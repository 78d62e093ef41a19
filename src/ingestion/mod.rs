//! Document ingestion
//!
//! Turns uploaded files into plain text ready for chunking. Only PDF and
//! plain-text uploads are accepted; anything else is rejected up front.

pub mod chunker;
pub mod pdf;

use crate::errors::{AppError, Result};

/// Extract plain text from an uploaded document based on its extension
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String> {
    match file_extension(filename).as_deref() {
        Some("pdf") => pdf::extract_text_from_pdf(filename, bytes),
        Some("txt") => {
            String::from_utf8(bytes.to_vec()).map_err(|e| AppError::InvalidUpload {
                message: format!("{filename} is not valid UTF-8: {e}"),
            })
        }
        other => Err(AppError::UnsupportedFileType {
            extension: other.unwrap_or_default().to_string(),
        }),
    }
}

fn file_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
