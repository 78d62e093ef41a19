//! Document upload handler

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::instrument;

use crate::errors::{AppError, Result};
use crate::services::AppState;

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub chunks: usize,
}

/// Accept a multipart `file` field (.pdf or .txt) and ingest it
#[instrument(skip(state, multipart))]
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidUpload {
                message: "file field has no filename".to_string(),
            })?;
        let bytes = field.bytes().await?;

        let chunks = state.study.upload_document(&filename, &bytes).await?;

        return Ok(Json(UploadResponse {
            message: "Document uploaded successfully".to_string(),
            filename,
            chunks,
        }));
    }

    Err(AppError::InvalidUpload {
        message: "missing multipart field 'file'".to_string(),
    })
}
