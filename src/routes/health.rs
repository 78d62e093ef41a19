//! Root and health check handlers

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Service banner
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "StudyForge API is running".to_string(),
    })
}

/// Liveness probe - healthy whenever the server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}
