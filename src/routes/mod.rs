//! HTTP routing layer
//!
//! Thin boundary over the study service: request shapes, validation, and
//! status mapping live here; orchestration lives in `services`.

pub mod health;
pub mod progress;
pub mod study;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::services::AppState;

/// Create the main application router
pub fn create_router(state: AppState, config: &AppConfig) -> Router {
    // The original frontend is a plain browser app, so CORS stays permissive.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/upload", post(upload::upload_document))
        .route("/ask", post(study::ask))
        .route("/generate-quiz", post(study::generate_quiz))
        .route("/generate-summary", get(study::generate_summary))
        .route("/generate-flashcards", get(study::generate_flashcards))
        .route("/generate-outline", get(study::generate_outline))
        .route("/explain-eli5", post(study::explain_eli5))
        .route("/progress", get(progress::get_progress))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors)
                .layer(DefaultBodyLimit::max(config.server.max_upload_bytes)),
        )
        .with_state(state)
}
