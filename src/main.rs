//! StudyForge backend
//!
//! Retrieval-augmented study assistant: uploads are chunked, embedded, and
//! stored in a vector index; questions and study aids are answered by
//! retrieving relevant chunks and prompting a completion model over them.

mod completion;
mod config;
mod context;
mod embeddings;
mod errors;
mod ingestion;
mod metrics;
mod progress;
mod routes;
mod services;
mod vector_store;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::embeddings::Embedder;
use crate::progress::ProgressTracker;
use crate::services::{AppState, StudyService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    dotenvy::dotenv().ok();
    let config = config::AppConfig::load()?;

    // 2. Setup logging
    let filter = EnvFilter::new(&config.observability.log_level);
    if config.observability.json_logging {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting StudyForge..."
    );

    // A window that never advances would hang the first upload; refuse to boot.
    config.chunking.validate()?;

    // 3. Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port != 0 {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()?;
        tracing::info!(address = %metrics_addr, "Prometheus exporter listening");
    }

    // 4. Initialize gateway clients (mocks when no keys are configured)
    let embedder = embeddings::create_embedder(&config.embedding)?;
    let store = vector_store::create_vector_store(&config.vector_store)?;
    let completion = completion::create_completion_client(&config.completion)?;

    tracing::info!(
        embedding_model = embedder.model_name(),
        dimension = embedder.dimension(),
        "Embedding gateway ready"
    );

    // 5. Initialize app state
    let progress = Arc::new(ProgressTracker::new());
    let study = StudyService::new(
        embedder,
        store,
        completion,
        config.chunking.clone(),
        progress.clone(),
    );
    let state = AppState::new(study, progress);

    // 6. Setup router with middleware
    let app = routes::create_router(state, &config);

    // 7. Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
/// Listens for SIGINT (Ctrl+C) and SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
