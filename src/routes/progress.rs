//! Progress snapshot handler

use axum::{extract::State, Json};

use crate::progress::ProgressSnapshot;
use crate::services::AppState;

/// Current study progress counters
pub async fn get_progress(State(state): State<AppState>) -> Json<ProgressSnapshot> {
    Json(state.progress.snapshot())
}
