//! Metrics and observability utilities
//!
//! Prometheus metrics via the `metrics` facade with standardized naming.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};

/// Metrics prefix for all StudyForge metrics
pub const METRICS_PREFIX: &str = "studyforge";

/// Register all metric descriptions
pub fn register_metrics() {
    // Ingestion metrics
    describe_counter!(
        format!("{}_documents_uploaded_total", METRICS_PREFIX),
        Unit::Count,
        "Total documents ingested"
    );

    describe_counter!(
        format!("{}_chunks_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total chunks created"
    );

    describe_histogram!(
        format!("{}_upload_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Document ingestion latency in seconds"
    );

    // Study feature metrics
    describe_counter!(
        format!("{}_generations_total", METRICS_PREFIX),
        Unit::Count,
        "Total study feature requests, labeled by kind"
    );

    describe_histogram!(
        format!("{}_generation_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Study feature latency in seconds, labeled by kind"
    );

    // Embedding gateway metrics
    describe_counter!(
        format!("{}_embedding_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total embedding API requests"
    );

    describe_histogram!(
        format!("{}_embedding_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Embedding generation latency in seconds"
    );

    describe_counter!(
        format!("{}_embedding_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total embedding API errors"
    );

    tracing::info!("Metrics registered");
}

/// Record a successful document ingestion
pub fn record_upload(duration_secs: f64, chunks_created: usize) {
    counter!(format!("{}_documents_uploaded_total", METRICS_PREFIX)).increment(1);
    counter!(format!("{}_chunks_created_total", METRICS_PREFIX))
        .increment(chunks_created as u64);
    histogram!(format!("{}_upload_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}

/// Record a completed study feature request (ask, quiz, summary, ...)
pub fn record_generation(kind: &'static str, duration_secs: f64) {
    counter!(
        format!("{}_generations_total", METRICS_PREFIX),
        "kind" => kind
    )
    .increment(1);

    histogram!(
        format!("{}_generation_duration_seconds", METRICS_PREFIX),
        "kind" => kind
    )
    .record(duration_secs);
}

/// Record one embedding API request
pub fn record_embedding(duration_secs: f64, model: &str, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_embedding_requests_total", METRICS_PREFIX),
        "model" => model.to_string(),
        "status" => status
    )
    .increment(1);

    if success {
        histogram!(
            format!("{}_embedding_duration_seconds", METRICS_PREFIX),
            "model" => model.to_string()
        )
        .record(duration_secs);
    } else {
        counter!(
            format!("{}_embedding_errors_total", METRICS_PREFIX),
            "model" => model.to_string()
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_does_not_panic_without_exporter() {
        register_metrics();
        record_upload(0.5, 3);
        record_generation("ask", 0.1);
        record_embedding(0.2, "mock-embedding", true);
        record_embedding(0.2, "mock-embedding", false);
    }
}
