//! Study progress tracking
//!
//! In-process counters, zeroed at startup and never persisted. Held behind
//! an explicit tracker in `AppState` rather than a process global so tests
//! can construct isolated instances. Best-effort telemetry: counters are
//! individually atomic but a snapshot is not cross-field consistent.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// One successfully ingested document
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    pub filename: String,
    pub upload_time: DateTime<Utc>,
    pub chunks: usize,
}

/// Point-in-time view of the counters
#[derive(Debug, Serialize)]
pub struct ProgressSnapshot {
    pub questions_asked: u64,
    pub documents_uploaded: u64,
    pub quizzes_taken: u64,
    pub uploaded_files: Vec<UploadedFile>,
}

/// Process-wide progress counters
#[derive(Default)]
pub struct ProgressTracker {
    questions_asked: AtomicU64,
    documents_uploaded: AtomicU64,
    quizzes_taken: AtomicU64,
    uploaded_files: Mutex<Vec<UploadedFile>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_question(&self) {
        self.questions_asked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_quiz(&self) {
        self.quizzes_taken.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upload(&self, filename: &str, chunks: usize) {
        self.documents_uploaded.fetch_add(1, Ordering::Relaxed);
        self.uploaded_files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(UploadedFile {
                filename: filename.to_string(),
                upload_time: Utc::now(),
                chunks,
            });
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            questions_asked: self.questions_asked.load(Ordering::Relaxed),
            documents_uploaded: self.documents_uploaded.load(Ordering::Relaxed),
            quizzes_taken: self.quizzes_taken.load(Ordering::Relaxed),
            uploaded_files: self
                .uploaded_files
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}
