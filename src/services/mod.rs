//! Feature orchestration
//!
//! Every study feature is the same single-pass composition:
//! embed (if the feature has a query) -> retrieve -> compose -> prompt ->
//! complete -> shape response. The per-feature policy (top-k, context limit,
//! sampling parameters, empty-store behavior) lives in the constants below.

pub mod prompts;

use std::sync::Arc;
use std::time::Instant;

use crate::completion::{CompletionClient, CompletionParams};
use crate::context::compose_context;
use crate::embeddings::{Embedder, InputType};
use crate::errors::{AppError, Result};
use crate::ingestion::{self, chunker};
use crate::ingestion::chunker::ChunkingConfig;
use crate::metrics;
use crate::progress::ProgressTracker;
use crate::vector_store::{ChunkMetadata, ChunkRecord, QueryMatch, VectorStore};

// Per-feature retrieval and sampling policy.
const ASK_TOP_K: usize = 3;
const ASK_CONTEXT_LIMIT: usize = 3;
const ASK_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.5,
    max_tokens: 1000,
};

const ELI5_TOP_K: usize = 3;
const ELI5_CONTEXT_LIMIT: usize = 3;
const ELI5_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.7,
    max_tokens: 500,
};

const QUIZ_TOP_K: usize = 10;
const QUIZ_CONTEXT_LIMIT: usize = 5;
const QUIZ_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.7,
    max_tokens: 2000,
};

const SUMMARY_TOP_K: usize = 15;
const SUMMARY_CONTEXT_LIMIT: usize = 10;
const SUMMARY_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.5,
    max_tokens: 1500,
};

const FLASHCARDS_TOP_K: usize = 10;
const FLASHCARDS_CONTEXT_LIMIT: usize = 8;
const FLASHCARDS_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.7,
    max_tokens: 2000,
};

const OUTLINE_TOP_K: usize = 15;
const OUTLINE_CONTEXT_LIMIT: usize = 12;
const OUTLINE_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.5,
    max_tokens: 1500,
};

/// Flashcards generated per request
pub const FLASHCARD_COUNT: usize = 10;

/// Fill value for the placeholder vector used by sample-style retrieval.
///
/// Whole-corpus features (quiz, summary, flashcards, outline) have no natural
/// query, so they probe the index with a constant vector and take whatever
/// cross-section comes back. Retrieved content is "some subset of what's
/// stored", not thematically relevant - a known limitation kept for
/// compatibility with the stored corpus semantics.
const SAMPLE_VECTOR_FILL: f32 = 0.1;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub study: StudyService,
    pub progress: Arc<ProgressTracker>,
}

impl AppState {
    pub fn new(study: StudyService, progress: Arc<ProgressTracker>) -> Self {
        Self { study, progress }
    }
}

/// Orchestrates ingestion and every study feature over the gateway traits
#[derive(Clone)]
pub struct StudyService {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    completion: Arc<dyn CompletionClient>,
    chunking: ChunkingConfig,
    progress: Arc<ProgressTracker>,
}

impl StudyService {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        completion: Arc<dyn CompletionClient>,
        chunking: ChunkingConfig,
        progress: Arc<ProgressTracker>,
    ) -> Self {
        Self {
            embedder,
            store,
            completion,
            chunking,
            progress,
        }
    }

    /// Ingest one uploaded document: extract, chunk, embed, upsert.
    ///
    /// Returns the number of chunks stored. Re-uploading a same-named file
    /// reproduces the same chunk ids, so matching records are overwritten.
    pub async fn upload_document(&self, filename: &str, bytes: &[u8]) -> Result<usize> {
        let start = Instant::now();

        let text = ingestion::extract_text(filename, bytes)?;
        let chunks = chunker::chunk_text(&text, &self.chunking)?;

        if !chunks.is_empty() {
            let embeddings = self.embedder.embed(&chunks, InputType::Passage).await?;

            let records: Vec<ChunkRecord> = chunks
                .iter()
                .zip(embeddings)
                .enumerate()
                .map(|(index, (text, values))| ChunkRecord {
                    id: chunker::chunk_id(filename, index),
                    values,
                    metadata: ChunkMetadata {
                        text: text.clone(),
                        filename: filename.to_string(),
                        chunk_index: index,
                    },
                })
                .collect();

            self.store.upsert(records).await?;
        }

        self.progress.record_upload(filename, chunks.len());
        metrics::record_upload(start.elapsed().as_secs_f64(), chunks.len());

        tracing::info!(
            filename,
            chunks = chunks.len(),
            total_ms = start.elapsed().as_millis() as u64,
            "Document ingested"
        );

        Ok(chunks.len())
    }

    /// Answer a question grounded in the most relevant stored chunks.
    ///
    /// An empty store is not an error here: the model is asked over an empty
    /// context and answers as best it can.
    pub async fn ask(&self, question: &str) -> Result<(String, Vec<String>)> {
        let start = Instant::now();

        let query = self.embed_query(question).await?;
        let matches = self.store.query(&query, ASK_TOP_K, true).await?;
        let composed = compose_context(&matches, ASK_CONTEXT_LIMIT);

        let prompt = prompts::ask(&composed.context, question);
        let answer = self.completion.complete(&prompt, &ASK_PARAMS).await?;

        self.progress.record_question();
        metrics::record_generation("ask", start.elapsed().as_secs_f64());

        tracing::info!(
            sources = composed.sources.len(),
            context_empty = composed.is_empty(),
            "Question answered"
        );

        Ok((answer, composed.sources))
    }

    /// Explain a concept in child-friendly terms, grounded like `ask`
    pub async fn explain_eli5(&self, concept: &str) -> Result<(String, Vec<String>)> {
        let start = Instant::now();

        let query = self.embed_query(concept).await?;
        let matches = self.store.query(&query, ELI5_TOP_K, true).await?;
        let composed = compose_context(&matches, ELI5_CONTEXT_LIMIT);

        let prompt = prompts::eli5(&composed.context, concept);
        let explanation = self.completion.complete(&prompt, &ELI5_PARAMS).await?;

        metrics::record_generation("eli5", start.elapsed().as_secs_f64());

        Ok((explanation, composed.sources))
    }

    /// Generate a multiple-choice quiz from a sample of the stored corpus
    pub async fn generate_quiz(&self, num_questions: usize, difficulty: &str) -> Result<String> {
        let start = Instant::now();

        let matches = self.sample(QUIZ_TOP_K).await?;
        let composed = compose_context(&matches, QUIZ_CONTEXT_LIMIT);

        let prompt = prompts::quiz(&composed.context, num_questions, difficulty);
        let quiz = self.completion.complete(&prompt, &QUIZ_PARAMS).await?;

        self.progress.record_quiz();
        metrics::record_generation("quiz", start.elapsed().as_secs_f64());

        Ok(quiz)
    }

    /// Summarize a sample of the stored corpus; errors on an empty store
    pub async fn generate_summary(&self) -> Result<(String, Vec<String>)> {
        let start = Instant::now();

        let matches = self.sample_non_empty(SUMMARY_TOP_K).await?;
        let composed = compose_context(&matches, SUMMARY_CONTEXT_LIMIT);

        let prompt = prompts::summary(&composed.context);
        let summary = self.completion.complete(&prompt, &SUMMARY_PARAMS).await?;

        metrics::record_generation("summary", start.elapsed().as_secs_f64());

        Ok((summary, composed.sources))
    }

    /// Generate flashcards from a sample of the stored corpus; errors on an
    /// empty store
    pub async fn generate_flashcards(&self) -> Result<String> {
        let start = Instant::now();

        let matches = self.sample_non_empty(FLASHCARDS_TOP_K).await?;
        let composed = compose_context(&matches, FLASHCARDS_CONTEXT_LIMIT);

        let prompt = prompts::flashcards(&composed.context, FLASHCARD_COUNT);
        let flashcards = self.completion.complete(&prompt, &FLASHCARDS_PARAMS).await?;

        metrics::record_generation("flashcards", start.elapsed().as_secs_f64());

        Ok(flashcards)
    }

    /// Generate a hierarchical outline from a sample of the stored corpus;
    /// errors on an empty store
    pub async fn generate_outline(&self) -> Result<(String, Vec<String>)> {
        let start = Instant::now();

        let matches = self.sample_non_empty(OUTLINE_TOP_K).await?;
        let composed = compose_context(&matches, OUTLINE_CONTEXT_LIMIT);

        let prompt = prompts::outline(&composed.context);
        let outline = self.completion.complete(&prompt, &OUTLINE_PARAMS).await?;

        metrics::record_generation("outline", start.elapsed().as_secs_f64());

        Ok((outline, composed.sources))
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let embeddings = self.embedder.embed(&texts, InputType::Query).await?;

        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| AppError::EmbeddingUnavailable {
                message: "no embedding returned for query".to_string(),
            })
    }

    /// Retrieve an arbitrary cross-section of stored chunks
    async fn sample(&self, top_k: usize) -> Result<Vec<QueryMatch>> {
        let placeholder = vec![SAMPLE_VECTOR_FILL; self.embedder.dimension()];
        self.store.query(&placeholder, top_k, true).await
    }

    async fn sample_non_empty(&self, top_k: usize) -> Result<Vec<QueryMatch>> {
        let matches = self.sample(top_k).await?;
        if matches.is_empty() {
            return Err(AppError::NoDocuments);
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::MockCompletionClient;
    use crate::embeddings::MockEmbedder;
    use crate::vector_store::InMemoryStore;

    struct Fixture {
        service: StudyService,
        completion: Arc<MockCompletionClient>,
        progress: Arc<ProgressTracker>,
    }

    fn fixture() -> Fixture {
        let completion = Arc::new(MockCompletionClient::new());
        let progress = Arc::new(ProgressTracker::new());
        let service = StudyService::new(
            Arc::new(MockEmbedder::new(32)),
            Arc::new(InMemoryStore::new()),
            completion.clone(),
            ChunkingConfig::default(),
            progress.clone(),
        );
        Fixture {
            service,
            completion,
            progress,
        }
    }

    #[tokio::test]
    async fn test_upload_produces_expected_chunks() {
        let f = fixture();
        let text = "x".repeat(1200);

        let chunks = f
            .service
            .upload_document("file.txt", text.as_bytes())
            .await
            .unwrap();
        assert_eq!(chunks, 3);

        let matches = f.service.sample(10).await.unwrap();
        let mut ids: Vec<_> = matches.iter().map(|m| m.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["file.txt_0", "file.txt_1", "file.txt_2"]);
    }

    #[tokio::test]
    async fn test_reupload_overwrites_instead_of_duplicating() {
        let f = fixture();
        let text = "y".repeat(1200);

        f.service
            .upload_document("file.txt", text.as_bytes())
            .await
            .unwrap();
        f.service
            .upload_document("file.txt", text.as_bytes())
            .await
            .unwrap();

        let matches = f.service.sample(10).await.unwrap();
        assert_eq!(matches.len(), 3);
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_extension() {
        let f = fixture();
        let err = f
            .service
            .upload_document("slides.pptx", b"bytes")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFileType { .. }));
        assert_eq!(f.progress.snapshot().documents_uploaded, 0);
    }

    #[tokio::test]
    async fn test_ask_on_empty_store_proceeds_with_empty_context() {
        let f = fixture();

        let (answer, sources) = f.service.ask("What is entropy?").await.unwrap();
        assert!(!answer.is_empty());
        assert!(sources.is_empty());

        let prompts = f.completion.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Context:\n\n"));
        assert!(prompts[0].contains("What is entropy?"));
    }

    #[tokio::test]
    async fn test_ask_retrieves_matching_document() {
        let f = fixture();
        f.service
            .upload_document("thermo.txt", b"Entropy measures disorder in a system.")
            .await
            .unwrap();
        f.service
            .upload_document("bio.txt", b"Mitochondria are the powerhouse of the cell.")
            .await
            .unwrap();

        // The mock embedder maps identical text to identical vectors, so the
        // question that equals a stored chunk must retrieve it first.
        let (_, sources) = f
            .service
            .ask("Entropy measures disorder in a system.")
            .await
            .unwrap();
        assert_eq!(sources.first().map(String::as_str), Some("thermo.txt"));

        let prompts = f.completion.prompts();
        assert!(prompts[0].contains("Entropy measures disorder"));
    }

    #[tokio::test]
    async fn test_whole_corpus_features_error_on_empty_store() {
        let f = fixture();

        assert!(matches!(
            f.service.generate_summary().await.unwrap_err(),
            AppError::NoDocuments
        ));
        assert!(matches!(
            f.service.generate_flashcards().await.unwrap_err(),
            AppError::NoDocuments
        ));
        assert!(matches!(
            f.service.generate_outline().await.unwrap_err(),
            AppError::NoDocuments
        ));

        // None of the failed features reached the completion gateway.
        assert!(f.completion.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_quiz_tolerates_empty_store() {
        let f = fixture();

        let quiz = f.service.generate_quiz(5, "medium").await.unwrap();
        assert!(!quiz.is_empty());
        assert_eq!(f.progress.snapshot().quizzes_taken, 1);
    }

    #[tokio::test]
    async fn test_quiz_prompt_carries_request_parameters() {
        let f = fixture();
        f.service
            .upload_document("notes.txt", b"The Krebs cycle produces ATP.")
            .await
            .unwrap();

        f.service.generate_quiz(7, "hard").await.unwrap();

        let prompts = f.completion.prompts();
        assert!(prompts[0].contains("create 7 multiple-choice questions"));
        assert!(prompts[0].contains("hard difficulty level"));
        assert!(prompts[0].contains("Krebs cycle"));
    }

    #[tokio::test]
    async fn test_progress_counts_sequential_uploads() {
        let f = fixture();
        for name in ["a.txt", "b.txt", "c.txt"] {
            f.service
                .upload_document(name, b"short document")
                .await
                .unwrap();
        }

        let snapshot = f.progress.snapshot();
        assert_eq!(snapshot.documents_uploaded, 3);
        let names: Vec<_> = snapshot
            .uploaded_files
            .iter()
            .map(|u| u.filename.as_str())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[tokio::test]
    async fn test_ask_increments_questions_exactly_once() {
        let f = fixture();
        f.service.ask("q1").await.unwrap();
        f.service.ask("q2").await.unwrap();
        assert_eq!(f.progress.snapshot().questions_asked, 2);

        // ELI5 answers questions but does not count toward questions_asked.
        f.service.explain_eli5("gravity").await.unwrap();
        assert_eq!(f.progress.snapshot().questions_asked, 2);
    }

    #[tokio::test]
    async fn test_summary_cites_all_sampled_sources() {
        let f = fixture();
        f.service
            .upload_document("a.txt", b"Alpha document body.")
            .await
            .unwrap();
        f.service
            .upload_document("b.txt", b"Beta document body.")
            .await
            .unwrap();

        let (summary, mut sources) = f.service.generate_summary().await.unwrap();
        assert!(!summary.is_empty());
        sources.sort_unstable();
        assert_eq!(sources, vec!["a.txt", "b.txt"]);
    }
}
