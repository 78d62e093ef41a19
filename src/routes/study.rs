//! Study feature handlers
//!
//! Question answering and study aid generation. Quiz and flashcard payloads
//! carry the model's text verbatim in the documented micro-formats; clients
//! render them as-is.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::services::{AppState, FLASHCARD_COUNT};

/// Question payload shared by `/ask` and `/explain-eli5`
#[derive(Debug, Deserialize, Validate)]
pub struct QuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuizRequest {
    #[serde(default = "default_num_questions")]
    #[validate(range(min = 1, max = 20))]
    pub num_questions: usize,

    #[serde(default = "default_difficulty")]
    #[validate(length(min = 1, max = 50))]
    pub difficulty: String,
}

fn default_num_questions() -> usize {
    5
}
fn default_difficulty() -> String {
    "medium".to_string()
}

#[derive(Serialize)]
pub struct AnswerResponse {
    pub question: String,
    pub answer: String,
    pub sources: Vec<String>,
}

#[derive(Serialize)]
pub struct Eli5Response {
    pub question: String,
    pub explanation: String,
    pub sources: Vec<String>,
}

#[derive(Serialize)]
pub struct QuizResponse {
    pub quiz: String,
    pub num_questions: usize,
    pub difficulty: String,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub sources: Vec<String>,
}

#[derive(Serialize)]
pub struct FlashcardsResponse {
    pub flashcards: String,
    pub total: usize,
}

#[derive(Serialize)]
pub struct OutlineResponse {
    pub outline: String,
    pub sources: Vec<String>,
}

fn validated<T: Validate>(request: T) -> Result<T> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;
    Ok(request)
}

/// Answer a question about the uploaded documents
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<QuestionRequest>,
) -> Result<Json<AnswerResponse>> {
    let request = validated(request)?;

    let (answer, sources) = state.study.ask(&request.question).await?;

    Ok(Json(AnswerResponse {
        question: request.question,
        answer,
        sources,
    }))
}

/// Explain a concept in simple terms
pub async fn explain_eli5(
    State(state): State<AppState>,
    Json(request): Json<QuestionRequest>,
) -> Result<Json<Eli5Response>> {
    let request = validated(request)?;

    let (explanation, sources) = state.study.explain_eli5(&request.question).await?;

    Ok(Json(Eli5Response {
        question: request.question,
        explanation,
        sources,
    }))
}

/// Generate a multiple-choice quiz from the uploaded documents
pub async fn generate_quiz(
    State(state): State<AppState>,
    Json(request): Json<QuizRequest>,
) -> Result<Json<QuizResponse>> {
    let request = validated(request)?;

    let quiz = state
        .study
        .generate_quiz(request.num_questions, &request.difficulty)
        .await?;

    Ok(Json(QuizResponse {
        quiz,
        num_questions: request.num_questions,
        difficulty: request.difficulty,
    }))
}

/// Summarize the uploaded documents; 400 if the store is empty
pub async fn generate_summary(State(state): State<AppState>) -> Result<Json<SummaryResponse>> {
    let (summary, sources) = state.study.generate_summary().await?;
    Ok(Json(SummaryResponse { summary, sources }))
}

/// Generate flashcards from the uploaded documents; 400 if the store is empty
pub async fn generate_flashcards(
    State(state): State<AppState>,
) -> Result<Json<FlashcardsResponse>> {
    let flashcards = state.study.generate_flashcards().await?;
    Ok(Json(FlashcardsResponse {
        flashcards,
        total: FLASHCARD_COUNT,
    }))
}

/// Generate an outline of the uploaded documents; 400 if the store is empty
pub async fn generate_outline(State(state): State<AppState>) -> Result<Json<OutlineResponse>> {
    let (outline, sources) = state.study.generate_outline().await?;
    Ok(Json(OutlineResponse { outline, sources }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_request_defaults() {
        let request: QuizRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.num_questions, 5);
        assert_eq!(request.difficulty, "medium");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_quiz_request_rejects_out_of_range() {
        let request: QuizRequest = serde_json::from_str(r#"{"num_questions": 100}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_question_request_rejects_empty() {
        let request: QuestionRequest = serde_json::from_str(r#"{"question": ""}"#).unwrap();
        assert!(request.validate().is_err());
    }
}
