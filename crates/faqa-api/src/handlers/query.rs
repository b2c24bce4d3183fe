//! Question answering handler

use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use faqa_core::ScoredRecord;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query request body
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// User's question
    pub question: String,

    /// Include retrieved records in the response
    #[serde(default = "default_true")]
    pub include_sources: bool,
}

fn default_true() -> bool {
    true
}

/// A retrieved FAQ entry
#[derive(Debug, Serialize)]
pub struct Source {
    pub row: usize,
    pub question: String,
    pub answer: String,
    /// Cosine similarity to the question
    pub score: f32,
}

impl From<ScoredRecord> for Source {
    fn from(hit: ScoredRecord) -> Self {
        Self {
            row: hit.record.row,
            question: hit.record.question,
            answer: hit.record.answer,
            score: hit.score,
        }
    }
}

/// Query response body
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    /// Generated answer
    pub answer: String,

    /// Records used as context, highest similarity first
    pub sources: Vec<Source>,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Answer a question from the FAQ
pub async fn query_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    if request.question.trim().is_empty() {
        return Err(AppError::BadRequest("Question cannot be empty".to_string()));
    }

    let answer = state.pipeline.answer(&request.question).await.map_err(|e| {
        tracing::error!(error = %e, "query failed");
        AppError::from(e)
    })?;

    let sources = if request.include_sources {
        answer.sources.into_iter().map(Source::from).collect()
    } else {
        Vec::new()
    };

    Ok(Json(QueryResponse {
        answer: answer.text,
        sources,
        processing_time_ms: answer.processing_time_ms,
    }))
}
