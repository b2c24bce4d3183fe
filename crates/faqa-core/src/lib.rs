//! FAQA Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout FAQA:
//! - FAQ records and retrieval results
//! - The answer returned to callers
//! - Common error types
//! - Service traits for embedding and completion providers
//! - Configuration management and logging bootstrap

pub mod config;
pub mod logging;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::{
    AppConfig, ConfigError, CredentialsConfig, DatasetConfig, EmbeddingConfig, IndexConfig,
    LlmConfig, LoggingConfig, Provider, RetrievalConfig, ServerConfig,
};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for FAQA operations
#[derive(Error, Debug)]
pub enum FaqError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    #[error("Completion service error: {0}")]
    CompletionService(String),

    #[error("Vector index not found at {}; build the index first", path.display())]
    IndexNotFound { path: PathBuf },

    #[error("Vector index at {} is unreadable: {message}", path.display())]
    IndexCorrupted { path: PathBuf, message: String },

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, FaqError>;

impl From<ConfigError> for FaqError {
    fn from(err: ConfigError) -> Self {
        FaqError::Configuration(err.to_string())
    }
}

// ============================================================================
// Records
// ============================================================================

/// One named cell of a dataset row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One FAQ entry loaded from the dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Zero-based data row (header excluded)
    pub row: usize,

    /// Value of the retrieval key column
    pub question: String,

    /// Value of the answer column
    pub answer: String,

    /// Every column of the row in dataset order, key and answer included
    pub fields: Vec<Field>,
}

impl Record {
    /// Create a record with only the key and answer columns
    pub fn new(row: usize, question: impl Into<String>, answer: impl Into<String>) -> Self {
        let question = question.into();
        let answer = answer.into();
        Self {
            row,
            fields: vec![
                Field::new("Question", question.clone()),
                Field::new("Answer", answer.clone()),
            ],
            question,
            answer,
        }
    }

    /// Look up a column value by name
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Text placed into the prompt: one `column: value` line per field
    pub fn page_content(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("{}: {}", f.name, f.value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A record returned by retrieval together with its similarity score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub record: Record,

    /// Cosine similarity to the query (higher is closer)
    pub score: f32,
}

// ============================================================================
// Answers
// ============================================================================

/// Result of one answer pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Text generated by the language model
    pub text: String,

    /// Records supplied as context, highest similarity first
    pub sources: Vec<ScoredRecord>,

    /// Wall time spent in the pipeline
    pub processing_time_ms: u64,
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for embedding providers
#[async_trait::async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Model identifier, recorded in the index at build time
    fn model_name(&self) -> &str;
}

/// Trait for LLM completion clients
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for the prompt
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================
