//! Deterministic stand-ins for the embedding and completion services.
//!
//! Enabled with the `test-utils` feature so downstream crates can exercise
//! the index builder, the answer pipeline and the HTTP surface offline.

use crate::{EmbeddingClient, FaqError, LlmClient, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Fallback answer the prompt asks for when context is insufficient
pub const UNKNOWN_ANSWER: &str = "I don't know.";

/// Bag-of-words embedding over a fixed vocabulary.
///
/// Each vocabulary word is one axis; words outside the vocabulary are
/// ignored, so an unrelated question embeds to the zero vector.
pub struct KeywordEmbedding {
    vocabulary: Vec<String>,
    model: String,
    calls: AtomicUsize,
}

impl KeywordEmbedding {
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vocabulary: vocabulary
                .into_iter()
                .map(|w| w.into().to_lowercase())
                .collect(),
            model: "keyword-test".to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Vocabulary covering the sample FAQ used across the test suites
    pub fn faq_vocabulary() -> Self {
        Self::new([
            "do",
            "you",
            "have",
            "javascript",
            "python",
            "course",
            "refund",
            "policy",
            "internship",
            "power",
            "bi",
            "tableau",
            "emi",
            "payment",
        ])
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Number of `embed` calls served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingClient for KeywordEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut vector = vec![0.0; self.vocabulary.len()];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            if let Some(axis) = self.vocabulary.iter().position(|w| *w == token) {
                vector[axis] += 1.0;
            }
        }
        Ok(vector)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Embedding that returns preset vectors per exact text
pub struct FixedEmbedding {
    vectors: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
}

impl FixedEmbedding {
    pub fn new(fallback: Vec<f32>) -> Self {
        Self {
            vectors: HashMap::new(),
            fallback,
        }
    }

    pub fn with(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }
}

#[async_trait]
impl EmbeddingClient for FixedEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }

    fn model_name(&self) -> &str {
        "fixed-test"
    }
}

/// Embedding provider that is always unreachable
pub struct FailingEmbedding;

#[async_trait]
impl EmbeddingClient for FailingEmbedding {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(FaqError::EmbeddingService(
            "connection refused".to_string(),
        ))
    }

    fn model_name(&self) -> &str {
        "failing-test"
    }
}

/// Completion stub that answers from the prompt's context.
///
/// Replies with the first `Answer:` line of the CONTEXT section, or
/// [`UNKNOWN_ANSWER`] when the context holds none. Every prompt is kept for
/// later inspection.
#[derive(Default)]
pub struct ContextAnswerLlm {
    prompts: Mutex<Vec<(String, f32)>>,
}

impl ContextAnswerLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prompts received so far with their temperatures
    pub fn prompts(&self) -> Vec<(String, f32)> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    fn context_of(prompt: &str) -> &str {
        let start = prompt
            .find("CONTEXT:")
            .map(|i| i + "CONTEXT:".len())
            .unwrap_or(prompt.len());
        let end = prompt.rfind("QUESTION:").unwrap_or(prompt.len()).max(start);
        &prompt[start..end]
    }
}

#[async_trait]
impl LlmClient for ContextAnswerLlm {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push((prompt.to_string(), temperature));
        }

        let answer = Self::context_of(prompt)
            .lines()
            .find_map(|line| line.trim().strip_prefix("Answer:"))
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| UNKNOWN_ANSWER.to_string());

        Ok(answer)
    }

    fn name(&self) -> &str {
        "context-answer-test"
    }
}

/// Completion service that always rejects the request
pub struct FailingLlm;

#[async_trait]
impl LlmClient for FailingLlm {
    async fn complete(&self, _prompt: &str, _temperature: f32) -> Result<String> {
        Err(FaqError::CompletionService(
            "429 Too Many Requests".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "failing-test"
    }
}
