//! FAQA RAG - Retrieval-augmented answers over the FAQ index
//!
//! One question runs through a fixed, sequential pipeline:
//! - load the persisted vector index
//! - embed the question and keep the records above the score threshold
//! - fill the answer prompt with those records
//! - ask the completion service
//!
//! No retries are attempted; the first service failure is returned.

use faqa_core::{Answer, AppConfig, EmbeddingClient, FaqError, LlmClient, Result};
use faqa_vector::VectorIndex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

pub mod llm;
pub mod prompt;

pub use llm::{create_llm_client, GeminiClient, OllamaClient, OpenAiClient};
pub use prompt::{build_context, PromptTemplate, ANSWER_TEMPLATE};

// ============================================================================
// Configuration
// ============================================================================

/// Answer pipeline parameters
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum number of records put into the context
    pub top_k: usize,

    /// Minimum cosine similarity a record needs to be used
    pub score_threshold: f32,

    /// Sampling temperature sent with every completion
    pub temperature: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            score_threshold: 0.5,
            temperature: 0.1,
        }
    }
}

impl PipelineConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            score_threshold: config.retrieval.score_threshold,
            temperature: config.llm.temperature,
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Question -> retrieval -> prompt -> completion
pub struct AnswerPipeline {
    index_dir: PathBuf,
    embedder: Arc<dyn EmbeddingClient>,
    llm: Arc<dyn LlmClient>,
    template: PromptTemplate,
    config: PipelineConfig,
}

impl AnswerPipeline {
    pub fn new(
        index_dir: impl Into<PathBuf>,
        embedder: Arc<dyn EmbeddingClient>,
        llm: Arc<dyn LlmClient>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            index_dir: index_dir.into(),
            embedder,
            llm,
            template: PromptTemplate::default(),
            config,
        }
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    /// Whether an index artifact is present
    pub fn index_ready(&self) -> bool {
        VectorIndex::exists(&self.index_dir)
    }

    /// Answer one question.
    ///
    /// The index is read from disk on every call, so a rebuild is picked up
    /// by the next question. When nothing clears the threshold the model is
    /// still asked, with an empty context.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let start = Instant::now();

        if question.trim().is_empty() {
            return Err(FaqError::InvalidQuestion(
                "Question cannot be empty".to_string(),
            ));
        }

        tracing::info!("answer pipeline started");

        let index = VectorIndex::load_async(self.index_dir.clone()).await?;
        if index.embedding_model != self.embedder.model_name() {
            tracing::warn!(
                index_model = %index.embedding_model,
                query_model = self.embedder.model_name(),
                "index was built with a different embedding model"
            );
        }

        let query = self.embedder.embed(question).await?;
        let sources = index.search(&query, self.config.top_k, self.config.score_threshold);
        tracing::debug!(
            candidates = index.len(),
            retrieved = sources.len(),
            "retrieval finished"
        );

        let prompt = self.template.answer_prompt(&sources, question);

        tracing::info!(
            llm = self.llm.name(),
            "calling LLM with prompt length: {} chars",
            prompt.len()
        );
        let text = self.llm.complete(&prompt, self.config.temperature).await?;
        tracing::info!("LLM response received: {} chars", text.len());

        Ok(Answer {
            text,
            sources,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use faqa_core::testing::{
        ContextAnswerLlm, FailingLlm, FixedEmbedding, KeywordEmbedding, UNKNOWN_ANSWER,
    };
    use faqa_vector::IndexBuilder;

    const FAQ: &str = "Question,Answer\n\
        Do you have JavaScript course?,\"Yes, we offer a JavaScript course.\"\n\
        Do you have Python course?,No\n\
        What is the refund policy?,Refund within 7 days\n\
        Do you provide an internship?,Yes after the course\n";

    struct Fixture {
        _dir: tempfile::TempDir,
        index_dir: PathBuf,
        embedder: Arc<KeywordEmbedding>,
        llm: Arc<ContextAnswerLlm>,
    }

    impl Fixture {
        fn pipeline(&self, config: PipelineConfig) -> AnswerPipeline {
            AnswerPipeline::new(
                &self.index_dir,
                self.embedder.clone(),
                self.llm.clone(),
                config,
            )
        }
    }

    async fn built_fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("data1.csv");
        std::fs::write(&dataset, FAQ).unwrap();

        let index_dir = dir.path().join("faiss_index");
        let embedder = Arc::new(KeywordEmbedding::faq_vocabulary());
        IndexBuilder::new(embedder.clone(), &index_dir)
            .build_index(&dataset, "Question")
            .await
            .unwrap();

        Fixture {
            _dir: dir,
            index_dir,
            embedder,
            llm: Arc::new(ContextAnswerLlm::new()),
        }
    }

    #[tokio::test]
    async fn test_answer_from_retrieved_record() {
        let fixture = built_fixture().await;
        let pipeline = fixture.pipeline(PipelineConfig::default());

        let answer = pipeline
            .answer("Do you have a JavaScript course?")
            .await
            .unwrap();

        assert_eq!(answer.text, "Yes, we offer a JavaScript course.");
        assert_eq!(answer.sources[0].record.question, "Do you have JavaScript course?");
        assert!(answer
            .sources
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
        assert!(answer.sources.iter().all(|s| s.score >= 0.5));
    }

    #[tokio::test]
    async fn test_missing_index_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = AnswerPipeline::new(
            dir.path().join("faiss_index"),
            Arc::new(KeywordEmbedding::faq_vocabulary()),
            Arc::new(ContextAnswerLlm::new()),
            PipelineConfig::default(),
        );

        assert!(!pipeline.index_ready());
        let err = pipeline.answer("Do you have a JavaScript course?").await.unwrap_err();
        assert!(matches!(err, FaqError::IndexNotFound { .. }));
    }

    #[tokio::test]
    async fn test_unrelated_question_gets_empty_context() {
        let fixture = built_fixture().await;
        let pipeline = fixture.pipeline(PipelineConfig::default());

        let answer = pipeline.answer("What is the weather on Mars?").await.unwrap();

        assert_eq!(answer.text, UNKNOWN_ANSWER);
        assert!(answer.sources.is_empty());

        let prompts = fixture.llm.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].0.contains("CONTEXT: \n\nQUESTION: What is the weather on Mars?"));
    }

    #[tokio::test]
    async fn test_blank_question_rejected_before_services() {
        let fixture = built_fixture().await;
        let pipeline = fixture.pipeline(PipelineConfig::default());
        let calls_after_build = fixture.embedder.calls();

        let err = pipeline.answer("   ").await.unwrap_err();
        assert!(matches!(err, FaqError::InvalidQuestion(_)));
        assert_eq!(fixture.embedder.calls(), calls_after_build);
        assert!(fixture.llm.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_temperature_and_question_passed_through() {
        let fixture = built_fixture().await;
        let pipeline = fixture.pipeline(PipelineConfig {
            temperature: 0.7,
            ..PipelineConfig::default()
        });

        pipeline.answer("What is the {refund} policy?").await.unwrap();

        let (prompt, temperature) = fixture.llm.prompts().remove(0);
        assert_eq!(temperature, 0.7);
        assert!(prompt.ends_with("QUESTION: What is the {refund} policy?"));
    }

    #[tokio::test]
    async fn test_top_k_limits_context() {
        let fixture = built_fixture().await;
        let pipeline = fixture.pipeline(PipelineConfig {
            top_k: 1,
            score_threshold: 0.0,
            ..PipelineConfig::default()
        });

        let answer = pipeline.answer("Do you have Python course?").await.unwrap();
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.text, "No");
    }

    #[tokio::test]
    async fn test_threshold_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = VectorIndex::new("fixed-test");
        index.push(faqa_core::Record::new(0, "q", "a"), vec![1.0, 0.0]);
        index.save(dir.path()).unwrap();

        let below = vec![0.49_f32, (1.0_f32 - 0.49 * 0.49).sqrt()];
        let above = vec![0.51_f32, (1.0_f32 - 0.51 * 0.51).sqrt()];
        let embedder = FixedEmbedding::new(vec![0.0, 1.0])
            .with("below", below)
            .with("above", above);

        let pipeline = AnswerPipeline::new(
            dir.path(),
            Arc::new(embedder),
            Arc::new(ContextAnswerLlm::new()),
            PipelineConfig::default(),
        );

        assert!(pipeline.answer("below").await.unwrap().sources.is_empty());
        assert_eq!(pipeline.answer("above").await.unwrap().sources.len(), 1);
    }

    #[tokio::test]
    async fn test_completion_failure_propagates() {
        let fixture = built_fixture().await;
        let pipeline = AnswerPipeline::new(
            &fixture.index_dir,
            fixture.embedder.clone(),
            Arc::new(FailingLlm),
            PipelineConfig::default(),
        );

        let err = pipeline
            .answer("Do you have a JavaScript course?")
            .await
            .unwrap_err();
        assert!(matches!(err, FaqError::CompletionService(_)));
    }

    #[test]
    fn test_config_from_app_config() {
        let mut app = AppConfig::default();
        app.retrieval.top_k = 2;
        app.llm.temperature = 0.3;

        let config = PipelineConfig::from_app_config(&app);
        assert_eq!(config.top_k, 2);
        assert_eq!(config.score_threshold, 0.5);
        assert_eq!(config.temperature, 0.3);
    }
}
