//! Application state management

use faqa_core::{AppConfig, EmbeddingClient, LlmClient};
use faqa_rag::{AnswerPipeline, PipelineConfig};
use faqa_vector::IndexBuilder;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Question answering over the persisted index
    pub pipeline: AnswerPipeline,
    /// Rebuilds the index from the configured dataset
    pub builder: IndexBuilder,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
}

impl AppState {
    /// Wire the pipeline and the builder to the same embedding provider
    pub fn new(
        config: AppConfig,
        embedder: Arc<dyn EmbeddingClient>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        let pipeline = AnswerPipeline::new(
            &config.index.path,
            embedder.clone(),
            llm,
            PipelineConfig::from_app_config(&config),
        );
        let builder = IndexBuilder::new(embedder, &config.index.path)
            .with_answer_column(config.dataset.answer_column.clone());

        Self {
            config,
            pipeline,
            builder,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        }
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Ready once an index artifact exists
    pub fn is_ready(&self) -> bool {
        self.pipeline.index_ready()
    }
}
