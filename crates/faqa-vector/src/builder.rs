//! Index builder: dataset -> embeddings -> persisted index

use crate::dataset::CsvDataset;
use crate::index::VectorIndex;
use faqa_core::{EmbeddingClient, FaqError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Outcome of a successful build
#[derive(Debug, Clone, Serialize)]
pub struct IndexSummary {
    /// Number of indexed records
    pub records: usize,
    pub dimension: usize,
    pub embedding_model: String,
    /// Artifact written
    pub path: PathBuf,
    pub elapsed_ms: u64,
}

/// Builds the vector index from the FAQ dataset
pub struct IndexBuilder {
    embedder: Arc<dyn EmbeddingClient>,
    index_dir: PathBuf,
    answer_column: String,
}

impl IndexBuilder {
    pub fn new(embedder: Arc<dyn EmbeddingClient>, index_dir: impl Into<PathBuf>) -> Self {
        Self {
            embedder,
            index_dir: index_dir.into(),
            answer_column: "Answer".to_string(),
        }
    }

    pub fn with_answer_column(mut self, column: impl Into<String>) -> Self {
        self.answer_column = column.into();
        self
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    /// Embed every record's key text and replace the index artifact.
    ///
    /// Records are embedded one at a time, in dataset order.
    pub async fn build_index(
        &self,
        dataset_path: impl AsRef<Path>,
        key_column: &str,
    ) -> Result<IndexSummary> {
        let start = Instant::now();
        let dataset_path = dataset_path.as_ref();

        tracing::info!(dataset = %dataset_path.display(), key_column, "building vector index");

        let records = CsvDataset::new(key_column)
            .with_answer_column(self.answer_column.clone())
            .load(dataset_path)?;

        let mut index = VectorIndex::new(self.embedder.model_name())
            .with_source(dataset_path.display().to_string());

        for record in records {
            let vector = self.embedder.embed(&record.question).await?;

            if !index.is_empty() && vector.len() != index.dimension {
                return Err(FaqError::EmbeddingService(format!(
                    "inconsistent embedding dimension for row {}: expected {}, got {}",
                    record.row,
                    index.dimension,
                    vector.len()
                )));
            }

            tracing::debug!(row = record.row, "record embedded");
            index.push(record, vector);
        }

        let (index, path) = index.save_async(self.index_dir.clone()).await?;

        let summary = IndexSummary {
            records: index.len(),
            dimension: index.dimension,
            embedding_model: index.embedding_model,
            path,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            records = summary.records,
            dimension = summary.dimension,
            path = %summary.path.display(),
            "vector index built"
        );

        Ok(summary)
    }
}
