//! Persisted flat vector index
//!
//! The index is one JSON artifact (`index.json`) inside the configured index
//! directory. Lookup is an exact cosine-similarity scan over every entry; the
//! FAQ sizes this serves make anything smarter unnecessary.

use anyhow::Context;
use chrono::{DateTime, Utc};
use faqa_core::{FaqError, Record, Result, ScoredRecord};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the artifact inside the index directory
pub const INDEX_FILE_NAME: &str = "index.json";

const FORMAT_VERSION: u32 = 1;

/// One record with its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub record: Record,
    pub vector: Vec<f32>,
}

/// Immutable collection of embedded records plus build metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    pub format_version: u32,

    /// Embedding model used at build time
    pub embedding_model: String,

    /// Length of every stored vector
    pub dimension: usize,

    pub created_at: DateTime<Utc>,

    /// Dataset the index was built from
    pub source: Option<String>,

    pub entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Create an empty index
    pub fn new(embedding_model: impl Into<String>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            embedding_model: embedding_model.into(),
            dimension: 0,
            created_at: Utc::now(),
            source: None,
            entries: Vec::new(),
        }
    }

    /// Record the dataset path
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Append an entry; the first vector fixes the dimension
    pub fn push(&mut self, record: Record, vector: Vec<f32>) {
        if self.entries.is_empty() {
            self.dimension = vector.len();
        }
        self.entries.push(IndexEntry { record, vector });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records whose cosine similarity to `query` is at least `score_threshold`,
    /// highest first, at most `top_k`. Ties keep dataset order.
    pub fn search(&self, query: &[f32], top_k: usize, score_threshold: f32) -> Vec<ScoredRecord> {
        if query.len() != self.dimension {
            tracing::warn!(
                query_dimension = query.len(),
                index_dimension = self.dimension,
                "query embedding dimension differs from index"
            );
        }

        let mut hits: Vec<ScoredRecord> = self
            .entries
            .iter()
            .map(|entry| ScoredRecord {
                score: cosine_similarity(query, &entry.vector),
                record: entry.record.clone(),
            })
            .filter(|hit| hit.score >= score_threshold)
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(top_k);
        hits
    }

    /// Path of the artifact inside `dir`
    pub fn artifact_path(dir: &Path) -> PathBuf {
        dir.join(INDEX_FILE_NAME)
    }

    /// Whether an artifact exists in `dir`
    pub fn exists(dir: &Path) -> bool {
        Self::artifact_path(dir).is_file()
    }

    /// Save atomically: write a uniquely named temp file next to the target,
    /// flush it to disk, then rename it over the artifact. Concurrent saves
    /// never share a temp file; the last rename wins.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating index directory {}", dir.display()))?;

        let json = serde_json::to_vec(self).context("serializing vector index")?;

        let path = Self::artifact_path(dir);
        let mut tmp = tempfile::Builder::new()
            .prefix(INDEX_FILE_NAME)
            .suffix(".tmp")
            .tempfile_in(dir)
            .with_context(|| format!("creating temp file in {}", dir.display()))?;
        tmp.write_all(&json)
            .with_context(|| format!("writing {}", tmp.path().display()))?;
        tmp.as_file()
            .sync_all()
            .with_context(|| format!("syncing {}", tmp.path().display()))?;
        tmp.persist(&path)
            .with_context(|| format!("replacing {}", path.display()))?;

        tracing::debug!(path = %path.display(), entries = self.len(), "vector index saved");
        Ok(path)
    }

    /// [`save`](Self::save) on the blocking thread pool
    pub async fn save_async(self, dir: PathBuf) -> Result<(Self, PathBuf)> {
        tokio::task::spawn_blocking(move || {
            let path = self.save(&dir)?;
            Ok((self, path))
        })
        .await
        .context("index save task failed")?
    }

    /// [`load`](Self::load) on the blocking thread pool
    pub async fn load_async(dir: PathBuf) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::load(&dir))
            .await
            .context("index load task failed")?
    }

    /// Load the artifact from `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        let path = Self::artifact_path(dir);
        if !path.is_file() {
            return Err(FaqError::IndexNotFound {
                path: dir.to_path_buf(),
            });
        }

        let corrupted = |message: String| FaqError::IndexCorrupted {
            path: path.clone(),
            message,
        };

        let data = std::fs::read(&path).map_err(|e| corrupted(e.to_string()))?;
        let index: Self = serde_json::from_slice(&data).map_err(|e| corrupted(e.to_string()))?;

        if index.format_version != FORMAT_VERSION {
            return Err(corrupted(format!(
                "unsupported format version {}",
                index.format_version
            )));
        }

        Ok(index)
    }
}

/// Cosine similarity in [-1, 1]; 0 for empty, zero-norm or mismatched vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}
