//! FAQA Vector - Dataset loading and the persisted vector index
//!
//! Turns the FAQ CSV into embedded records and stores them as a single
//! immutable index artifact that the answer pipeline loads per request.

pub mod builder;
pub mod dataset;
pub mod embedding;
pub mod index;

pub use builder::{IndexBuilder, IndexSummary};
pub use dataset::CsvDataset;
pub use embedding::{create_embedding_client, GeminiEmbedding, OllamaEmbedding, OpenAiEmbedding};
pub use index::{cosine_similarity, IndexEntry, VectorIndex, INDEX_FILE_NAME};
