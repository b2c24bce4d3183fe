//! FAQ dataset loader using the csv crate
//!
//! Reads a UTF-8 CSV whose first row is the header. Every data row becomes
//! one [`Record`]; the key column supplies the text that gets embedded.

use std::io::Read;
use std::path::Path;

use faqa_core::{FaqError, Field, Record, Result};

/// CSV loader for the FAQ sheet
#[derive(Debug, Clone)]
pub struct CsvDataset {
    /// Column used as the retrieval key
    pub key_column: String,
    /// Column holding the answer text
    pub answer_column: String,
}

impl CsvDataset {
    /// Create a loader with the given key column and the default `Answer` column
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
            answer_column: "Answer".to_string(),
        }
    }

    /// Set the answer column
    pub fn with_answer_column(mut self, column: impl Into<String>) -> Self {
        self.answer_column = column.into();
        self
    }

    /// Load all records from a file
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Vec<Record>> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(FaqError::DataSource(format!(
                "dataset file not found: {}",
                path.display()
            )));
        }

        let file = std::fs::File::open(path).map_err(|e| {
            FaqError::DataSource(format!("cannot open {}: {e}", path.display()))
        })?;

        self.read(file, &path.display().to_string())
    }

    /// Load all records from any reader; `source` names it in errors
    pub fn read<R: Read>(&self, reader: R, source: &str) -> Result<Vec<Record>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| FaqError::DataSource(format!("{source}: unreadable header: {e}")))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let key_idx = self.column_index(&headers, &self.key_column, source)?;
        let answer_idx = self.column_index(&headers, &self.answer_column, source)?;

        let mut records = Vec::new();
        for (line, row) in csv_reader.records().enumerate() {
            let row = row.map_err(|e| {
                FaqError::DataSource(format!("{source}: malformed row {}: {e}", line + 1))
            })?;

            if row.iter().all(|cell| cell.is_empty()) {
                continue;
            }

            let fields: Vec<Field> = headers
                .iter()
                .zip(row.iter())
                .map(|(name, value)| Field::new(name.clone(), value))
                .collect();

            records.push(Record {
                row: records.len(),
                question: row.get(key_idx).unwrap_or_default().to_string(),
                answer: row.get(answer_idx).unwrap_or_default().to_string(),
                fields,
            });
        }

        if records.is_empty() {
            return Err(FaqError::DataSource(format!(
                "{source}: dataset contains no records"
            )));
        }

        tracing::debug!(source, records = records.len(), "dataset loaded");
        Ok(records)
    }

    fn column_index(&self, headers: &[String], column: &str, source: &str) -> Result<usize> {
        headers.iter().position(|h| h == column).ok_or_else(|| {
            FaqError::DataSource(format!(
                "{source}: column '{column}' not found (columns: {})",
                headers.join(", ")
            ))
        })
    }
}

impl Default for CsvDataset {
    fn default() -> Self {
        Self::new("Question")
    }
}
