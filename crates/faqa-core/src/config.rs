//! FAQA Configuration Management
//!
//! Handles configuration from environment variables and TOML config files
//! with defaults that match a local development setup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// FAQ dataset location and schema
    pub dataset: DatasetConfig,

    /// Vector index artifact location
    pub index: IndexConfig,

    /// Embedding provider configuration
    pub embedding: EmbeddingConfig,

    /// Completion provider configuration
    pub llm: LlmConfig,

    /// Provider API credentials
    pub credentials: CredentialsConfig,

    /// Retrieval parameters
    pub retrieval: RetrievalConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Startup loading used by the binaries.
    ///
    /// Reads `.env` into the process environment if present, then takes the
    /// TOML file (when given) or the defaults, and applies env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(env_file) = dotenvy::dotenv() {
            tracing::debug!(path = %env_file.display(), "loaded .env");
        }

        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env_override()
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(host) = lookup("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("API_PORT") {
            self.server.port = parse_value("API_PORT", &port)?;
        }

        // Dataset and index
        if let Some(path) = lookup("FAQ_DATASET") {
            self.dataset.path = PathBuf::from(path);
        }
        if let Some(column) = lookup("FAQ_KEY_COLUMN") {
            self.dataset.key_column = column;
        }
        if let Some(path) = lookup("FAQ_INDEX_PATH") {
            self.index.path = PathBuf::from(path);
        }

        // Embedding
        if let Some(provider) = lookup("EMBEDDING_PROVIDER") {
            self.embedding.provider = provider.parse()?;
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            self.embedding.model = Some(model);
        }

        // LLM
        if let Some(provider) = lookup("LLM_PROVIDER") {
            self.llm.provider = provider.parse()?;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = Some(model);
        }
        if let Some(temperature) = lookup("LLM_TEMPERATURE") {
            self.llm.temperature = parse_value("LLM_TEMPERATURE", &temperature)?;
        }
        if let Some(url) = lookup("OLLAMA_URL") {
            self.llm.ollama_url = url.clone();
            self.embedding.ollama_url = url;
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.llm.openai_base_url = Some(url.clone());
            self.embedding.openai_base_url = Some(url);
        }

        // Always use env for sensitive values
        if let Some(key) = lookup("GOOGLE_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.credentials.google_api_key = Some(key);
        }
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.credentials.openai_api_key = Some(key);
        }

        // Retrieval
        if let Some(top_k) = lookup("RETRIEVAL_TOP_K") {
            self.retrieval.top_k = parse_value("RETRIEVAL_TOP_K", &top_k)?;
        }
        if let Some(threshold) = lookup("RETRIEVAL_SCORE_THRESHOLD") {
            self.retrieval.score_threshold = parse_value("RETRIEVAL_SCORE_THRESHOLD", &threshold)?;
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("LOG_JSON") {
            self.logging.json_format = parse_value("LOG_JSON", &json)?;
        }

        Ok(self)
    }

    /// Check startup preconditions: credentials for the active providers and
    /// sane retrieval parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.credentials.require_for(self.llm.provider)?;
        self.credentials.require_for(self.embedding.provider)?;

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                key: "retrieval.top_k".to_string(),
                value: "0".to_string(),
            });
        }
        if !(-1.0..=1.0).contains(&self.retrieval.score_threshold) {
            return Err(ConfigError::InvalidValue {
                key: "retrieval.score_threshold".to_string(),
                value: self.retrieval.score_threshold.to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::InvalidValue {
                key: "llm.temperature".to_string(),
                value: self.llm.temperature.to_string(),
            });
        }

        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 120,
        }
    }
}

/// FAQ dataset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// CSV file with the FAQ entries
    pub path: PathBuf,

    /// Column used as the retrieval key
    pub key_column: String,

    /// Column holding the answer text
    pub answer_column: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data1.csv"),
            key_column: "Question".to_string(),
            answer_column: "Answer".to_string(),
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory holding the index artifact
    pub path: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("faiss_index"),
        }
    }
}

/// Supported embedding and completion providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAI,
    Ollama,
    Gemini,
}

impl std::str::FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            "gemini" | "google" => Ok(Self::Gemini),
            _ => Err(ConfigError::InvalidValue {
                key: "provider".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::Ollama => write!(f, "ollama"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding provider to use
    pub provider: Provider,

    /// Model name; the provider default is used when unset
    pub model: Option<String>,

    /// Ollama server URL
    pub ollama_url: String,

    /// OpenAI-compatible endpoint; the public API is used when unset
    pub openai_base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl EmbeddingConfig {
    /// Configured model or the provider's default embedding model
    pub fn model_name(&self) -> &str {
        match &self.model {
            Some(model) => model,
            None => match self.provider {
                Provider::OpenAI => "text-embedding-3-small",
                Provider::Ollama => "nomic-embed-text",
                Provider::Gemini => "text-embedding-004",
            },
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Ollama,
            model: None,
            ollama_url: "http://localhost:11434".to_string(),
            openai_base_url: None,
            timeout_secs: 30,
        }
    }
}

/// Completion provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// LLM provider to use
    pub provider: Provider,

    /// Model name; the provider default is used when unset
    pub model: Option<String>,

    /// OpenAI API base URL (for compatible APIs)
    pub openai_base_url: Option<String>,

    /// Ollama server URL
    pub ollama_url: String,

    /// Maximum tokens for completion
    pub max_tokens: u32,

    /// Sampling temperature; kept low for reproducible answers
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Configured model or the provider's default chat model
    pub fn model_name(&self) -> &str {
        match &self.model {
            Some(model) => model,
            None => match self.provider {
                Provider::OpenAI => "gpt-4o-mini",
                Provider::Ollama => "llama3",
                Provider::Gemini => "gemini-1.5-flash",
            },
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Gemini,
            model: None,
            openai_base_url: None,
            ollama_url: "http://localhost:11434".to_string(),
            max_tokens: 1024,
            temperature: 0.1,
            timeout_secs: 60,
        }
    }
}

/// API credentials for hosted providers
#[derive(Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Google Generative Language API key
    pub google_api_key: Option<String>,

    /// OpenAI API key
    pub openai_api_key: Option<String>,
}

impl CredentialsConfig {
    /// Key for a hosted provider, `None` for providers that need no key
    pub fn api_key_for(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Gemini => self.google_api_key.as_deref(),
            Provider::OpenAI => self.openai_api_key.as_deref(),
            Provider::Ollama => None,
        }
    }

    /// Fail when the provider needs a key that is not configured
    pub fn require_for(&self, provider: Provider) -> Result<(), ConfigError> {
        let variable = match provider {
            Provider::Gemini => "GOOGLE_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Ollama => return Ok(()),
        };

        match self.api_key_for(provider) {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(ConfigError::MissingRequired(variable.to_string())),
        }
    }
}

// Keys stay out of logs
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("google_api_key", &self.google_api_key.as_ref().map(|_| "***"))
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum number of records placed into the prompt
    pub top_k: usize,

    /// Minimum cosine similarity for a record to be retrieved
    pub score_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            score_threshold: 0.5,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {message}", path.display())]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.dataset.key_column, "Question");
        assert_eq!(config.index.path, PathBuf::from("faiss_index"));
        assert_eq!(config.retrieval.score_threshold, 0.5);
        assert_eq!(config.llm.provider, Provider::Gemini);
        assert!((config.llm.temperature - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAI);
        assert_eq!("Ollama".parse::<Provider>().unwrap(), Provider::Ollama);
        assert_eq!("google".parse::<Provider>().unwrap(), Provider::Gemini);
        assert!("invalid".parse::<Provider>().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::default()
            .with_overrides(lookup(&[
                ("API_PORT", "9000"),
                ("LLM_PROVIDER", "ollama"),
                ("FAQ_INDEX_PATH", "/tmp/idx"),
                ("RETRIEVAL_TOP_K", "2"),
                ("OPENAI_API_KEY", "sk-test"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.llm.provider, Provider::Ollama);
        assert_eq!(config.llm.model_name(), "llama3");
        assert_eq!(config.index.path, PathBuf::from("/tmp/idx"));
        assert_eq!(config.retrieval.top_k, 2);
        assert_eq!(config.credentials.openai_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_openai_base_url_applies_to_both_providers() {
        assert!(AppConfig::default().embedding.openai_base_url.is_none());

        let config = AppConfig::default()
            .with_overrides(lookup(&[("OPENAI_BASE_URL", "http://localhost:1234/v1")]))
            .unwrap();

        assert_eq!(
            config.llm.openai_base_url.as_deref(),
            Some("http://localhost:1234/v1")
        );
        assert_eq!(
            config.embedding.openai_base_url.as_deref(),
            Some("http://localhost:1234/v1")
        );
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = AppConfig::default()
            .with_overrides(lookup(&[("API_PORT", "not-a-port")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "API_PORT"));
    }

    #[test]
    fn test_validate_requires_google_key_for_gemini() {
        let config = AppConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(var) if var == "GOOGLE_API_KEY"));

        let config = AppConfig::default()
            .with_overrides(lookup(&[("GOOGLE_API_KEY", "key")]))
            .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_key_is_missing() {
        let config = AppConfig::default()
            .with_overrides(lookup(&[("GOOGLE_API_KEY", "   ")]))
            .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama_needs_no_key() {
        let config = AppConfig::default()
            .with_overrides(lookup(&[
                ("LLM_PROVIDER", "ollama"),
                ("EMBEDDING_PROVIDER", "ollama"),
            ]))
            .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_top_k() {
        let mut config = AppConfig::default();
        config.credentials.google_api_key = Some("key".to_string());
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faqa.toml");
        std::fs::write(
            &path,
            r#"
[dataset]
path = "faq.csv"

[retrieval]
top_k = 3
"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.dataset.path, PathBuf::from("faq.csv"));
        assert_eq!(config.dataset.key_column, "Question");
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.score_threshold, 0.5);
    }

    #[test]
    fn test_credentials_debug_redacted() {
        let credentials = CredentialsConfig {
            google_api_key: Some("secret".to_string()),
            openai_api_key: None,
        };
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("secret"));
    }
}
