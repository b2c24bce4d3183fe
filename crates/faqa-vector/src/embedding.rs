//! Embedding clients for generating vector representations
//!
//! Supports OpenAI, Ollama and Google Gemini embedding APIs. Each call embeds
//! one text; failures surface as `FaqError::EmbeddingService` and are never
//! retried.

use async_trait::async_trait;
use faqa_core::{CredentialsConfig, EmbeddingClient, EmbeddingConfig, FaqError, Provider, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

fn http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| FaqError::Configuration(format!("Failed to build HTTP client: {e}")))
}

fn non_empty(vector: Vec<f32>, provider: &str) -> Result<Vec<f32>> {
    if vector.is_empty() {
        return Err(FaqError::EmbeddingService(format!(
            "{provider} returned an empty embedding"
        )));
    }
    Ok(vector)
}

// ============================================================================
// OpenAI Embedding Client
// ============================================================================

/// OpenAI embedding API client
pub struct OpenAiEmbedding {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct OpenAiEmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbedding {
    /// Create a new OpenAI embedding client
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            model: model.into(),
        }
    }

    /// Create from config
    pub fn from_config(config: &EmbeddingConfig, credentials: &CredentialsConfig) -> Result<Self> {
        let api_key = credentials
            .api_key_for(Provider::OpenAI)
            .ok_or_else(|| FaqError::Configuration("OPENAI_API_KEY required".to_string()))?;

        let mut client = Self::new(api_key, config.model_name());
        client.client = http_client(config.timeout_secs)?;
        if let Some(url) = &config.openai_base_url {
            client = client.with_base_url(url.clone());
        }
        Ok(client)
    }

    /// Set custom base URL (for compatible APIs)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = OpenAiEmbeddingRequest {
            input: text,
            model: &self.model,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| FaqError::EmbeddingService(format!("Embedding request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(FaqError::EmbeddingService(format!(
                "OpenAI embedding error ({status}): {error_text}"
            )));
        }

        let result: OpenAiEmbeddingResponse = response.json().await.map_err(|e| {
            FaqError::EmbeddingService(format!("Failed to parse embedding response: {e}"))
        })?;

        let embedding = result
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| FaqError::EmbeddingService("No embedding returned".to_string()))?;

        non_empty(embedding, "OpenAI")
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Ollama Embedding Client
// ============================================================================

/// Ollama embedding API client
pub struct OllamaEmbedding {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbedding {
    /// Create a new Ollama embedding client
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    /// Create from config
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let mut client = Self::new(config.ollama_url.clone(), config.model_name());
        client.client = http_client(config.timeout_secs)?;
        Ok(client)
    }
}

#[async_trait]
impl EmbeddingClient for OllamaEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = OllamaEmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                FaqError::EmbeddingService(format!("Ollama embedding request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(FaqError::EmbeddingService(format!(
                "Ollama embedding error ({status}): {error_text}"
            )));
        }

        let result: OllamaEmbeddingResponse = response.json().await.map_err(|e| {
            FaqError::EmbeddingService(format!("Failed to parse embedding response: {e}"))
        })?;

        non_empty(result.embedding, "Ollama")
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Gemini Embedding Client
// ============================================================================

/// Google Generative Language embedding client
pub struct GeminiEmbedding {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GeminiEmbedRequest<'a> {
    model: String,
    content: GeminiContent<'a>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: [GeminiPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiEmbedResponse {
    embedding: GeminiEmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct GeminiEmbeddingValues {
    values: Vec<f32>,
}

impl GeminiEmbedding {
    /// Create a new Gemini embedding client
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: GEMINI_BASE_URL.to_string(),
            model: model.into(),
        }
    }

    /// Create from config
    pub fn from_config(config: &EmbeddingConfig, credentials: &CredentialsConfig) -> Result<Self> {
        let api_key = credentials
            .api_key_for(Provider::Gemini)
            .ok_or_else(|| FaqError::Configuration("GOOGLE_API_KEY required".to_string()))?;

        let mut client = Self::new(api_key, config.model_name());
        client.client = http_client(config.timeout_secs)?;
        Ok(client)
    }
}

#[async_trait]
impl EmbeddingClient for GeminiEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = GeminiEmbedRequest {
            model: format!("models/{}", self.model),
            content: GeminiContent {
                parts: [GeminiPart { text }],
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:embedContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                FaqError::EmbeddingService(format!("Gemini embedding request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(FaqError::EmbeddingService(format!(
                "Gemini embedding error ({status}): {error_text}"
            )));
        }

        let result: GeminiEmbedResponse = response.json().await.map_err(|e| {
            FaqError::EmbeddingService(format!("Failed to parse embedding response: {e}"))
        })?;

        non_empty(result.embedding.values, "Gemini")
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Factory function
// ============================================================================

/// Create an embedding client from config
pub fn create_embedding_client(
    config: &EmbeddingConfig,
    credentials: &CredentialsConfig,
) -> Result<Box<dyn EmbeddingClient>> {
    tracing::debug!(provider = %config.provider, model = config.model_name(), "creating embedding client");
    match config.provider {
        Provider::OpenAI => Ok(Box::new(OpenAiEmbedding::from_config(config, credentials)?)),
        Provider::Ollama => Ok(Box::new(OllamaEmbedding::from_config(config)?)),
        Provider::Gemini => Ok(Box::new(GeminiEmbedding::from_config(config, credentials)?)),
    }
}

// ============================================================================
// Tests
// ============================================================================
