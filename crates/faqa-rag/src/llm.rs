//! LLM Client implementations
//!
//! Completion clients for OpenAI, Ollama and Google Gemini. Each call is a
//! single blocking request; any failure becomes
//! `FaqError::CompletionService` and is returned to the caller as-is.

use async_trait::async_trait;
use faqa_core::{CredentialsConfig, FaqError, LlmClient, LlmConfig, Provider, Result};
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

async fn error_body(response: reqwest::Response, provider: &str) -> FaqError {
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    FaqError::CompletionService(format!("{provider} error ({status}): {error_text}"))
}

// ============================================================================
// OpenAI Client
// ============================================================================

/// OpenAI chat completions client
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a new OpenAI client
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            model: model.into(),
            max_tokens,
        }
    }

    /// Create from config
    pub fn from_config(config: &LlmConfig, credentials: &CredentialsConfig) -> Result<Self> {
        let api_key = credentials
            .api_key_for(Provider::OpenAI)
            .ok_or_else(|| FaqError::Configuration("OPENAI_API_KEY required".to_string()))?;

        Ok(Self {
            client: http_client(config.timeout_secs)?,
            api_key: api_key.to_string(),
            base_url: config
                .openai_base_url
                .clone()
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            model: config.model_name().to_string(),
            max_tokens: config.max_tokens,
        })
    }

    /// Set custom base URL (for compatible APIs)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String> {
        let request = OpenAiRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| FaqError::CompletionService(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(error_body(response, "OpenAI").await);
        }

        let result: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| FaqError::CompletionService(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| FaqError::CompletionService("No response generated".to_string()))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// ============================================================================
// Ollama Client
// ============================================================================

/// Ollama generate API client
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    /// Create from config
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let mut client = Self::new(config.ollama_url.clone(), config.model_name());
        client.client = http_client(config.timeout_secs)?;
        Ok(client)
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String> {
        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions { temperature },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| FaqError::CompletionService(format!("Ollama request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(error_body(response, "Ollama").await);
        }

        let result: OllamaResponse = response.json().await.map_err(|e| {
            FaqError::CompletionService(format!("Failed to parse Ollama response: {e}"))
        })?;

        Ok(result.response)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

// ============================================================================
// Gemini Client
// ============================================================================

/// Google Gemini generateContent client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: [GeminiContent<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: [GeminiPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiResponse {
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: GEMINI_BASE_URL.to_string(),
            model: model.into(),
            max_tokens,
        }
    }

    /// Create from config
    pub fn from_config(config: &LlmConfig, credentials: &CredentialsConfig) -> Result<Self> {
        let api_key = credentials
            .api_key_for(Provider::Gemini)
            .ok_or_else(|| FaqError::Configuration("GOOGLE_API_KEY required".to_string()))?;

        let mut client = Self::new(api_key, config.model_name(), config.max_tokens);
        client.client = http_client(config.timeout_secs)?;
        Ok(client)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String> {
        let request = GeminiRequest {
            contents: [GeminiContent {
                role: "user",
                parts: [GeminiPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| FaqError::CompletionService(format!("Gemini request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(error_body(response, "Gemini").await);
        }

        let result: GeminiResponse = response.json().await.map_err(|e| {
            FaqError::CompletionService(format!("Failed to parse Gemini response: {e}"))
        })?;

        result.into_text().ok_or_else(|| {
            FaqError::CompletionService("Gemini returned no candidates".to_string())
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// ============================================================================
// Factory function
// ============================================================================

/// Create an LLM client from config
pub fn create_llm_client(
    config: &LlmConfig,
    credentials: &CredentialsConfig,
) -> Result<Box<dyn LlmClient>> {
    tracing::debug!(provider = %config.provider, model = config.model_name(), "creating LLM client");
    match config.provider {
        Provider::OpenAI => Ok(Box::new(OpenAiClient::from_config(config, credentials)?)),
        Provider::Ollama => Ok(Box::new(OllamaClient::from_config(config)?)),
        Provider::Gemini => Ok(Box::new(GeminiClient::from_config(config, credentials)?)),
    }
}

// ============================================================================
// Tests
// ============================================================================
