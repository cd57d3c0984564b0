//! Mistral extraction backend (hosted model, single-shot chat completion).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument};

use tunebridge_core::defaults;
use tunebridge_core::{Error, ExtractionResult, Result, SongArtistExtractor};

use crate::prompt::{extraction_prompt, parse_song_artist};

/// Configuration for the Mistral backend.
#[derive(Debug, Clone)]
pub struct MistralConfig {
    /// Base URL including the `/v1` prefix.
    pub base_url: String,
    /// API key, sent as a bearer token.
    pub api_key: Option<String>,
    /// Chat model.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
}

impl Default for MistralConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::MISTRAL_URL.to_string(),
            api_key: None,
            model: defaults::MISTRAL_MODEL.to_string(),
            temperature: defaults::MISTRAL_TEMPERATURE,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Error body. Mistral answers either `{"message": ..}` or the
/// OpenAI-style `{"error": {"message": ..}}`.
#[derive(Debug, Default, Deserialize)]
struct MistralErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<MistralErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct MistralErrorDetail {
    message: String,
}

impl MistralErrorResponse {
    fn into_message(self) -> String {
        self.error
            .map(|e| e.message)
            .or(self.message)
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

/// Classification of a non-success status from the chat endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MistralErrorCode {
    /// Invalid or revoked API key.
    AuthenticationError,
    /// Rate limit exceeded.
    RateLimitExceeded,
    /// Model not found or not available.
    ModelNotFound,
    /// Server error.
    ServerError,
    /// Anything else.
    Unknown,
}

impl MistralErrorCode {
    /// Determine the error code from an HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::AuthenticationError,
            429 => Self::RateLimitExceeded,
            404 => Self::ModelNotFound,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Convert into an extraction error. Every variant is item-scoped: the
    /// item falls back to its raw title.
    pub fn into_error(self, message: &str) -> Error {
        let prefix = match self {
            Self::AuthenticationError => "Authentication failed",
            Self::RateLimitExceeded => "Rate limit exceeded",
            Self::ModelNotFound => "Model not found",
            Self::ServerError => "Server error",
            Self::Unknown => "Mistral request failed",
        };
        Error::Extraction(format!("{}: {}", prefix, message))
    }
}

/// Mistral extraction backend.
pub struct MistralExtractor {
    client: Client,
    config: MistralConfig,
    api_key: String,
}

impl MistralExtractor {
    /// Create a new Mistral backend. A missing or blank API key is fatal.
    pub fn new(config: MistralConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("MISTRAL_API_KEY is not set".to_string()))?
            .to_string();

        let client = Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing Mistral backend: url={}, model={}",
            config.base_url, config.model
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &MistralConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }
}

#[async_trait]
impl SongArtistExtractor for MistralExtractor {
    #[instrument(skip(self, title), fields(subsystem = "inference", component = "mistral", op = "extract", model = %self.config.model))]
    async fn extract_song_artist(&self, title: &str) -> Result<ExtractionResult> {
        let start = Instant::now();
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: extraction_prompt(title),
            }],
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(self.url("/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Extraction(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body: MistralErrorResponse = response.json().await.unwrap_or_default();
            return Err(MistralErrorCode::from_status(status).into_error(&body.into_message()));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Extraction(format!("Failed to parse response: {}", e)))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Extraction("no response from Mistral".to_string()))?;

        debug!(
            response_len = content.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Mistral completion received"
        );

        Ok(parse_song_artist(&content))
    }

    fn backend_name(&self) -> &str {
        "mistral"
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
