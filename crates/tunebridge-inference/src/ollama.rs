//! Ollama extraction backend (local model, streamed generation).

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use tunebridge_core::defaults;
use tunebridge_core::{Error, ExtractionResult, Result, SongArtistExtractor};

use crate::prompt::{extraction_prompt, parse_song_artist};
use crate::streaming::{collect_fragments, parse_ndjson_stream};

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = defaults::OLLAMA_URL;

/// Default generation model.
pub const DEFAULT_OLLAMA_MODEL: &str = defaults::OLLAMA_MODEL;

/// Configuration for the Ollama backend.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL, without the `/api/...` suffix.
    pub base_url: String,
    /// Model used for generation.
    pub model: String,
    /// Availability probe timeout in seconds.
    pub probe_timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            probe_timeout_secs: defaults::OLLAMA_PROBE_TIMEOUT_SECS,
        }
    }
}

/// Request payload for the Ollama `/api/generate` endpoint.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

/// Ollama extraction backend.
pub struct OllamaExtractor {
    client: Client,
    config: OllamaConfig,
}

impl OllamaExtractor {
    /// Create a new Ollama backend.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing Ollama backend: url={}, model={}",
            config.base_url, config.model
        );

        Ok(Self { client, config })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }
}

#[async_trait]
impl SongArtistExtractor for OllamaExtractor {
    #[instrument(skip(self, title), fields(subsystem = "inference", component = "ollama", op = "extract", model = %self.config.model))]
    async fn extract_song_artist(&self, title: &str) -> Result<ExtractionResult> {
        let start = Instant::now();
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: extraction_prompt(title),
        };

        let response = self
            .client
            .post(self.url("/api/generate"))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Extraction(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Extraction(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let text = collect_fragments(parse_ndjson_stream(response.bytes_stream())).await?;
        let text = text.trim();

        debug!(
            response_len = text.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Ollama generation complete"
        );

        Ok(parse_song_artist(text))
    }

    async fn is_available(&self) -> bool {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .timeout(Duration::from_secs(self.config.probe_timeout_secs))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status() == reqwest::StatusCode::OK => {
                info!("Ollama availability probe passed");
                true
            }
            Ok(resp) => {
                warn!("Ollama availability probe failed: {}", resp.status());
                false
            }
            Err(e) => {
                warn!("Ollama availability probe error: {}", e);
                false
            }
        }
    }

    fn backend_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OllamaConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.probe_timeout_secs, 2);
    }

    #[test]
    fn test_generate_request_wire_format() {
        let request = GenerateRequest {
            model: "llama3.2".to_string(),
            prompt: "hi".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"model": "llama3.2", "prompt": "hi"}));
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let backend = OllamaExtractor::new(OllamaConfig {
            base_url: "http://host:11434/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(backend.url("/api/tags"), "http://host:11434/api/tags");
    }

    #[test]
    fn test_names() {
        let backend = OllamaExtractor::new(OllamaConfig::default()).unwrap();
        assert_eq!(backend.backend_name(), "ollama");
        assert_eq!(backend.model_name(), "llama3.2");
    }
}
