//! Startup selection of the extraction variant.
//!
//! The variant is chosen once from configuration: no AI, the local model, or
//! the hosted model. An unreachable local model degrades to no AI; a hosted
//! model without credentials refuses to start.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};

use tunebridge_core::{Error, Result, SongArtistExtractor};

use crate::mistral::{MistralConfig, MistralExtractor};
use crate::ollama::{OllamaConfig, OllamaExtractor};

/// Which extraction variant to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractorKind {
    /// Raw metadata only.
    #[default]
    None,
    /// Local model over the streamed generate endpoint.
    Ollama,
    /// Hosted chat-completion model.
    Mistral,
}

impl FromStr for ExtractorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "ollama" => Ok(Self::Ollama),
            "mistral" => Ok(Self::Mistral),
            other => Err(Error::Config(format!(
                "Unknown MODEL_TO_USE '{}': expected 'ollama', 'mistral' or 'none'",
                other
            ))),
        }
    }
}

/// Extraction configuration: the chosen variant plus each backend's settings.
#[derive(Debug, Clone, Default)]
pub struct ExtractionConfig {
    pub kind: ExtractorKind,
    pub ollama: OllamaConfig,
    pub mistral: MistralConfig,
}

/// The selected extraction variant.
pub enum ExtractionService {
    None,
    Local(OllamaExtractor),
    Hosted(MistralExtractor),
}

impl ExtractionService {
    /// Build the configured variant. Hosted without an API key is a
    /// `Config` error.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        match config.kind {
            ExtractorKind::None => Ok(Self::None),
            ExtractorKind::Ollama => Ok(Self::Local(OllamaExtractor::new(config.ollama.clone())?)),
            ExtractorKind::Mistral => Ok(Self::Hosted(MistralExtractor::new(
                config.mistral.clone(),
            )?)),
        }
    }

    /// Resolve to a shareable extractor, probing the local model first.
    ///
    /// Returns `None` when no AI is configured or the local model is not
    /// reachable.
    pub async fn into_extractor(self) -> Option<Arc<dyn SongArtistExtractor>> {
        match self {
            Self::None => {
                info!(subsystem = "inference", "AI extraction disabled");
                None
            }
            Self::Local(backend) => {
                if backend.is_available().await {
                    info!(
                        subsystem = "inference",
                        backend = backend.backend_name(),
                        model = backend.model_name(),
                        "Using local model for extraction"
                    );
                    Some(Arc::new(backend))
                } else {
                    warn!(
                        subsystem = "inference",
                        url = %backend.config().base_url,
                        "Local model unavailable, continuing without AI extraction"
                    );
                    None
                }
            }
            Self::Hosted(backend) => {
                info!(
                    subsystem = "inference",
                    backend = backend.backend_name(),
                    model = backend.model_name(),
                    "Using hosted model for extraction"
                );
                Some(Arc::new(backend))
            }
        }
    }
}
