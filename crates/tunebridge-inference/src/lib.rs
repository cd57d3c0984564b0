//! # tunebridge-inference
//!
//! AI-assisted song/artist extraction for tunebridge.
//!
//! This crate provides:
//! - The shared prompt template and response parser
//! - Ollama backend (local model, streamed NDJSON generation)
//! - Mistral backend (hosted model, single-shot chat completion)
//! - Startup selection of the extraction variant from configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use tunebridge_inference::{ExtractionConfig, ExtractionService};
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = ExtractionService::from_config(&ExtractionConfig::default()).unwrap();
//!     if let Some(extractor) = service.into_extractor().await {
//!         let result = extractor
//!             .extract_song_artist("The Weeknd - Blinding Lights (Official Video)")
//!             .await
//!             .unwrap();
//!         println!("{} by {}", result.song, result.artist);
//!     }
//! }
//! ```

pub mod mistral;
pub mod ollama;
pub mod prompt;
pub mod service;
pub mod streaming;

// Re-export core types
pub use tunebridge_core::*;

pub use mistral::{MistralConfig, MistralExtractor};
pub use ollama::{OllamaConfig, OllamaExtractor};
pub use prompt::{extraction_prompt, parse_song_artist};
pub use service::{ExtractionConfig, ExtractionService, ExtractorKind};
pub use streaming::{collect_fragments, parse_ndjson_stream, FragmentStream};
