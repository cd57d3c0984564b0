//! # tunebridge-jobs
//!
//! Concurrent sync of source playlists into a destination playlist.
//!
//! This crate provides:
//! - Per-item resolution (extract, fall back, normalize, match, add)
//! - One job per source playlist with its own lifecycle and report
//! - Staggered concurrent fan-out with a join barrier
//! - Progress notifications via broadcast channels
//!
//! ## Example
//!
//! ```ignore
//! use tunebridge_jobs::{ItemProcessor, SyncConfig, SyncOrchestrator};
//!
//! let processor = ItemProcessor::new(extractor, normalizer, matcher, store);
//! let orchestrator = SyncOrchestrator::new(source, provisioner, processor, SyncConfig::default());
//!
//! let mut events = orchestrator.events();
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         println!("Event: {:?}", event);
//!     }
//! });
//!
//! let reports = orchestrator.run(&playlist_ids).await;
//! ```

pub mod events;
pub mod orchestrator;
pub mod processor;

// Re-export core types
pub use tunebridge_core::*;

pub use events::SyncEvent;
pub use orchestrator::{SyncConfig, SyncOrchestrator};
pub use processor::{ItemProcessor, ItemResolution};
