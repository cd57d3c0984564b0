//! # tunebridge-core
//!
//! Core types, traits, and abstractions for the tunebridge track resolution
//! pipeline.
//!
//! This crate provides the data model shared by every stage (source items,
//! extraction results, catalog candidates, playlist references, sync jobs),
//! the error taxonomy, the collaborator traits that concrete sources,
//! catalogs and extraction backends implement, and the text normalizer.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, ErrorScope, Result};
pub use models::*;
pub use normalize::{Normalizer, NormalizerConfig};
pub use traits::*;
