//! Spotify Web API client: catalog search and playlist store.
//!
//! # Example
//!
//! ```rust,no_run
//! use tunebridge_catalog::{DestinationCatalog, SpotifyClient, SpotifyConfig};
//!
//! # async fn run() -> tunebridge_catalog::Result<()> {
//! let config = SpotifyConfig {
//!     access_token: Some("BQD...".to_string()),
//!     ..Default::default()
//! };
//! let client = SpotifyClient::connect(config).await?;
//! let hits = client.search("track:Yesterday artist:Beatles", 5).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod types;

pub use auth::{required_scopes, AccessToken, Credentials};
pub use client::{SpotifyClient, SpotifyConfig};
