//! Core traits for tunebridge collaborators.
//!
//! These traits define the interfaces that concrete sources, catalogs and
//! extraction backends must satisfy, enabling pluggable transports and
//! in-memory fakes in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// SOURCE TRAITS
// =============================================================================

/// Producer of source items for one source playlist.
#[async_trait]
pub trait SourcePlaylistProvider: Send + Sync {
    /// Fetch every item of a playlist, in playlist order.
    ///
    /// Implementations drain their own pagination. Failures are `Error::Fetch`.
    async fn fetch_items(&self, playlist_id: &str) -> Result<Vec<SourceItem>>;
}

// =============================================================================
// DESTINATION TRAITS
// =============================================================================

/// Track search against the destination catalog.
#[async_trait]
pub trait DestinationCatalog: Send + Sync {
    /// Run a structured query filter (`track:<name> artist:<name>`) and return
    /// at most `limit` candidates in the catalog's native relevance order.
    ///
    /// Failures are `Error::Search`.
    async fn search(&self, query_filter: &str, limit: usize) -> Result<Vec<CatalogTrack>>;
}

/// Playlists owned by the authenticated identity.
#[async_trait]
pub trait DestinationPlaylistStore: Send + Sync {
    /// List every playlist, all pages collected, in store order.
    async fn list(&self) -> Result<Vec<PlaylistRef>>;

    /// Create a playlist with the given create-time policy.
    async fn create(&self, name: &str, options: &PlaylistOptions) -> Result<PlaylistRef>;

    /// Append track URIs to a playlist.
    ///
    /// Returns `Error::Add` when the store does not report the tracks as
    /// created/accepted.
    async fn add_tracks(&self, playlist_id: &str, track_uris: &[String]) -> Result<()>;

    /// Catalog URI for a track id (e.g. `spotify:track:<id>`).
    fn track_uri(&self, track_id: &str) -> String {
        track_id.to_string()
    }
}

// =============================================================================
// EXTRACTION TRAITS
// =============================================================================

/// AI-assisted song/artist extraction from a free-form title.
#[async_trait]
pub trait SongArtistExtractor: Send + Sync {
    /// Extract `(song, artist)` from a title.
    ///
    /// An `Ok` result with empty fields means the backend answered but the
    /// response could not be parsed; callers fall back to raw metadata just as
    /// they do for `Err(Error::Extraction)`.
    async fn extract_song_artist(&self, title: &str) -> Result<ExtractionResult>;

    /// Check whether the backend is reachable. Defaults to `true`.
    async fn is_available(&self) -> bool {
        true
    }

    /// Backend name for logging.
    fn backend_name(&self) -> &str;

    /// Model name used for generation.
    fn model_name(&self) -> &str;
}
