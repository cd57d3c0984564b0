//! Spotify Web API request/response types.

use serde::{Deserialize, Serialize};

// =============================================================================
// AUTH
// =============================================================================

/// Accounts service token response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Space-separated granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// `GET /me` profile.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

// =============================================================================
// SEARCH
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<TrackPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackPage {
    #[serde(default)]
    pub items: Vec<TrackObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistObject {
    pub name: String,
}

// =============================================================================
// PLAYLISTS
// =============================================================================

/// One page of `GET /me/playlists`. `next` is an absolute URL or null.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistPage {
    /// Entries can be null for playlists the user can no longer access.
    #[serde(default)]
    pub items: Vec<Option<PlaylistObject>>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistObject {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}
