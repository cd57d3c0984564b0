//! # tunebridge-catalog
//!
//! Destination-catalog side of the tunebridge pipeline, plus the sources
//! that feed it.
//!
//! This crate provides:
//! - [`TrackMatcher`]: two-tier containment matching over catalog search
//! - [`PlaylistProvisioner`]: get-or-create of the destination playlist
//! - [`SpotifyClient`]: catalog search and playlist store over the Spotify Web API
//! - [`YouTubePlaylistSource`]: video playlist items over the YouTube Data API
//! - [`SongListSource`]: free-text song files on disk

pub mod matcher;
pub mod provisioner;
pub mod song_list;
pub mod spotify;
pub mod youtube;

// Re-export core types
pub use tunebridge_core::*;

pub use matcher::TrackMatcher;
pub use provisioner::PlaylistProvisioner;
pub use song_list::SongListSource;
pub use spotify::{SpotifyClient, SpotifyConfig};
pub use youtube::{YouTubeConfig, YouTubePlaylistSource};
