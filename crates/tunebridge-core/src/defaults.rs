//! Centralized default constants for tunebridge.
//!
//! All crates and the CLI reference these constants instead of defining
//! their own magic numbers. Organized by domain area.

// =============================================================================
// NORMALIZATION
// =============================================================================

/// Noise tokens stripped from track and artist strings before matching.
pub const NOISE_TOKENS: &[&str] = &[
    "official video",
    "remastered",
    "4k",
    "live",
    "audio",
    "topic",
    "vevo",
    "remix",
];

// =============================================================================
// MATCHING
// =============================================================================

/// Candidates requested from the catalog per matcher tier.
pub const SEARCH_LIMIT: usize = 5;

// =============================================================================
// EXTRACTION
// =============================================================================

/// Prompt sent to every extraction backend. `{title}` is replaced verbatim.
pub const EXTRACTION_PROMPT: &str = "Extract the song title and artist from this YouTube video title: '{title}'. Return it in the format: Song: <song_name>, Artist: <artist_name>.";

/// Default local model endpoint (Ollama).
pub const OLLAMA_URL: &str = "http://localhost:11434";

/// Default local generation model.
pub const OLLAMA_MODEL: &str = "llama3.2";

/// Availability probe timeout for the local model (seconds).
pub const OLLAMA_PROBE_TIMEOUT_SECS: u64 = 2;

/// Default hosted chat-completion endpoint (Mistral).
pub const MISTRAL_URL: &str = "https://api.mistral.ai/v1";

/// Default hosted generation model.
pub const MISTRAL_MODEL: &str = "mistral-large-latest";

/// Sampling temperature for hosted chat completions.
pub const MISTRAL_TEMPERATURE: f64 = 0.7;

// =============================================================================
// SOURCES
// =============================================================================

/// Default YouTube Data API base URL.
pub const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Page size requested from the YouTube playlist items endpoint.
pub const YOUTUBE_PAGE_SIZE: u32 = 50;

/// Default directory scanned for free-text song files.
pub const SONGS_DIR: &str = "inputFiles";

/// File name prefix marking a free-text song file.
pub const SONGS_FILE_PREFIX: &str = "songs";

// =============================================================================
// DESTINATION
// =============================================================================

/// Default Spotify Web API base URL.
pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

/// Default Spotify accounts service base URL.
pub const SPOTIFY_ACCOUNTS_URL: &str = "https://accounts.spotify.com";

/// Page size used when listing the user's playlists.
pub const PLAYLIST_PAGE_SIZE: u32 = 50;

/// Destination playlist name when none is configured.
pub const PLAYLIST_NAME: &str = "Playlist";

/// Description attached to newly created destination playlists.
pub const PLAYLIST_DESCRIPTION: &str = "Playlist imported";

// =============================================================================
// ORCHESTRATION
// =============================================================================

/// Delay between consecutive job launches (milliseconds).
pub const SYNC_STAGGER_MS: u64 = 500;

/// Capacity of the sync event broadcast channel.
pub const EVENT_BUS_CAPACITY: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_has_single_placeholder() {
        assert_eq!(EXTRACTION_PROMPT.matches("{title}").count(), 1);
    }

    #[test]
    fn test_noise_tokens_are_lowercase() {
        for token in NOISE_TOKENS {
            assert_eq!(*token, token.to_lowercase());
        }
    }
}
