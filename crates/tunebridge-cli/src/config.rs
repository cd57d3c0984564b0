//! Process configuration, read once from the environment.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `YOUTUBE_API_KEY` | (none) | Required in playlist mode |
//! | `YOUTUBE_API_URL` | `https://www.googleapis.com/youtube/v3` | YouTube Data API base |
//! | `PLAYLISTS` | `[]` | JSON array of source playlist ids |
//! | `PLAYLIST_NAME_TO_SAVE` | `Playlist` | Destination playlist name |
//! | `PLAYLIST_VISIBILITY` | `public` | `public` or `private` for created playlists |
//! | `PLAYLIST_DESCRIPTION` | `Playlist imported` | Description for created playlists |
//! | `SPOTIFY_ACCESS_TOKEN` | (none) | Pre-issued bearer token |
//! | `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET` / `SPOTIFY_REFRESH_TOKEN` | (none) | Refresh-token grant |
//! | `SPOTIFY_READ_PRIVATE` | `true` | Require `playlist-read-private` |
//! | `SPOTIFY_API_URL` / `SPOTIFY_ACCOUNTS_URL` | Spotify endpoints | API bases |
//! | `MODEL_TO_USE` | (none) | `ollama`, `mistral` or empty |
//! | `OLLAMA_BASE` / `OLLAMA_GEN_MODEL` | `http://localhost:11434` / `llama3.2` | Local model |
//! | `MISTRAL_API_KEY` | (none) | Required when `MODEL_TO_USE=mistral` |
//! | `MISTRAL_BASE_URL` / `MISTRAL_MODEL` | `https://api.mistral.ai/v1` / `mistral-large-latest` | Hosted model |
//! | `SYNC_STAGGER_MS` | `500` | Delay between job launches |
//! | `NOISE_TOKENS` | built-in set | Comma-separated normalizer tokens |
//! | `NOISE_WORD_BOUNDARY` | `false` | Only strip tokens that stand as whole words |
//! | `SEARCH_LIMIT` | `5` | Catalog candidates requested per matcher tier |
//! | `SONGS_DIR` | `inputFiles` | Free-text song files directory |

use std::path::PathBuf;
use std::time::Duration;

use tunebridge_catalog::{SpotifyConfig, YouTubeConfig};
use tunebridge_core::defaults;
use tunebridge_core::{Error, NormalizerConfig, PlaylistOptions, PlaylistVisibility, Result};
use tunebridge_inference::{ExtractionConfig, ExtractorKind, MistralConfig, OllamaConfig};
use tunebridge_jobs::SyncConfig;

/// Everything the CLI needs, built once and handed to each component.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub youtube_api_key: Option<String>,
    pub youtube_api_url: String,
    pub playlists: Vec<String>,
    pub destination_name: String,
    pub playlist_options: PlaylistOptions,
    pub spotify: SpotifyConfig,
    pub extraction: ExtractionConfig,
    pub stagger: Duration,
    pub search_limit: usize,
    pub normalizer: NormalizerConfig,
    pub songs_dir: PathBuf,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `get`. Blank values count as unset.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let playlists = match var("PLAYLISTS") {
            Some(raw) => serde_json::from_str::<Vec<String>>(&raw).map_err(|e| {
                Error::Config(format!("PLAYLISTS must be a JSON array of strings: {}", e))
            })?,
            None => Vec::new(),
        };

        let visibility = match var("PLAYLIST_VISIBILITY") {
            Some(raw) => raw.parse::<PlaylistVisibility>().map_err(Error::Config)?,
            None => PlaylistVisibility::default(),
        };
        let playlist_options = PlaylistOptions {
            description: or("PLAYLIST_DESCRIPTION", defaults::PLAYLIST_DESCRIPTION),
            visibility,
        };

        let read_private = match var("SPOTIFY_READ_PRIVATE") {
            Some(raw) => parse_bool("SPOTIFY_READ_PRIVATE", &raw)?,
            None => true,
        };

        let spotify = SpotifyConfig {
            api_url: or("SPOTIFY_API_URL", defaults::SPOTIFY_API_URL),
            accounts_url: or("SPOTIFY_ACCOUNTS_URL", defaults::SPOTIFY_ACCOUNTS_URL),
            access_token: var("SPOTIFY_ACCESS_TOKEN"),
            client_id: var("SPOTIFY_CLIENT_ID"),
            client_secret: var("SPOTIFY_CLIENT_SECRET"),
            refresh_token: var("SPOTIFY_REFRESH_TOKEN"),
            visibility,
            read_private,
            page_size: defaults::PLAYLIST_PAGE_SIZE,
        };

        let kind: ExtractorKind = var("MODEL_TO_USE").unwrap_or_default().parse()?;
        let extraction = ExtractionConfig {
            kind,
            ollama: OllamaConfig {
                base_url: or("OLLAMA_BASE", defaults::OLLAMA_URL),
                model: or("OLLAMA_GEN_MODEL", defaults::OLLAMA_MODEL),
                probe_timeout_secs: defaults::OLLAMA_PROBE_TIMEOUT_SECS,
            },
            mistral: MistralConfig {
                base_url: or("MISTRAL_BASE_URL", defaults::MISTRAL_URL),
                api_key: var("MISTRAL_API_KEY"),
                model: or("MISTRAL_MODEL", defaults::MISTRAL_MODEL),
                temperature: defaults::MISTRAL_TEMPERATURE,
            },
        };

        let stagger_ms = match var("SYNC_STAGGER_MS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                Error::Config(format!("SYNC_STAGGER_MS must be milliseconds, got '{}'", raw))
            })?,
            None => defaults::SYNC_STAGGER_MS,
        };

        let search_limit = match var("SEARCH_LIMIT") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    return Err(Error::Config(format!(
                        "SEARCH_LIMIT must be a positive integer, got '{}'",
                        raw
                    )))
                }
            },
            None => defaults::SEARCH_LIMIT,
        };

        let mut normalizer = var("NOISE_TOKENS")
            .map(|csv| NormalizerConfig::from_csv(&csv))
            .unwrap_or_default();
        if let Some(raw) = var("NOISE_WORD_BOUNDARY") {
            normalizer.word_boundary = parse_bool("NOISE_WORD_BOUNDARY", &raw)?;
        }

        Ok(Self {
            youtube_api_key: var("YOUTUBE_API_KEY"),
            youtube_api_url: or("YOUTUBE_API_URL", defaults::YOUTUBE_API_URL),
            playlists,
            destination_name: or("PLAYLIST_NAME_TO_SAVE", defaults::PLAYLIST_NAME),
            playlist_options,
            spotify,
            extraction,
            stagger: Duration::from_millis(stagger_ms),
            search_limit,
            normalizer,
            songs_dir: PathBuf::from(or("SONGS_DIR", defaults::SONGS_DIR)),
        })
    }

    /// YouTube source settings. The API key is required.
    pub fn youtube(&self) -> Result<YouTubeConfig> {
        let api_key = self
            .youtube_api_key
            .clone()
            .ok_or_else(|| Error::Config("YOUTUBE_API_KEY is not set".to_string()))?;
        Ok(YouTubeConfig {
            base_url: self.youtube_api_url.clone(),
            ..YouTubeConfig::new(api_key)
        })
    }

    pub fn sync(&self) -> SyncConfig {
        SyncConfig::default()
            .with_stagger(self.stagger)
            .with_destination_name(&self.destination_name)
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(Error::Config(format!("{} must be true or false, got '{}'", key, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert!(config.playlists.is_empty());
        assert_eq!(config.destination_name, "Playlist");
        assert_eq!(config.playlist_options.description, "Playlist imported");
        assert_eq!(config.playlist_options.visibility, PlaylistVisibility::Public);
        assert!(config.spotify.read_private);
        assert_eq!(config.extraction.kind, ExtractorKind::None);
        assert_eq!(config.stagger, Duration::from_millis(500));
        assert_eq!(config.songs_dir, PathBuf::from("inputFiles"));
        assert_eq!(config.normalizer, NormalizerConfig::default());
    }

    #[test]
    fn test_playlists_json_array() {
        let config = config(&[("PLAYLISTS", r#"["PL1", "PL2"]"#)]).unwrap();
        assert_eq!(config.playlists, vec!["PL1", "PL2"]);
    }

    #[test]
    fn test_playlists_invalid_json_is_config_error() {
        let err = config(&[("PLAYLISTS", "PL1,PL2")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_private_visibility_flows_to_spotify() {
        let config = config(&[
            ("PLAYLIST_VISIBILITY", "private"),
            ("SPOTIFY_READ_PRIVATE", "false"),
        ])
        .unwrap();
        assert_eq!(config.playlist_options.visibility, PlaylistVisibility::Private);
        assert_eq!(config.spotify.visibility, PlaylistVisibility::Private);
        assert!(!config.spotify.read_private);
    }

    #[test]
    fn test_invalid_visibility() {
        let err = config(&[("PLAYLIST_VISIBILITY", "friends")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_model_selection() {
        let config = config(&[
            ("MODEL_TO_USE", "mistral"),
            ("MISTRAL_API_KEY", "secret"),
            ("OLLAMA_GEN_MODEL", "qwen2"),
        ])
        .unwrap();
        assert_eq!(config.extraction.kind, ExtractorKind::Mistral);
        assert_eq!(config.extraction.mistral.api_key.as_deref(), Some("secret"));
        assert_eq!(config.extraction.ollama.model, "qwen2");
    }

    #[test]
    fn test_unknown_model_is_config_error() {
        let err = config(&[("MODEL_TO_USE", "gpt")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = config(&[("MISTRAL_API_KEY", "   "), ("PLAYLIST_NAME_TO_SAVE", "")]).unwrap();
        assert!(config.extraction.mistral.api_key.is_none());
        assert_eq!(config.destination_name, "Playlist");
    }

    #[test]
    fn test_stagger_and_tokens() {
        let config = config(&[("SYNC_STAGGER_MS", "0"), ("NOISE_TOKENS", "lyrics, hd")]).unwrap();
        assert!(config.stagger.is_zero());
        assert_eq!(config.normalizer.noise_tokens, vec!["lyrics", "hd"]);
        assert!(config.sync().stagger.is_zero());
    }

    #[test]
    fn test_search_limit_and_word_boundary() {
        let defaults = config(&[]).unwrap();
        assert_eq!(defaults.search_limit, 5);
        assert!(!defaults.normalizer.word_boundary);

        let config = config(&[("SEARCH_LIMIT", "10"), ("NOISE_WORD_BOUNDARY", "true")]).unwrap();
        assert_eq!(config.search_limit, 10);
        assert!(config.normalizer.word_boundary);
    }

    #[test]
    fn test_invalid_search_limit() {
        for raw in ["0", "-1", "many"] {
            let err = config(&[("SEARCH_LIMIT", raw)]).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "accepted {:?}", raw);
        }
    }

    #[test]
    fn test_invalid_stagger() {
        let err = config(&[("SYNC_STAGGER_MS", "soon")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_youtube_requires_key() {
        let missing = config(&[]).unwrap();
        assert!(matches!(missing.youtube(), Err(Error::Config(_))));

        let present = config(&[
            ("YOUTUBE_API_KEY", "yt"),
            ("YOUTUBE_API_URL", "http://localhost:9000"),
        ])
        .unwrap();
        let youtube = present.youtube().unwrap();
        assert_eq!(youtube.api_key, "yt");
        assert_eq!(youtube.base_url, "http://localhost:9000");
        assert_eq!(youtube.page_size, 50);
    }
}
