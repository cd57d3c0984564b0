//! Video playlist source over the YouTube Data API v3.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info, instrument};

use tunebridge_core::defaults;
use tunebridge_core::{Error, Result, SourceItem, SourcePlaylistProvider};

/// Configuration for the YouTube source.
#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    pub api_key: String,
    /// API base URL including `/youtube/v3`.
    pub base_url: String,
    /// Items requested per page (the API caps this at 50).
    pub page_size: u32,
}

impl YouTubeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: defaults::YOUTUBE_API_URL.to_string(),
            page_size: defaults::YOUTUBE_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemListResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    #[serde(default)]
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    /// Absent for deleted or private videos.
    #[serde(default)]
    video_owner_channel_title: Option<String>,
}

/// Reads every item of a video playlist, following page tokens.
pub struct YouTubePlaylistSource {
    http: Client,
    config: YouTubeConfig,
}

impl YouTubePlaylistSource {
    /// Create a new source. An empty API key is a `Config` error.
    pub fn new(config: YouTubeConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Config("YOUTUBE_API_KEY is not set".to_string()));
        }
        let http = Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    async fn fetch_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemListResponse> {
        let url = format!("{}/playlistItems", self.config.base_url.trim_end_matches('/'));
        let max_results = self.config.page_size.to_string();
        let mut query = vec![
            ("part", "snippet"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
            ("key", self.config.api_key.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self
            .http
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Fetch(format!(
                "YouTube returned {} for playlist {}: {}",
                status, playlist_id, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Fetch(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl SourcePlaylistProvider for YouTubePlaylistSource {
    #[instrument(skip(self), fields(subsystem = "source", component = "youtube", op = "fetch_items"))]
    async fn fetch_items(&self, playlist_id: &str) -> Result<Vec<SourceItem>> {
        let start = Instant::now();
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(playlist_id, page_token.as_deref()).await?;
            items.extend(page.items.into_iter().filter_map(|item| {
                item.snippet.map(|s| {
                    SourceItem::new(s.title, s.video_owner_channel_title.unwrap_or_default())
                })
            }));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => {
                    debug!(item_count = items.len(), "Following next page");
                    page_token = Some(token);
                }
                None => break,
            }
        }

        info!(
            item_count = items.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetched source playlist"
        );
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected() {
        let err = YouTubePlaylistSource::new(YouTubeConfig::new(" ")).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_defaults() {
        let config = YouTubeConfig::new("k");
        assert_eq!(config.base_url, "https://www.googleapis.com/youtube/v3");
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "kind": "youtube#playlistItemListResponse",
            "nextPageToken": "CAUQAA",
            "items": [
                {"snippet": {"title": "Eminem - Lose Yourself", "videoOwnerChannelTitle": "EminemVEVO"}},
                {"snippet": {"title": "Deleted video"}}
            ]
        }"#;
        let response: PlaylistItemListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.next_page_token.as_deref(), Some("CAUQAA"));
        assert_eq!(response.items.len(), 2);
        let second = response.items[1].snippet.as_ref().unwrap();
        assert!(second.video_owner_channel_title.is_none());
    }
}
