//! Authenticated Spotify client implementing the destination traits.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, info, instrument};

use tunebridge_core::defaults;
use tunebridge_core::{
    CatalogTrack, DestinationCatalog, DestinationPlaylistStore, Error, PlaylistOptions,
    PlaylistRef, PlaylistVisibility, Result,
};

use super::auth::{obtain_token, required_scopes, verify_scopes, Credentials};
use super::types::{
    AddTracksRequest, CreatePlaylistRequest, PlaylistObject, PlaylistPage, SearchResponse,
    UserProfile,
};

/// Configuration for the Spotify client.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    /// Web API base URL including `/v1`.
    pub api_url: String,
    /// Accounts service base URL.
    pub accounts_url: String,
    /// Pre-issued access token. Takes precedence over the refresh grant.
    pub access_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    /// Visibility policy for created playlists; decides the modify scope.
    pub visibility: PlaylistVisibility,
    /// Require `playlist-read-private` so private playlists are listed.
    pub read_private: bool,
    /// Page size for playlist listing.
    pub page_size: u32,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::SPOTIFY_API_URL.to_string(),
            accounts_url: defaults::SPOTIFY_ACCOUNTS_URL.to_string(),
            access_token: None,
            client_id: None,
            client_secret: None,
            refresh_token: None,
            visibility: PlaylistVisibility::default(),
            read_private: true,
            page_size: defaults::PLAYLIST_PAGE_SIZE,
        }
    }
}

impl SpotifyConfig {
    /// Pick the credential source. Missing credentials are a `Config` error.
    pub fn credentials(&self) -> Result<Credentials> {
        fn non_empty(v: &Option<String>) -> Option<String> {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        }

        if let Some(token) = non_empty(&self.access_token) {
            return Ok(Credentials::AccessToken(token));
        }

        match (
            non_empty(&self.client_id),
            non_empty(&self.client_secret),
            non_empty(&self.refresh_token),
        ) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => {
                Ok(Credentials::RefreshToken {
                    client_id,
                    client_secret,
                    refresh_token,
                })
            }
            _ => Err(Error::Config(
                "Spotify credentials missing: set SPOTIFY_ACCESS_TOKEN, or SPOTIFY_CLIENT_ID, \
                 SPOTIFY_CLIENT_SECRET and SPOTIFY_REFRESH_TOKEN"
                    .to_string(),
            )),
        }
    }
}

/// Spotify Web API client bound to one authenticated user.
pub struct SpotifyClient {
    http: Client,
    config: SpotifyConfig,
    token: String,
    user_id: String,
}

impl SpotifyClient {
    /// Authenticate and resolve the current user.
    ///
    /// Obtains a token, checks the granted scopes against the configured
    /// playlist policy when the accounts service reports them, then reads
    /// `GET /me`. Failures after credential selection are `Error::Auth`.
    #[instrument(skip(config), fields(subsystem = "catalog", component = "spotify", op = "connect"))]
    pub async fn connect(config: SpotifyConfig) -> Result<Self> {
        let credentials = config.credentials()?;
        let http = Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        let token = obtain_token(&http, &config.accounts_url, &credentials).await?;
        let required = required_scopes(config.visibility, config.read_private);
        match &token.scopes {
            Some(granted) => verify_scopes(granted, &required)?,
            None => debug!(
                required = %required.join(" "),
                "Granted scopes not reported, skipping scope check"
            ),
        }

        let mut client = Self {
            http,
            config,
            token: token.token,
            user_id: String::new(),
        };

        let response = client
            .authed(client.http.get(client.url("/me")))
            .send()
            .await
            .map_err(|e| Error::Auth(format!("Profile request failed: {}", e)))?;
        let profile: UserProfile = read_json(response, Error::Auth).await?;

        info!(
            user_id = %profile.id,
            display_name = profile.display_name.as_deref().unwrap_or(""),
            "Authenticated with Spotify"
        );
        client.user_id = profile.id;
        Ok(client)
    }

    /// Id of the authenticated user.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn config(&self) -> &SpotifyConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), endpoint)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }
}

/// Decode a JSON body, mapping non-success statuses and decode failures
/// through `wrap`.
async fn read_json<T: DeserializeOwned>(response: Response, wrap: fn(String) -> Error) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(wrap(format!("Spotify returned {}: {}", status, body)));
    }
    response
        .json()
        .await
        .map_err(|e| wrap(format!("Failed to parse response: {}", e)))
}

#[async_trait]
impl DestinationCatalog for SpotifyClient {
    #[instrument(skip(self), fields(subsystem = "catalog", component = "spotify", op = "search"))]
    async fn search(&self, query_filter: &str, limit: usize) -> Result<Vec<CatalogTrack>> {
        let start = Instant::now();
        let limit = limit.to_string();
        let response = self
            .authed(self.http.get(self.url("/search")))
            .query(&[("q", query_filter), ("type", "track"), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| Error::Search(format!("Request failed: {}", e)))?;

        let body: SearchResponse = read_json(response, Error::Search).await?;
        let tracks: Vec<CatalogTrack> = body
            .tracks
            .unwrap_or_default()
            .items
            .into_iter()
            .map(|t| {
                let primary_artist = t
                    .artists
                    .into_iter()
                    .next()
                    .map(|a| a.name)
                    .unwrap_or_default();
                CatalogTrack::new(t.id, t.name, primary_artist)
            })
            .collect();

        debug!(
            result_count = tracks.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Search complete"
        );
        Ok(tracks)
    }
}

#[async_trait]
impl DestinationPlaylistStore for SpotifyClient {
    #[instrument(skip(self), fields(subsystem = "catalog", component = "spotify", op = "list_playlists"))]
    async fn list(&self) -> Result<Vec<PlaylistRef>> {
        let mut playlists = Vec::new();
        let mut pages = 0usize;
        let mut request = self
            .http
            .get(self.url("/me/playlists"))
            .query(&[("limit", self.config.page_size)]);

        loop {
            let response = self
                .authed(request)
                .send()
                .await
                .map_err(|e| Error::Provision(format!("Playlist listing failed: {}", e)))?;
            let page: PlaylistPage = read_json(response, Error::Provision).await?;
            pages += 1;

            playlists.extend(
                page.items
                    .into_iter()
                    .flatten()
                    .map(|PlaylistObject { id, name }| PlaylistRef::new(id, name)),
            );

            match page.next.filter(|n| !n.is_empty()) {
                Some(next) => request = self.http.get(next),
                None => break,
            }
        }

        debug!(pages, playlist_count = playlists.len(), "Listed playlists");
        Ok(playlists)
    }

    #[instrument(skip(self, options), fields(subsystem = "catalog", component = "spotify", op = "create_playlist"))]
    async fn create(&self, name: &str, options: &PlaylistOptions) -> Result<PlaylistRef> {
        let request = CreatePlaylistRequest {
            name: name.to_string(),
            description: options.description.clone(),
            public: options.visibility.is_public(),
        };

        let response = self
            .authed(
                self.http
                    .post(self.url(&format!("/users/{}/playlists", self.user_id))),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Provision(format!("Playlist creation failed: {}", e)))?;

        let created: PlaylistObject = read_json(response, Error::Provision).await?;
        Ok(PlaylistRef::new(created.id, created.name))
    }

    /// Only `201 Created` or `202 Accepted` count as success; any other
    /// status, including a bare `200`, is `Error::Add`.
    #[instrument(skip(self, track_uris), fields(subsystem = "catalog", component = "spotify", op = "add_tracks", count = track_uris.len()))]
    async fn add_tracks(&self, playlist_id: &str, track_uris: &[String]) -> Result<()> {
        let request = AddTracksRequest {
            uris: track_uris.to_vec(),
        };

        let response = self
            .authed(
                self.http
                    .post(self.url(&format!("/playlists/{}/tracks", playlist_id))),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Add(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !matches!(status, StatusCode::CREATED | StatusCode::ACCEPTED) {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Add(format!(
                "failed to add track to playlist: {} {}",
                status, body
            )));
        }
        Ok(())
    }

    fn track_uri(&self, track_id: &str) -> String {
        format!("spotify:track:{}", track_id)
    }
}
