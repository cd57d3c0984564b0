//! Token acquisition and scope checks for the Spotify Web API.
//!
//! The interactive authorization-code login happens outside this crate. We
//! accept either an already issued access token or a refresh token that is
//! exchanged against the accounts service.

use reqwest::Client;
use tracing::{debug, instrument};

use tunebridge_core::{Error, PlaylistVisibility, Result};

use super::types::TokenResponse;

/// How to obtain an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Pre-issued bearer token. Its scopes cannot be inspected.
    AccessToken(String),
    /// Refresh-token grant against the accounts service.
    RefreshToken {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

/// Bearer token plus the scopes the accounts service reported, if any.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub scopes: Option<Vec<String>>,
}

/// Scopes needed to run a sync under the given playlist policy.
pub fn required_scopes(visibility: PlaylistVisibility, read_private: bool) -> Vec<&'static str> {
    let mut scopes = vec![match visibility {
        PlaylistVisibility::Public => "playlist-modify-public",
        PlaylistVisibility::Private => "playlist-modify-private",
    }];
    if read_private {
        scopes.push("playlist-read-private");
    }
    scopes
}

/// Fail with `Error::Auth` listing every required scope that was not granted.
pub fn verify_scopes(granted: &[String], required: &[&str]) -> Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|scope| !granted.iter().any(|g| g == scope))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::Auth(format!(
            "token is missing required scopes: {}",
            missing.join(", ")
        )))
    }
}

/// Resolve credentials to an access token.
#[instrument(skip(http, credentials), fields(subsystem = "catalog", component = "spotify", op = "obtain_token"))]
pub async fn obtain_token(
    http: &Client,
    accounts_url: &str,
    credentials: &Credentials,
) -> Result<AccessToken> {
    match credentials {
        Credentials::AccessToken(token) => {
            debug!("Using pre-issued access token");
            Ok(AccessToken {
                token: token.clone(),
                scopes: None,
            })
        }
        Credentials::RefreshToken {
            client_id,
            client_secret,
            refresh_token,
        } => {
            let url = format!("{}/api/token", accounts_url.trim_end_matches('/'));
            let response = http
                .post(url)
                .basic_auth(client_id, Some(client_secret))
                .form(&[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token.as_str()),
                ])
                .send()
                .await
                .map_err(|e| Error::Auth(format!("Token request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Auth(format!(
                    "Token refresh returned {}: {}",
                    status, body
                )));
            }

            let token: TokenResponse = response
                .json()
                .await
                .map_err(|e| Error::Auth(format!("Failed to parse token response: {}", e)))?;

            debug!(expires_in = ?token.expires_in, "Refreshed access token");

            Ok(AccessToken {
                token: token.access_token,
                scopes: token
                    .scope
                    .map(|s| s.split_whitespace().map(String::from).collect()),
            })
        }
    }
}
