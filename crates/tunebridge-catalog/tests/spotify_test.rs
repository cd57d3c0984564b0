//! Integration tests for the Spotify client against a mock server.

use std::sync::Arc;

use tunebridge_catalog::{
    DestinationCatalog, DestinationPlaylistStore, Error, MatchTier, NormalizedQuery,
    PlaylistOptions, PlaylistProvisioner, PlaylistVisibility, SpotifyClient, SpotifyConfig,
    TrackMatcher,
};
use wiremock::matchers::{basic_auth, body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_profile(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "user-1",
            "display_name": "Test User"
        })))
        .mount(server)
        .await;
}

fn config_for(server: &MockServer) -> SpotifyConfig {
    SpotifyConfig {
        api_url: format!("{}/v1", server.uri()),
        accounts_url: server.uri(),
        access_token: Some("test-token".to_string()),
        ..Default::default()
    }
}

async fn connected(server: &MockServer) -> SpotifyClient {
    mount_profile(server).await;
    SpotifyClient::connect(config_for(server))
        .await
        .expect("connect should succeed")
}

fn track(id: &str, name: &str, artist: &str) -> serde_json::Value {
    serde_json::json!({"id": id, "name": name, "artists": [{"name": artist}, {"name": "Featured"}]})
}

#[tokio::test]
async fn test_connect_with_access_token_resolves_user() {
    let mock_server = MockServer::start().await;
    let client = connected(&mock_server).await;
    assert_eq!(client.user_id(), "user-1");
}

#[tokio::test]
async fn test_connect_with_refresh_grant_checks_scopes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(basic_auth("client-id", "client-secret"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "test-token",
            "token_type": "Bearer",
            "scope": "playlist-modify-public playlist-read-private",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_profile(&mock_server).await;

    let config = SpotifyConfig {
        access_token: None,
        client_id: Some("client-id".to_string()),
        client_secret: Some("client-secret".to_string()),
        refresh_token: Some("refresh-1".to_string()),
        ..config_for(&mock_server)
    };
    let client = SpotifyClient::connect(config).await.unwrap();
    assert_eq!(client.user_id(), "user-1");
}

#[tokio::test]
async fn test_connect_rejects_insufficient_scopes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "test-token",
            "scope": "playlist-modify-public"
        })))
        .mount(&mock_server)
        .await;
    mount_profile(&mock_server).await;

    let config = SpotifyConfig {
        access_token: None,
        client_id: Some("id".to_string()),
        client_secret: Some("secret".to_string()),
        refresh_token: Some("refresh".to_string()),
        visibility: PlaylistVisibility::Private,
        ..config_for(&mock_server)
    };
    let err = SpotifyClient::connect(config).await.err().unwrap();
    assert!(matches!(err, Error::Auth(_)));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_connect_profile_failure_is_auth_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"status": 401, "message": "Invalid access token"}
        })))
        .mount(&mock_server)
        .await;

    let err = SpotifyClient::connect(config_for(&mock_server))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::Auth(_)));
}

#[tokio::test]
async fn test_search_maps_first_artist() {
    let mock_server = MockServer::start().await;
    let client = connected(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("q", "track:Yesterday artist:Beatles"))
        .and(query_param("type", "track"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tracks": {"items": [
                track("t1", "Yesterday - Remastered 2009", "The Beatles"),
                track("t2", "Yesterday", "Boyz II Men")
            ]}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let tracks = client
        .search("track:Yesterday artist:Beatles", 5)
        .await
        .unwrap();
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].id, "t1");
    assert_eq!(tracks[0].primary_artist, "The Beatles");
    assert_eq!(tracks[1].title, "Yesterday");
}

#[tokio::test]
async fn test_search_failure_is_search_error() {
    let mock_server = MockServer::start().await;
    let client = connected(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let err = client.search("track:x", 5).await.unwrap_err();
    assert!(matches!(err, Error::Search(_)));
}

#[tokio::test]
async fn test_list_follows_next_pages() {
    let mock_server = MockServer::start().await;
    let client = connected(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1/me/playlists"))
        .and(query_param("offset", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"id": "p3", "name": "Target"}],
            "next": null
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/me/playlists"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"id": "p1", "name": "One"}, null, {"id": "p2", "name": "Two"}],
            "next": format!("{}/v1/me/playlists?offset=50&limit=50", mock_server.uri())
        })))
        .mount(&mock_server)
        .await;

    let playlists = client.list().await.unwrap();
    let ids: Vec<&str> = playlists.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2", "p3"]);
}

#[tokio::test]
async fn test_create_posts_policy() {
    let mock_server = MockServer::start().await;
    let client = connected(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/v1/users/user-1/playlists"))
        .and(body_json(serde_json::json!({
            "name": "Road Trip",
            "description": "Playlist imported",
            "public": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "new-1",
            "name": "Road Trip"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = PlaylistOptions {
        visibility: PlaylistVisibility::Private,
        ..Default::default()
    };
    let playlist = client.create("Road Trip", &options).await.unwrap();
    assert_eq!(playlist.id, "new-1");
}

#[tokio::test]
async fn test_add_tracks_sends_uris() {
    let mock_server = MockServer::start().await;
    let client = connected(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/v1/playlists/pl-9/tracks"))
        .and(body_json(serde_json::json!({"uris": ["spotify:track:abc"]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"snapshot_id": "s"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let uri = client.track_uri("abc");
    assert_eq!(uri, "spotify:track:abc");
    client.add_tracks("pl-9", &[uri]).await.unwrap();
}

#[tokio::test]
async fn test_add_tracks_rejection_is_add_error() {
    let mock_server = MockServer::start().await;
    let client = connected(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/v1/playlists/pl-9/tracks"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&mock_server)
        .await;

    let err = client
        .add_tracks("pl-9", &["spotify:track:abc".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Add(_)));
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_add_tracks_accepted_status_is_success() {
    let mock_server = MockServer::start().await;
    let client = connected(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/v1/playlists/pl-9/tracks"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    client
        .add_tracks("pl-9", &["spotify:track:abc".to_string()])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_add_tracks_plain_ok_is_add_error() {
    let mock_server = MockServer::start().await;
    let client = connected(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/v1/playlists/pl-9/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"snapshot_id": "s"})))
        .mount(&mock_server)
        .await;

    let err = client
        .add_tracks("pl-9", &["spotify:track:abc".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Add(_)));
    assert!(err.to_string().contains("200"));
}

#[tokio::test]
async fn test_provisioner_and_matcher_over_client() {
    let mock_server = MockServer::start().await;
    let client = Arc::new(connected(&mock_server).await);

    Mock::given(method("GET"))
        .and(path("/v1/me/playlists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"id": "existing", "name": "Playlist"}],
            "next": null
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("q", "track:Numb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tracks": {"items": [track("n1", "Numb", "Linkin Park")]}
        })))
        .mount(&mock_server)
        .await;

    let provisioner = PlaylistProvisioner::new(client.clone(), PlaylistOptions::default());
    let playlist = provisioner.check_or_create("Playlist").await.unwrap();
    assert_eq!(playlist.id, "existing");

    let matcher = TrackMatcher::new(client);
    let result = matcher
        .find(&NormalizedQuery {
            track: "Numb".to_string(),
            artist: String::new(),
        })
        .await
        .unwrap();
    assert_eq!(result.track_id, "n1");
    assert_eq!(result.tier, MatchTier::TrackOnly);
}
