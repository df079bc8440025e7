//! End-to-end API tests against an in-memory store.

use std::path::PathBuf;

use api_server::{Config, create_app, create_state};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use entities::Song;
use http_body_util::BodyExt;
use music_store::{MemoryStore, MusicStore};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

fn test_config(media_root: PathBuf) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: "integration-test-secret".to_string(),
        jwt_expiration_hours: 1,
        refresh_expiration_hours: 24,
        media_root,
        log_level: "warn".to_string(),
    }
}

fn test_app(store: MemoryStore, media_root: PathBuf) -> Router {
    create_app(create_state(test_config(media_root), store))
}

async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register_and_login(app: &Router, username: &str) -> String {
    let (status, _) = request(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": username, "password": "sekrit123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = request(
        app,
        Method::POST,
        "/api/auth/token",
        None,
        Some(json!({ "username": username, "password": "sekrit123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["access"].as_str().unwrap().to_string()
}

async fn user_id(app: &Router, token: &str, username: &str) -> Uuid {
    let (status, body) = request(
        app,
        Method::POST,
        "/api/users/get-id",
        Some(token),
        Some(json!({ "username": username })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["user_id"].as_str().unwrap().parse().unwrap()
}

async fn seed_song(store: &MemoryStore, title: &str) -> Song {
    store
        .create_song(Song::new(title, Vec::new()))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_friendship_flow() {
    let media = tempfile::tempdir().unwrap();
    let app = test_app(MemoryStore::new(), media.path().to_path_buf());

    let alice_token = register_and_login(&app, "alice").await;
    let bob_token = register_and_login(&app, "bob").await;
    let alice_id = user_id(&app, &bob_token, "alice").await;
    let bob_id = user_id(&app, &alice_token, "bob").await;

    // Alice sends a request by username.
    let (status, body) = request(
        &app,
        Method::POST,
        "/api/friends/request",
        Some(&alice_token),
        Some(json!({ "username": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Friend request sent successfully");

    // Repeating the send reports, not errors.
    let (status, _) = request(
        &app,
        Method::POST,
        "/api/friends/request",
        Some(&alice_token),
        Some(json!({ "id": bob_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Bob sees the incoming request, alice sees it outgoing.
    let (_, bob_view) = request(&app, Method::GET, "/api/friends", Some(&bob_token), None).await;
    assert_eq!(bob_view["received_requests"][0]["sender_username"], "alice");
    assert!(bob_view["friends"].as_array().unwrap().is_empty());

    let (_, alice_view) =
        request(&app, Method::GET, "/api/friends", Some(&alice_token), None).await;
    assert_eq!(alice_view["sent_requests"][0]["receiver_username"], "bob");

    // Bob accepts by sender ID.
    let (status, body) = request(
        &app,
        Method::POST,
        "/api/friends/respond",
        Some(&bob_token),
        Some(json!({ "user_id": alice_id, "response": "accept" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Friend request accepted");

    // Both sides now list each other as friends with no pending rows.
    let (_, bob_view) = request(&app, Method::GET, "/api/friends", Some(&bob_token), None).await;
    assert_eq!(bob_view["friends"][0]["username"], "alice");
    assert!(bob_view["received_requests"].as_array().unwrap().is_empty());

    let (_, alice_view) =
        request(&app, Method::GET, "/api/friends", Some(&alice_token), None).await;
    assert_eq!(alice_view["friends"][0]["username"], "bob");
    assert!(alice_view["sent_requests"].as_array().unwrap().is_empty());

    let (_, body) = request(
        &app,
        Method::GET,
        &format!("/api/friends/status/{bob_id}"),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(body["status"], "friends");

    // Alice removes bob; a second removal is a 404.
    let (status, _) = request(
        &app,
        Method::POST,
        "/api/friends/remove",
        Some(&alice_token),
        Some(json!({ "user_id": bob_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, bob_view) = request(&app, Method::GET, "/api/friends", Some(&bob_token), None).await;
    assert!(bob_view["friends"].as_array().unwrap().is_empty());

    let (status, _) = request(
        &app,
        Method::POST,
        "/api/friends/remove",
        Some(&alice_token),
        Some(json!({ "user_id": bob_id })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mutual_requests_become_friendship() {
    let media = tempfile::tempdir().unwrap();
    let app = test_app(MemoryStore::new(), media.path().to_path_buf());

    let alice_token = register_and_login(&app, "alice").await;
    let bob_token = register_and_login(&app, "bob").await;

    let (status, _) = request(
        &app,
        Method::POST,
        "/api/friends/request",
        Some(&alice_token),
        Some(json!({ "username": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Bob's request in the other direction accepts instead of duplicating.
    let (status, body) = request(
        &app,
        Method::POST,
        "/api/friends/request",
        Some(&bob_token),
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Friend request accepted");

    let (_, alice_view) =
        request(&app, Method::GET, "/api/friends", Some(&alice_token), None).await;
    assert_eq!(alice_view["friends"][0]["username"], "bob");
    assert!(alice_view["sent_requests"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_self_request_rejected() {
    let media = tempfile::tempdir().unwrap();
    let app = test_app(MemoryStore::new(), media.path().to_path_buf());

    let token = register_and_login(&app, "alice").await;
    let (status, body) = request(
        &app,
        Method::POST,
        "/api/friends/request",
        Some(&token),
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_requires_authentication() {
    let media = tempfile::tempdir().unwrap();
    let app = test_app(MemoryStore::new(), media.path().to_path_buf());

    let (status, body) = request(&app, Method::GET, "/api/friends", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["error"],
        "Authentication credentials were not provided."
    );

    let (status, _) = request(&app, Method::GET, "/api/friends", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let media = tempfile::tempdir().unwrap();
    let app = test_app(MemoryStore::new(), media.path().to_path_buf());

    register_and_login(&app, "alice").await;
    let (status, body) = request(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "alice", "password": "other" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "A user with that username already exists");
}

#[tokio::test]
async fn test_token_refresh_and_verify() {
    let media = tempfile::tempdir().unwrap();
    let app = test_app(MemoryStore::new(), media.path().to_path_buf());

    let (status, _) = request(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "alice", "password": "sekrit123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, tokens) = request(
        &app,
        Method::POST,
        "/api/auth/token",
        None,
        Some(json!({ "username": "alice", "password": "sekrit123" })),
    )
    .await;
    let refresh = tokens["refresh"].as_str().unwrap();

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/auth/token/refresh",
        None,
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access = body["access"].as_str().unwrap();

    let (status, _) = request(
        &app,
        Method::POST,
        "/api/auth/token/verify",
        None,
        Some(json!({ "token": access })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // An access token cannot be used as a refresh token.
    let (status, _) = request(
        &app,
        Method::POST,
        "/api/auth/token/refresh",
        None,
        Some(json!({ "refresh": access })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(
        &app,
        Method::POST,
        "/api/auth/token",
        None,
        Some(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_playlist_visibility() {
    let media = tempfile::tempdir().unwrap();
    let store = MemoryStore::new();
    let song = seed_song(&store, "Shared Song").await;
    let app = test_app(store, media.path().to_path_buf());

    let alice_token = register_and_login(&app, "alice").await;
    let bob_token = register_and_login(&app, "bob").await;
    let alice_id = user_id(&app, &bob_token, "alice").await;

    let (status, playlist) = request(
        &app,
        Method::POST,
        "/api/playlists",
        Some(&alice_token),
        Some(json!({
            "name": "For friends",
            "song_ids": [song.id],
            "share_permission": "friends",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let playlist_uri = format!("/api/playlists/{}", playlist["id"].as_str().unwrap());

    // Anonymous viewers are asked to authenticate, non-friends are denied.
    let (status, _) = request(&app, Method::GET, &playlist_uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&app, Method::GET, &playlist_uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Becoming friends unlocks it.
    request(
        &app,
        Method::POST,
        "/api/friends/request",
        Some(&bob_token),
        Some(json!({ "username": "alice" })),
    )
    .await;
    request(
        &app,
        Method::POST,
        "/api/friends/respond",
        Some(&alice_token),
        Some(json!({ "user_id": user_id(&app, &alice_token, "bob").await, "response": "accept" })),
    )
    .await;

    let (status, body) = request(&app, Method::GET, &playlist_uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "For friends");
    assert_eq!(body["owner_id"].as_str().unwrap(), alice_id.to_string());

    // Writes stay owner-only.
    let (status, _) = request(
        &app,
        Method::PUT,
        &playlist_uri,
        Some(&bob_token),
        Some(json!({ "name": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app,
        Method::DELETE,
        &playlist_uri,
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_history_flow() {
    let media = tempfile::tempdir().unwrap();
    let store = MemoryStore::new();
    let song = seed_song(&store, "On Repeat").await;
    let other = seed_song(&store, "Other Song").await;
    let app = test_app(store, media.path().to_path_buf());

    let token = register_and_login(&app, "alice").await;

    let (status, entry) = request(
        &app,
        Method::POST,
        "/api/history/position",
        Some(&token),
        Some(json!({ "song_id": song.id, "position": 42 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["position"], 42);

    // Reporting again updates the existing row.
    let (status, entry) = request(
        &app,
        Method::POST,
        "/api/history/position",
        Some(&token),
        Some(json!({ "song_id": song.id, "position": 99 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["position"], 99);

    let (status, _) = request(
        &app,
        Method::POST,
        "/api/history/position",
        Some(&token),
        Some(json!({ "song_id": other.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Most recently updated first.
    let (_, history) = request(&app, Method::GET, "/api/history", Some(&token), None).await;
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["song_id"].as_str().unwrap(), other.id.to_string());

    let (status, _) = request(
        &app,
        Method::DELETE,
        "/api/history/position",
        Some(&token),
        Some(json!({ "song_id": song.id })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, history) = request(&app, Method::GET, "/api/history", Some(&token), None).await;
    assert_eq!(history.as_array().unwrap().len(), 1);

    let (status, _) = request(
        &app,
        Method::DELETE,
        "/api/history/position",
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // An unknown song is a 404.
    let (status, _) = request(
        &app,
        Method::POST,
        "/api/history/position",
        Some(&token),
        Some(json!({ "song_id": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lyrics_upload_and_validation() {
    let media = tempfile::tempdir().unwrap();
    let store = MemoryStore::new();
    let song = seed_song(&store, "With Words").await;
    let app = test_app(store, media.path().to_path_buf());

    let token = register_and_login(&app, "alice").await;
    let lyrics_uri = format!("/api/library/songs/{}/lyrics", song.id);
    let song_uri = format!("/api/library/songs/{}", song.id);

    // A malformed entry rejects the whole payload.
    let (status, _) = request(
        &app,
        Method::PUT,
        &lyrics_uri,
        Some(&token),
        Some(json!([
            { "startTime": 0.0, "text": "ok", "duration": 1.0 },
            { "startTime": "bad", "text": "nope", "duration": 1.0 },
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = request(&app, Method::GET, &song_uri, None, None).await;
    assert!(body["lyrics"].is_null());

    let (status, _) = request(
        &app,
        Method::PUT,
        &lyrics_uri,
        Some(&token),
        Some(json!([
            { "startTime": 0.0, "text": "first", "duration": 2.0 },
            { "startTime": 2.0, "text": "second", "duration": 2.5 },
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request(&app, Method::GET, &song_uri, None, None).await;
    assert_eq!(body["lyrics"][0]["text"], "first");
    assert_eq!(body["lyrics"][1]["startTime"], 2.0);

    let (status, _) = request(&app, Method::DELETE, &lyrics_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request(&app, Method::GET, &song_uri, None, None).await;
    assert!(body["lyrics"].is_null());
}

#[tokio::test]
async fn test_library_search() {
    let media = tempfile::tempdir().unwrap();
    let store = MemoryStore::new();
    seed_song(&store, "Blue Monday").await;
    seed_song(&store, "Blue Train").await;
    seed_song(&store, "Red Rain").await;
    let app = test_app(store, media.path().to_path_buf());

    let (status, body) = request(
        &app,
        Method::GET,
        "/api/library/search?query=blue",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["songs"].as_array().unwrap().len(), 2);
    assert!(body["artists"].as_array().unwrap().is_empty());

    let (status, _) = request(&app, Method::GET, "/api/library/search", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        &app,
        Method::GET,
        "/api/library/search?query=blue&max_results=1",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["songs"].as_array().unwrap().len(), 1);
}
