//! API endpoints.

pub mod auth;
pub mod friends;
pub mod history;
pub mod library;
pub mod playlists;
pub mod profile;
pub mod users;

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::Multipart,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use music_store::MusicStore;

use crate::error::{ServerError, ServerResult};

use crate::middleware::{auth_middleware, optional_auth_middleware};
use crate::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router<S: MusicStore + 'static>(state: Arc<AppState<S>>) -> Router {
    // No token needed.
    let public = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/token", post(auth::obtain_token))
        .route("/api/auth/token/refresh", post(auth::refresh_token))
        .route("/api/auth/token/verify", post(auth::verify_token))
        .route("/health", get(health_check));

    // Anonymous reads allowed; a token, when present, unlocks
    // friend-gated playlists. Playlist writes on the shared path check
    // for an authenticated user themselves.
    let browse = Router::new()
        .route("/api/library/search", get(library::search))
        .route("/api/library/songs", get(library::list_songs))
        .route("/api/library/songs/:id", get(library::get_song))
        .route("/api/library/artists", get(library::list_artists))
        .route("/api/library/artists/:id", get(library::get_artist))
        .route("/api/library/albums", get(library::list_albums))
        .route("/api/library/albums/:id", get(library::get_album))
        .route(
            "/api/playlists/:id",
            get(playlists::get_playlist)
                .put(playlists::update_playlist)
                .delete(playlists::delete_playlist),
        )
        .route_layer(from_fn_with_state(state.clone(), optional_auth_middleware));

    // Token required.
    let protected = Router::new()
        .route("/api/users/search", get(users::search_users))
        .route("/api/users/get-id", post(users::get_user_id))
        .route("/api/friends", get(friends::list_relationships))
        .route("/api/friends/request", post(friends::send_request))
        .route("/api/friends/respond", post(friends::respond_request))
        .route("/api/friends/remove", post(friends::remove_friend))
        .route("/api/friends/status/:user_id", get(friends::friend_status))
        .route(
            "/api/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route(
            "/api/profile/picture",
            post(profile::upload_picture).delete(profile::delete_picture),
        )
        .route("/api/library/songs/liked", get(library::list_liked_songs))
        .route(
            "/api/library/songs/:id/like",
            post(library::like_song).delete(library::unlike_song),
        )
        .route(
            "/api/library/songs/:id/lyrics",
            put(library::upload_lyrics).delete(library::delete_lyrics),
        )
        .route(
            "/api/playlists",
            get(playlists::list_playlists).post(playlists::create_playlist),
        )
        .route("/api/playlists/:id/cover", post(playlists::upload_cover))
        .route("/api/history", get(history::list_history))
        .route(
            "/api/history/position",
            post(history::update_position).delete(history::delete_position),
        )
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    public.merge(browse).merge(protected).with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// Pulls the named file field out of a multipart upload.
pub(crate) async fn read_upload(
    multipart: &mut Multipart,
    field_name: &str,
) -> ServerResult<(String, Bytes)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::InvalidRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some(field_name) {
            let filename = field.file_name().unwrap_or("upload.bin").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ServerError::InvalidRequest(format!("Invalid multipart body: {e}")))?;
            return Ok((filename, data));
        }
    }

    Err(ServerError::InvalidRequest(format!(
        "{field_name} field is required"
    )))
}
