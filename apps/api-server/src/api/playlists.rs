//! Playlist endpoints.
//!
//! Reads on a single playlist are gated by its share permission: owners
//! always see their playlists, `public` ones are open to anyone, and
//! `friends` ones require an accepted friendship with the owner. Writes
//! are owner-only.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use chrono::Utc;
use entities::{Playlist, SharePermission};
use music_store::MusicStore;
use relationship::{FriendStatus, RelationshipEngine};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::api::read_upload;
use crate::error::{ServerError, ServerResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub song_ids: Vec<Uuid>,
    pub share_permission: Option<SharePermission>,
}

/// Partial playlist update; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdatePlaylistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub song_ids: Option<Vec<Uuid>>,
    pub share_permission: Option<SharePermission>,
}

/// Lists the caller's playlists.
pub async fn list_playlists<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<Vec<Playlist>>> {
    Ok(Json(state.store.list_playlists_of(user.id).await?))
}

/// Creates a playlist owned by the caller.
pub async fn create_playlist<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreatePlaylistRequest>,
) -> ServerResult<(StatusCode, Json<Playlist>)> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ServerError::InvalidRequest(
            "name field is required".to_string(),
        ));
    }
    ensure_songs_exist(&state, &request.song_ids).await?;

    let mut playlist = Playlist::new(user.id, name);
    playlist.description = request.description;
    playlist.song_ids = request.song_ids;
    if let Some(permission) = request.share_permission {
        playlist = playlist.with_share_permission(permission);
    }

    let playlist = state.store.create_playlist(playlist).await?;
    tracing::info!(owner = %user.username, playlist = %playlist.id, "Playlist created");

    Ok((StatusCode::CREATED, Json(playlist)))
}

/// Returns a playlist the viewer is allowed to see.
pub async fn get_playlist<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    viewer: Option<Extension<AuthenticatedUser>>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<Playlist>> {
    let playlist = require_playlist(&state, id).await?;
    ensure_readable(&state, viewer.map(|Extension(u)| u.id), &playlist).await?;
    Ok(Json(playlist))
}

/// Applies a partial update to a playlist the caller owns.
pub async fn update_playlist<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    viewer: Option<Extension<AuthenticatedUser>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePlaylistRequest>,
) -> ServerResult<Json<Playlist>> {
    let user = require_user(viewer)?;
    let mut playlist = require_owned_playlist(&state, id, user.id).await?;

    if let Some(name) = request.name {
        if name.trim().is_empty() {
            return Err(ServerError::InvalidRequest(
                "name field must not be empty".to_string(),
            ));
        }
        playlist.name = name.trim().to_string();
    }
    if let Some(description) = request.description {
        playlist.description = Some(description);
    }
    if let Some(song_ids) = request.song_ids {
        ensure_songs_exist(&state, &song_ids).await?;
        playlist.song_ids = song_ids;
    }
    if let Some(permission) = request.share_permission {
        playlist.share_permission = permission;
    }
    playlist.updated_at = Utc::now();

    Ok(Json(state.store.update_playlist(playlist).await?))
}

/// Deletes a playlist the caller owns.
pub async fn delete_playlist<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    viewer: Option<Extension<AuthenticatedUser>>,
    Path(id): Path<Uuid>,
) -> ServerResult<StatusCode> {
    let user = require_user(viewer)?;
    let playlist = require_owned_playlist(&state, id, user.id).await?;

    if let Some(cover) = &playlist.cover_art {
        state.media.remove(cover).await;
    }
    state.store.delete_playlist(playlist.id).await?;
    tracing::info!(owner = %user.username, playlist = %id, "Playlist deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Uploads cover art for a playlist the caller owns.
pub async fn upload_cover<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> ServerResult<Json<Value>> {
    let mut playlist = require_owned_playlist(&state, id, user.id).await?;

    let (filename, data) = read_upload(&mut multipart, "cover").await?;
    let relative = state
        .media
        .save("images/playlist_cover", playlist.id, &filename, &data)
        .await?;

    if let Some(old) = playlist.cover_art.replace(relative.clone()) {
        if old != relative {
            state.media.remove(&old).await;
        }
    }
    playlist.updated_at = Utc::now();
    state.store.update_playlist(playlist).await?;

    Ok(Json(
        json!({ "message": "Playlist cover updated", "cover_art": relative }),
    ))
}

async fn require_playlist<S: MusicStore>(
    state: &AppState<S>,
    id: Uuid,
) -> ServerResult<Playlist> {
    state
        .store
        .get_playlist(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Playlist not found".to_string()))
}

async fn require_owned_playlist<S: MusicStore>(
    state: &AppState<S>,
    id: Uuid,
    owner_id: Uuid,
) -> ServerResult<Playlist> {
    let playlist = require_playlist(state, id).await?;
    if playlist.owner_id != owner_id {
        return Err(ServerError::PermissionDenied);
    }
    Ok(playlist)
}

fn require_user(viewer: Option<Extension<AuthenticatedUser>>) -> ServerResult<AuthenticatedUser> {
    viewer
        .map(|Extension(user)| user)
        .ok_or(ServerError::AuthenticationRequired)
}

async fn ensure_readable<S: MusicStore>(
    state: &AppState<S>,
    viewer: Option<Uuid>,
    playlist: &Playlist,
) -> ServerResult<()> {
    if viewer == Some(playlist.owner_id) {
        return Ok(());
    }
    match playlist.share_permission {
        SharePermission::Public => Ok(()),
        SharePermission::Friends => {
            let Some(viewer) = viewer else {
                return Err(ServerError::AuthenticationRequired);
            };
            let engine = RelationshipEngine::new(&state.store);
            if engine.friend_status(playlist.owner_id, viewer).await? == FriendStatus::Friends {
                Ok(())
            } else {
                Err(ServerError::PermissionDenied)
            }
        }
        SharePermission::Private => {
            if viewer.is_none() {
                Err(ServerError::AuthenticationRequired)
            } else {
                Err(ServerError::PermissionDenied)
            }
        }
    }
}

async fn ensure_songs_exist<S: MusicStore>(
    state: &AppState<S>,
    song_ids: &[Uuid],
) -> ServerResult<()> {
    for song_id in song_ids {
        if state.store.get_song(*song_id).await?.is_none() {
            return Err(ServerError::NotFound("Song not found".to_string()));
        }
    }
    Ok(())
}
