//! Listening history endpoints.
//!
//! The history keeps at most one row per (user, song); reporting a
//! position again moves the row to the top of the list instead of adding
//! a duplicate.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use entities::ListeningHistory;
use music_store::MusicStore;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdatePositionRequest {
    pub song_id: Uuid,
    #[serde(default)]
    pub position: i64,
}

/// Delete target: either a history row ID or a song ID.
#[derive(Debug, Deserialize)]
pub struct DeletePositionRequest {
    pub id: Option<Uuid>,
    pub song_id: Option<Uuid>,
}

/// Lists the caller's history, most recently played first.
pub async fn list_history<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<Vec<ListeningHistory>>> {
    Ok(Json(state.store.list_history_of(user.id).await?))
}

/// Records a playback position, creating or updating the history row.
pub async fn update_position<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<UpdatePositionRequest>,
) -> ServerResult<(StatusCode, Json<ListeningHistory>)> {
    if state.store.get_song(request.song_id).await?.is_none() {
        return Err(ServerError::NotFound("Song not found".to_string()));
    }

    let (entry, created) = state
        .store
        .upsert_history(user.id, request.song_id, request.position)
        .await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(entry)))
}

/// Deletes a history row addressed by row ID or song ID.
pub async fn delete_position<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<DeletePositionRequest>,
) -> ServerResult<StatusCode> {
    let entry = match (request.id, request.song_id) {
        (Some(id), _) => state.store.get_history(id).await?,
        (None, Some(song_id)) => state.store.find_history_by_song(user.id, song_id).await?,
        (None, None) => {
            return Err(ServerError::InvalidRequest(
                "Either id or song_id field is required".to_string(),
            ));
        }
    };

    // A row belonging to someone else is reported as missing.
    let entry = entry
        .filter(|e| e.user_id == user.id)
        .ok_or_else(|| ServerError::NotFound("Listening history not found".to_string()))?;
    state.store.delete_history(entry.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
