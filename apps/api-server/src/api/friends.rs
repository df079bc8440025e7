//! Friendship endpoints.
//!
//! All endpoints act on behalf of the authenticated user. Requests are
//! addressed by the other user's ID (or username when sending), never by
//! friendship row ID.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use entities::User;
use music_store::MusicStore;
use relationship::{RelationshipEngine, SendOutcome};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

/// Friend request payload. Exactly one of `id` or `username` is needed;
/// `id` wins when both are present.
#[derive(Debug, Deserialize)]
pub struct SendRequestPayload {
    pub id: Option<Uuid>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequestPayload {
    pub user_id: Uuid,
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFriendPayload {
    pub user_id: Uuid,
}

/// Sends a friend request. A request sent while the reverse request is
/// pending accepts it instead.
pub async fn send_request<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<SendRequestPayload>,
) -> ServerResult<(StatusCode, Json<Value>)> {
    let friend = resolve_target(&state, &payload).await?;

    let engine = RelationshipEngine::new(&state.store);
    match engine.send_request(user.id, friend.id).await {
        Ok(SendOutcome::RequestSent) => {
            tracing::info!(from = %user.username, to = %friend.username, "Friend request sent");
            Ok((
                StatusCode::CREATED,
                Json(json!({ "message": "Friend request sent successfully" })),
            ))
        }
        Ok(SendOutcome::FriendshipAccepted) => {
            tracing::info!(from = %user.username, to = %friend.username, "Mutual request accepted");
            Ok((
                StatusCode::CREATED,
                Json(json!({ "message": "Friend request accepted" })),
            ))
        }
        // Repeats are reported, not rejected.
        Err(e) if e.is_duplicate() => Ok((StatusCode::OK, Json(json!({ "message": e.to_string() })))),
        Err(e) => Err(e.into()),
    }
}

/// Lists the caller's friends plus pending requests in both directions.
pub async fn list_relationships<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<Value>> {
    let engine = RelationshipEngine::new(&state.store);

    let mut friends = Vec::new();
    for id in engine.friends_of(user.id).await? {
        // Skip rows whose partner vanished.
        if let Some(friend) = state.store.get_user(id).await? {
            friends.push(friend.summary());
        }
    }

    let mut sent_requests = Vec::new();
    for request in engine.sent_requests_of(user.id).await? {
        if let Some(receiver) = state.store.get_user(request.user2_id).await? {
            sent_requests.push(json!({
                "id": request.id,
                "receiver_user_id": receiver.id,
                "receiver_username": receiver.username,
            }));
        }
    }

    let mut received_requests = Vec::new();
    for request in engine.received_requests_of(user.id).await? {
        if let Some(sender) = state.store.get_user(request.user1_id).await? {
            received_requests.push(json!({
                "id": request.id,
                "sender_user_id": sender.id,
                "sender_username": sender.username,
            }));
        }
    }

    Ok(Json(json!({
        "friends": friends,
        "sent_requests": sent_requests,
        "received_requests": received_requests,
    })))
}

/// Accepts or rejects a pending request from the given sender.
pub async fn respond_request<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<RespondRequestPayload>,
) -> ServerResult<Json<Value>> {
    let engine = RelationshipEngine::new(&state.store);
    match payload.response.as_str() {
        "accept" => {
            engine.accept_request(user.id, payload.user_id).await?;
            tracing::info!(receiver = %user.username, sender = %payload.user_id, "Friend request accepted");
            Ok(Json(json!({ "message": "Friend request accepted" })))
        }
        "reject" => {
            engine.reject_request(user.id, payload.user_id).await?;
            tracing::info!(receiver = %user.username, sender = %payload.user_id, "Friend request rejected");
            Ok(Json(json!({ "message": "Friend request rejected" })))
        }
        _ => Err(ServerError::InvalidRequest(
            "response field must be 'accept' or 'reject'".to_string(),
        )),
    }
}

/// Removes an existing friendship.
pub async fn remove_friend<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<RemoveFriendPayload>,
) -> ServerResult<Json<Value>> {
    let engine = RelationshipEngine::new(&state.store);
    if engine.remove_friend(user.id, payload.user_id).await? {
        tracing::info!(user = %user.username, friend = %payload.user_id, "Friend removed");
        Ok(Json(json!({ "message": "Friend removed" })))
    } else {
        Err(ServerError::NotFound("Friendship not found".to_string()))
    }
}

/// Reports the relationship between the caller and another user.
pub async fn friend_status<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(user_id): Path<Uuid>,
) -> ServerResult<Json<Value>> {
    let engine = RelationshipEngine::new(&state.store);
    let status = engine.friend_status(user.id, user_id).await?;
    Ok(Json(json!({ "status": status })))
}

async fn resolve_target<S: MusicStore>(
    state: &AppState<S>,
    payload: &SendRequestPayload,
) -> ServerResult<User> {
    let found = if let Some(id) = payload.id {
        state.store.get_user(id).await?
    } else if let Some(username) = payload.username.as_deref() {
        state.store.get_user_by_username(username).await?
    } else {
        return Err(ServerError::InvalidRequest(
            "id or username field is required".to_string(),
        ));
    };

    found.ok_or_else(|| ServerError::NotFound("User not found".to_string()))
}
