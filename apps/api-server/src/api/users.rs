//! User lookup endpoints.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use entities::UserSummary;
use music_store::MusicStore;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{ServerError, ServerResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

/// How many matches a username search returns at most.
const SEARCH_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct SearchUsersParams {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetUserIdRequest {
    pub username: String,
}

/// Searches users by username substring, excluding the caller.
pub async fn search_users<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<SearchUsersParams>,
) -> ServerResult<Json<Vec<UserSummary>>> {
    let query = params.query.as_deref().unwrap_or("").trim().to_string();
    if query.is_empty() {
        return Err(ServerError::InvalidRequest(
            "query parameter is required".to_string(),
        ));
    }

    // Fetch one extra so excluding the caller still fills the page.
    let matches = state.store.search_users(&query, SEARCH_LIMIT + 1).await?;
    let summaries = matches
        .iter()
        .filter(|m| m.id != user.id)
        .take(SEARCH_LIMIT)
        .map(|m| m.summary())
        .collect();

    Ok(Json(summaries))
}

/// Resolves a username to a user ID.
pub async fn get_user_id<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<GetUserIdRequest>,
) -> ServerResult<Json<Value>> {
    let username = request.username.trim();
    if username.is_empty() {
        return Err(ServerError::InvalidRequest(
            "username field is required".to_string(),
        ));
    }

    match state.store.get_user_by_username(username).await? {
        Some(user) => Ok(Json(json!({ "user_id": user.id }))),
        None => Err(ServerError::NotFound("User not found".to_string())),
    }
}
