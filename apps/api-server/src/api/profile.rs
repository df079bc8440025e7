//! Profile endpoints.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Multipart, State},
};
use chrono::{NaiveDate, Utc};
use entities::{Gender, Profile};
use music_store::MusicStore;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::api::read_upload;
use crate::error::{ServerError, ServerResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
}

/// Returns the caller's profile.
pub async fn get_profile<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<Profile>> {
    let profile = load_profile(&state, &user).await?;
    Ok(Json(profile))
}

/// Applies a partial update to the caller's profile.
pub async fn update_profile<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> ServerResult<Json<Profile>> {
    let mut profile = load_profile(&state, &user).await?;

    if let Some(email) = request.email {
        if let Some(existing) = state.store.get_profile_by_email(&email).await? {
            if existing.user_id != user.id {
                return Err(ServerError::InvalidRequest(
                    "A user with that email already exists".to_string(),
                ));
            }
        }
        profile.email = Some(email);
    }
    if let Some(first_name) = request.first_name {
        profile.first_name = Some(first_name);
    }
    if let Some(last_name) = request.last_name {
        profile.last_name = Some(last_name);
    }
    if let Some(gender) = request.gender {
        profile.gender = Some(gender);
    }
    if let Some(birth_date) = request.birth_date {
        profile.birth_date = Some(birth_date);
    }
    profile.updated_at = Utc::now();

    let profile = state.store.update_profile(profile).await?;
    Ok(Json(profile))
}

/// Uploads a profile picture, replacing any previous one.
pub async fn upload_picture<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    mut multipart: Multipart,
) -> ServerResult<Json<Value>> {
    let mut profile = load_profile(&state, &user).await?;

    let (filename, data) = read_upload(&mut multipart, "picture").await?;
    let relative = state
        .media
        .save("images/profile_picture", user.id, &filename, &data)
        .await?;

    if let Some(old) = profile.picture.replace(relative.clone()) {
        if old != relative {
            state.media.remove(&old).await;
        }
    }
    profile.updated_at = Utc::now();
    state.store.update_profile(profile).await?;

    Ok(Json(
        json!({ "message": "Profile picture updated", "picture": relative }),
    ))
}

/// Deletes the profile picture.
pub async fn delete_picture<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<Value>> {
    let mut profile = load_profile(&state, &user).await?;

    let Some(old) = profile.picture.take() else {
        return Err(ServerError::NotFound(
            "Profile picture not found".to_string(),
        ));
    };
    state.media.remove(&old).await;
    profile.updated_at = Utc::now();
    state.store.update_profile(profile).await?;

    Ok(Json(json!({ "message": "Profile picture deleted" })))
}

async fn load_profile<S: MusicStore>(
    state: &AppState<S>,
    user: &AuthenticatedUser,
) -> ServerResult<Profile> {
    state
        .store
        .get_profile(user.id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Profile not found".to_string()))
}
