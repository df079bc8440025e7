//! Registration and token endpoints.

use std::sync::Arc;

use auth::{hash_password, verify_password};
use axum::{Json, extract::State, http::StatusCode};
use entities::{Profile, User};
use music_store::MusicStore;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Token request. `username` also accepts the account email.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Token refresh request.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Token verification request.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

/// Registers a new user with an attached profile.
pub async fn register<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<RegisterRequest>,
) -> ServerResult<(StatusCode, Json<Value>)> {
    let username = request.username.trim();
    if username.is_empty() {
        return Err(ServerError::InvalidRequest(
            "username field is required".to_string(),
        ));
    }
    if request.password.is_empty() {
        return Err(ServerError::InvalidRequest(
            "password field is required".to_string(),
        ));
    }

    if let Some(email) = request.email.as_deref() {
        if state.store.get_profile_by_email(email).await?.is_some() {
            return Err(ServerError::InvalidRequest(
                "A user with that email already exists".to_string(),
            ));
        }
    }

    let password_hash = hash_password(&request.password)?;
    let mut user = User::new(username, password_hash);
    if let Some(email) = request.email.clone() {
        user = user.with_email(email);
    }
    let user = state.store.create_user(user).await.map_err(|e| {
        if e.is_conflict() {
            ServerError::InvalidRequest("A user with that username already exists".to_string())
        } else {
            e.into()
        }
    })?;

    let mut profile = Profile::new(user.id);
    profile.first_name = request.first_name;
    profile.last_name = request.last_name;
    if let Some(email) = request.email {
        profile = profile.with_email(email);
    }
    state.store.create_profile(profile).await?;

    tracing::info!(username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

/// Issues an access/refresh token pair for valid credentials.
pub async fn obtain_token<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<TokenRequest>,
) -> ServerResult<Json<Value>> {
    let user = lookup_account(&state, &request.username).await?;

    let Some(user) = user else {
        return Err(auth::AuthError::InvalidCredentials.into());
    };
    verify_password(&request.password, &user.password_hash)?;

    let access = state
        .jwt_manager
        .generate_access_token(user.id, user.username.clone())?;
    let refresh = state
        .jwt_manager
        .generate_refresh_token(user.id, user.username.clone())?;

    tracing::debug!(username = %user.username, "Token pair issued");

    Ok(Json(json!({ "access": access, "refresh": refresh })))
}

/// Exchanges a refresh token for a fresh access token.
pub async fn refresh_token<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<RefreshRequest>,
) -> ServerResult<Json<Value>> {
    let access = state.jwt_manager.refresh_access_token(&request.refresh)?;
    Ok(Json(json!({ "access": access })))
}

/// Verifies a token of either type.
pub async fn verify_token<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<VerifyRequest>,
) -> ServerResult<Json<Value>> {
    state.jwt_manager.validate_token(&request.token)?;
    Ok(Json(json!({})))
}

/// Looks up an account by username, falling back to the profile email.
async fn lookup_account<S: MusicStore>(
    state: &AppState<S>,
    identifier: &str,
) -> ServerResult<Option<User>> {
    if let Some(user) = state.store.get_user_by_username(identifier).await? {
        return Ok(Some(user));
    }
    if let Some(profile) = state.store.get_profile_by_email(identifier).await? {
        return Ok(state.store.get_user(profile.user_id).await?);
    }
    Ok(None)
}
