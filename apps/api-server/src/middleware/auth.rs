//! Authentication middleware.

use std::sync::Arc;

use auth::{Claims, JwtManager};
use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use music_store::MusicStore;
use serde_json::json;
use uuid::Uuid;

use crate::state::AppState;

/// Authenticated user information.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User ID.
    pub id: Uuid,
    /// Username.
    pub username: String,
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = auth::AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: claims.user_id()?,
            username: claims.username,
        })
    }
}

/// Extracts the JWT token from the Authorization header.
fn extract_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Validates an access token and returns the claims.
fn validate_token(jwt_manager: &JwtManager, token: &str) -> Result<Claims, StatusCode> {
    jwt_manager
        .validate_access_token(token)
        .map_err(|_| StatusCode::UNAUTHORIZED)
}

/// Authentication middleware.
///
/// Extracts the JWT access token from the Authorization header, validates
/// it, and stores the authenticated user in the request extensions.
pub async fn auth_middleware<S: MusicStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_token(&request) {
        Some(token) => token,
        None => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Authentication credentials were not provided." })),
            )
                .into_response();
        }
    };

    let claims = match validate_token(&state.jwt_manager, token) {
        Ok(claims) => claims,
        Err(status) => {
            return (status, Json(json!({ "error": "Invalid token" }))).into_response();
        }
    };

    match AuthenticatedUser::try_from(claims) {
        Ok(user) => {
            request.extensions_mut().insert(user);
        }
        Err(_) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid token claims" })),
            )
                .into_response();
        }
    }

    next.run(request).await
}

/// Optional authentication middleware.
///
/// Works like `auth_middleware` but doesn't fail if no token is provided.
/// Used for endpoints that serve both authenticated and anonymous readers
/// (catalog browsing, shared playlists).
pub async fn optional_auth_middleware<S: MusicStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(&request) {
        if let Ok(claims) = state.jwt_manager.validate_access_token(token) {
            if let Ok(user) = AuthenticatedUser::try_from(claims) {
                request.extensions_mut().insert(user);
            }
        }
    }

    next.run(request).await
}
