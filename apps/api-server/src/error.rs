//! Server error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use music_store::StoreError;
use relationship::RelationshipError;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid request parameters.
    #[error("{0}")]
    InvalidRequest(String),

    /// Authentication required.
    #[error("Authentication credentials were not provided.")]
    AuthenticationRequired,

    /// Permission denied.
    #[error("Permission denied")]
    PermissionDenied,

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Store error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Relationship error.
    #[error(transparent)]
    Relationship(#[from] RelationshipError),

    /// Authentication error.
    #[error(transparent)]
    Auth(#[from] auth::AuthError),

    /// File I/O error.
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            ServerError::PermissionDenied => StatusCode::FORBIDDEN,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Store(e) => match e {
                StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                StoreError::AlreadyExists { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Relationship(e) => match e {
                RelationshipError::SelfRelation => StatusCode::BAD_REQUEST,
                RelationshipError::RequestAlreadySent | RelationshipError::AlreadyFriends => {
                    StatusCode::BAD_REQUEST
                }
                RelationshipError::RequestNotFound(_) | RelationshipError::UserNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                RelationshipError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
                RelationshipError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Auth(auth::AuthError::PasswordHashing(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServerError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServerError::Io(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Request failed");
        }

        let body = json!({ "error": self.to_string() });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
