//! Relationship error types.

use music_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during relationship operations.
#[derive(Debug, Error)]
pub enum RelationshipError {
    /// A user tried to relate to themself.
    #[error("Users cannot be friends with themselves")]
    SelfRelation,

    /// An identical pending request already exists.
    #[error("Friend request already sent")]
    RequestAlreadySent,

    /// The pair is already friends.
    #[error("Users are already friends")]
    AlreadyFriends,

    /// No pending request addressed to the caller.
    #[error("Friend request from {0} not found")]
    RequestNotFound(Uuid),

    /// Referenced user does not exist.
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// Underlying store error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RelationshipError {
    /// Returns true for the domain-invariant violations that are reported
    /// to users as a message rather than a hard failure.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::RequestAlreadySent | Self::AlreadyFriends)
    }
}

/// Result type for relationship operations.
pub type RelationshipResult<T> = Result<T, RelationshipError>;
