//! Playlist entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who may read a playlist besides its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharePermission {
    /// Readable by anyone.
    Public,
    /// Readable by accepted friends of the owner.
    Friends,
    /// Readable by the owner only.
    Private,
}

impl Default for SharePermission {
    fn default() -> Self {
        Self::Private
    }
}

/// A user-owned, ordered collection of songs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning user.
    pub owner_id: Uuid,
    /// Playlist name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Songs in playlist order.
    pub song_ids: Vec<Uuid>,
    /// Visibility policy.
    pub share_permission: SharePermission,
    /// Relative media path of the cover art.
    pub cover_art: Option<String>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    /// Creates a new private playlist.
    pub fn new(owner_id: Uuid, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            description: None,
            song_ids: Vec::new(),
            share_permission: SharePermission::default(),
            cover_art: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the visibility policy.
    pub fn with_share_permission(mut self, permission: SharePermission) -> Self {
        self.share_permission = permission;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_defaults_private() {
        let playlist = Playlist::new(Uuid::new_v4(), "Late Night");
        assert_eq!(playlist.share_permission, SharePermission::Private);
        assert!(playlist.song_ids.is_empty());
    }
}
