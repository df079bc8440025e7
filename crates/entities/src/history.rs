//! Listening history entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Last known playback position of a user in a song. One row per
/// (user, song) pair, written via upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListeningHistory {
    /// Unique identifier.
    pub id: Uuid,
    /// Listening user.
    pub user_id: Uuid,
    /// Song being played.
    pub song_id: Uuid,
    /// Playback position in seconds.
    pub position: i64,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl ListeningHistory {
    /// Creates a new history entry.
    pub fn new(user_id: Uuid, song_id: Uuid, position: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            song_id,
            position,
            updated_at: Utc::now(),
        }
    }
}
