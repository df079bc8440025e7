//! Friendship entity definitions.
//!
//! A friendship row represents both a pending friend request and an
//! accepted friendship, distinguished by [`FriendshipStatus`]. A pending
//! row is directed: `user1` sent the request to `user2`. An accepted row
//! is undirected and stored in canonical order, lower user id first, so
//! the pair (A,B) and (B,A) map to the same row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a friendship row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    /// Friend request sent by `user1`, awaiting `user2`.
    Pending,
    /// Accepted, symmetric friendship.
    Accepted,
}

impl Default for FriendshipStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// An edge in the friendship graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Friendship {
    /// Unique identifier.
    pub id: Uuid,
    /// Sender while pending; lower-id user once accepted.
    pub user1_id: Uuid,
    /// Receiver while pending; higher-id user once accepted.
    pub user2_id: Uuid,
    /// Current status.
    pub status: FriendshipStatus,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    /// Creates a new pending friend request from `sender` to `receiver`.
    pub fn pending(sender: Uuid, receiver: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user1_id: sender,
            user2_id: receiver,
            status: FriendshipStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if this row connects `a` and `b` in either direction.
    pub fn connects(&self, a: Uuid, b: Uuid) -> bool {
        (self.user1_id == a && self.user2_id == b) || (self.user1_id == b && self.user2_id == a)
    }

    /// Returns true if this row touches `user` on either side.
    pub fn involves(&self, user: Uuid) -> bool {
        self.user1_id == user || self.user2_id == user
    }

    /// Returns the other side of the edge relative to `user`.
    pub fn partner_of(&self, user: Uuid) -> Uuid {
        if self.user1_id == user {
            self.user2_id
        } else {
            self.user1_id
        }
    }

    /// Marks the row accepted and rewrites the pair into canonical order.
    pub fn accept(&mut self) {
        if self.user1_id > self.user2_id {
            std::mem::swap(&mut self.user1_id, &mut self.user2_id);
        }
        self.status = FriendshipStatus::Accepted;
        self.updated_at = Utc::now();
    }

    /// Returns the unordered pair in canonical (lower id first) order.
    pub fn canonical_pair(&self) -> (Uuid, Uuid) {
        if self.user1_id <= self.user2_id {
            (self.user1_id, self.user2_id)
        } else {
            (self.user2_id, self.user1_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_canonicalizes_pair() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };

        // Send from the higher id so accept has to swap.
        let mut friendship = Friendship::pending(hi, lo);
        assert_eq!(friendship.status, FriendshipStatus::Pending);

        friendship.accept();
        assert_eq!(friendship.status, FriendshipStatus::Accepted);
        assert_eq!(friendship.user1_id, lo);
        assert_eq!(friendship.user2_id, hi);
        assert_eq!(friendship.canonical_pair(), (lo, hi));
    }

    #[test]
    fn test_connects_both_orderings() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let friendship = Friendship::pending(a, b);

        assert!(friendship.connects(a, b));
        assert!(friendship.connects(b, a));
        assert!(!friendship.connects(a, Uuid::new_v4()));
        assert_eq!(friendship.partner_of(a), b);
        assert_eq!(friendship.partner_of(b), a);
    }
}
