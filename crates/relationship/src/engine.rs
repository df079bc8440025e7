//! The relationship engine.

use entities::{Friendship, FriendshipStatus};
use music_store::MusicStore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{RelationshipError, RelationshipResult};

/// Relationship between two users as seen from the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendStatus {
    /// Accepted friendship.
    Friends,
    /// The first user sent a request that is still pending.
    PendingSent,
    /// The first user received a request that is still pending.
    PendingReceived,
    /// No edge between the pair.
    None,
}

/// What a send call ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// A new pending request was stored.
    RequestSent,
    /// The reverse request existed and was merged into a friendship.
    FriendshipAccepted,
}

/// Friend-request state machine over a [`MusicStore`].
///
/// All operations take user identifiers; the engine holds no state of its
/// own beyond the store reference. Consistency rests on the store's
/// pair-uniqueness guarantee: check-then-act sequences treat a uniqueness
/// conflict as proof that the desired end state already exists.
pub struct RelationshipEngine<'a, S: MusicStore> {
    store: &'a S,
}

impl<'a, S: MusicStore> RelationshipEngine<'a, S> {
    /// Creates an engine over the given store.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Sends a friend request from `sender` to `receiver`.
    ///
    /// If the reverse request is already pending, the two-sided race
    /// collapses into one accepted friendship instead of a second row.
    pub async fn send_request(
        &self,
        sender: Uuid,
        receiver: Uuid,
    ) -> RelationshipResult<SendOutcome> {
        if sender == receiver {
            return Err(RelationshipError::SelfRelation);
        }

        match self.store.get_friendship_between(sender, receiver).await? {
            Some(existing) if existing.status == FriendshipStatus::Accepted => {
                Err(RelationshipError::AlreadyFriends)
            }
            Some(existing) if existing.user1_id == sender => {
                Err(RelationshipError::RequestAlreadySent)
            }
            Some(mut reverse) => {
                // Receiver already asked first; merge into a friendship.
                reverse.accept();
                match self.store.update_friendship(reverse).await {
                    Ok(friendship) => {
                        tracing::info!(
                            user1 = %friendship.user1_id,
                            user2 = %friendship.user2_id,
                            "Mutual friend requests merged"
                        );
                        Ok(SendOutcome::FriendshipAccepted)
                    }
                    // A concurrent accept got there first; same end state.
                    Err(e) if e.is_conflict() => Ok(SendOutcome::FriendshipAccepted),
                    Err(e) => Err(e.into()),
                }
            }
            None => {
                match self
                    .store
                    .create_friendship(Friendship::pending(sender, receiver))
                    .await
                {
                    Ok(_) => Ok(SendOutcome::RequestSent),
                    // Lost a race against another writer on this pair.
                    Err(e) if e.is_conflict() => Err(RelationshipError::RequestAlreadySent),
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    /// Accepts the pending request `sender` sent to `receiver`.
    pub async fn accept_request(&self, receiver: Uuid, sender: Uuid) -> RelationshipResult<()> {
        if receiver == sender {
            return Err(RelationshipError::SelfRelation);
        }

        match self.store.get_friendship_between(sender, receiver).await? {
            // Concurrent double-accept already landed; nothing to do.
            Some(existing) if existing.status == FriendshipStatus::Accepted => Ok(()),
            Some(mut pending) if pending.user2_id == receiver => {
                pending.accept();
                match self.store.update_friendship(pending).await {
                    Ok(_) => Ok(()),
                    Err(e) if e.is_conflict() => Ok(()),
                    Err(e) => Err(e.into()),
                }
            }
            _ => Err(RelationshipError::RequestNotFound(sender)),
        }
    }

    /// Rejects the pending request `sender` sent to `receiver`, deleting
    /// it outright.
    pub async fn reject_request(&self, receiver: Uuid, sender: Uuid) -> RelationshipResult<()> {
        if receiver == sender {
            return Err(RelationshipError::SelfRelation);
        }

        match self.store.get_friendship_between(sender, receiver).await? {
            Some(pending)
                if pending.status == FriendshipStatus::Pending
                    && pending.user2_id == receiver =>
            {
                self.store.delete_friendship(pending.id).await?;
                Ok(())
            }
            _ => Err(RelationshipError::RequestNotFound(sender)),
        }
    }

    /// Removes the friendship between `a` and `b`, clearing any stale
    /// pending rows in both directions as well. Returns whether anything
    /// was removed.
    pub async fn remove_friend(&self, a: Uuid, b: Uuid) -> RelationshipResult<bool> {
        if a == b {
            return Err(RelationshipError::SelfRelation);
        }

        let removed = self.store.delete_friendships_between(a, b).await?;
        if removed > 0 {
            tracing::info!(user1 = %a, user2 = %b, "Friendship removed");
        }
        Ok(removed > 0)
    }

    /// Derives the relationship between `a` and `b` from `a`'s viewpoint.
    pub async fn friend_status(&self, a: Uuid, b: Uuid) -> RelationshipResult<FriendStatus> {
        if a == b {
            return Ok(FriendStatus::None);
        }

        Ok(match self.store.get_friendship_between(a, b).await? {
            None => FriendStatus::None,
            Some(edge) if edge.status == FriendshipStatus::Accepted => FriendStatus::Friends,
            Some(edge) if edge.user1_id == a => FriendStatus::PendingSent,
            Some(_) => FriendStatus::PendingReceived,
        })
    }

    /// Lists the ids of users with an accepted friendship with `user`.
    pub async fn friends_of(&self, user: Uuid) -> RelationshipResult<Vec<Uuid>> {
        let edges = self.store.list_friendships_of(user).await?;
        Ok(edges
            .into_iter()
            .filter(|f| f.status == FriendshipStatus::Accepted)
            .map(|f| f.partner_of(user))
            .collect())
    }

    /// Lists pending requests `user` has sent.
    pub async fn sent_requests_of(&self, user: Uuid) -> RelationshipResult<Vec<Friendship>> {
        let edges = self.store.list_friendships_of(user).await?;
        Ok(edges
            .into_iter()
            .filter(|f| f.status == FriendshipStatus::Pending && f.user1_id == user)
            .collect())
    }

    /// Lists pending requests addressed to `user`.
    pub async fn received_requests_of(&self, user: Uuid) -> RelationshipResult<Vec<Friendship>> {
        let edges = self.store.list_friendships_of(user).await?;
        Ok(edges
            .into_iter()
            .filter(|f| f.status == FriendshipStatus::Pending && f.user2_id == user)
            .collect())
    }
}
