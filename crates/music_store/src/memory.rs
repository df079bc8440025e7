//! In-memory store implementation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use entities::{
    Album, Artist, Friendship, ListeningHistory, Playlist, Profile, Song, User,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{MusicStore, StoreError, StoreResult};

/// In-memory implementation of [`MusicStore`].
///
/// Uniqueness constraints a relational schema would carry (username,
/// profile email, friendship pair, history pair) are checked explicitly
/// under the write lock, so check-then-act callers observe the same
/// conflict behavior they would against a database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    profiles: Arc<RwLock<HashMap<Uuid, Profile>>>,
    friendships: Arc<RwLock<HashMap<Uuid, Friendship>>>,
    artists: Arc<RwLock<HashMap<Uuid, Artist>>>,
    albums: Arc<RwLock<HashMap<Uuid, Album>>>,
    songs: Arc<RwLock<HashMap<Uuid, Song>>>,
    likes: Arc<RwLock<HashMap<Uuid, HashSet<Uuid>>>>,
    playlists: Arc<RwLock<HashMap<Uuid, Playlist>>>,
    history: Arc<RwLock<HashMap<Uuid, ListeningHistory>>>,
}

impl MemoryStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MusicStore for MemoryStore {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == user.username) {
            return Err(StoreError::already_exists("User", user.username.clone()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn search_users(&self, query: &str, limit: usize) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        let needle = query.to_lowercase();
        let mut result: Vec<User> = users
            .values()
            .filter(|u| u.username.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.username.cmp(&b.username));
        result.truncate(limit);
        Ok(result)
    }

    async fn update_user(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(StoreError::not_found("User", user.id.to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    // =========================================================================
    // Profile operations
    // =========================================================================

    async fn create_profile(&self, profile: Profile) -> StoreResult<Profile> {
        let mut profiles = self.profiles.write().await;
        if profiles.values().any(|p| p.user_id == profile.user_id) {
            return Err(StoreError::already_exists(
                "Profile",
                profile.user_id.to_string(),
            ));
        }
        if let Some(email) = &profile.email {
            if profiles.values().any(|p| p.email.as_ref() == Some(email)) {
                return Err(StoreError::already_exists("Profile", email.clone()));
            }
        }
        profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn get_profile(&self, user_id: Uuid) -> StoreResult<Option<Profile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.values().find(|p| p.user_id == user_id).cloned())
    }

    async fn get_profile_by_email(&self, email: &str) -> StoreResult<Option<Profile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles
            .values()
            .find(|p| p.email.as_deref() == Some(email))
            .cloned())
    }

    async fn update_profile(&self, profile: Profile) -> StoreResult<Profile> {
        let mut profiles = self.profiles.write().await;
        if !profiles.contains_key(&profile.id) {
            return Err(StoreError::not_found("Profile", profile.id.to_string()));
        }
        if let Some(email) = &profile.email {
            if profiles
                .values()
                .any(|p| p.id != profile.id && p.email.as_ref() == Some(email))
            {
                return Err(StoreError::already_exists("Profile", email.clone()));
            }
        }
        profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    // =========================================================================
    // Friendship operations
    // =========================================================================

    async fn create_friendship(&self, friendship: Friendship) -> StoreResult<Friendship> {
        let mut friendships = self.friendships.write().await;
        // Pair uniqueness covers both orderings, like a unique constraint
        // over the canonicalized pair.
        if friendships
            .values()
            .any(|f| f.connects(friendship.user1_id, friendship.user2_id))
        {
            return Err(StoreError::already_exists(
                "Friendship",
                format!("{}/{}", friendship.user1_id, friendship.user2_id),
            ));
        }
        friendships.insert(friendship.id, friendship.clone());
        Ok(friendship)
    }

    async fn get_friendship_between(&self, a: Uuid, b: Uuid) -> StoreResult<Option<Friendship>> {
        let friendships = self.friendships.read().await;
        Ok(friendships.values().find(|f| f.connects(a, b)).cloned())
    }

    async fn update_friendship(&self, friendship: Friendship) -> StoreResult<Friendship> {
        let mut friendships = self.friendships.write().await;
        if !friendships.contains_key(&friendship.id) {
            return Err(StoreError::not_found(
                "Friendship",
                friendship.id.to_string(),
            ));
        }
        if friendships
            .values()
            .any(|f| f.id != friendship.id && f.connects(friendship.user1_id, friendship.user2_id))
        {
            return Err(StoreError::already_exists(
                "Friendship",
                format!("{}/{}", friendship.user1_id, friendship.user2_id),
            ));
        }
        friendships.insert(friendship.id, friendship.clone());
        Ok(friendship)
    }

    async fn delete_friendship(&self, id: Uuid) -> StoreResult<()> {
        let mut friendships = self.friendships.write().await;
        if friendships.remove(&id).is_none() {
            return Err(StoreError::not_found("Friendship", id.to_string()));
        }
        Ok(())
    }

    async fn delete_friendships_between(&self, a: Uuid, b: Uuid) -> StoreResult<u32> {
        let mut friendships = self.friendships.write().await;
        let before = friendships.len();
        friendships.retain(|_, f| !f.connects(a, b));
        Ok((before - friendships.len()) as u32)
    }

    async fn list_friendships_of(&self, user: Uuid) -> StoreResult<Vec<Friendship>> {
        let friendships = self.friendships.read().await;
        let mut result: Vec<Friendship> = friendships
            .values()
            .filter(|f| f.involves(user))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }

    // =========================================================================
    // Catalog operations
    // =========================================================================

    async fn create_artist(&self, artist: Artist) -> StoreResult<Artist> {
        let mut artists = self.artists.write().await;
        artists.insert(artist.id, artist.clone());
        Ok(artist)
    }

    async fn get_artist(&self, id: Uuid) -> StoreResult<Option<Artist>> {
        let artists = self.artists.read().await;
        Ok(artists.get(&id).cloned())
    }

    async fn list_artists(&self) -> StoreResult<Vec<Artist>> {
        let artists = self.artists.read().await;
        let mut result: Vec<Artist> = artists.values().cloned().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn search_artists(&self, query: &str, limit: usize) -> StoreResult<Vec<Artist>> {
        let artists = self.artists.read().await;
        let needle = query.to_lowercase();
        let mut result: Vec<Artist> = artists
            .values()
            .filter(|a| a.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        result.truncate(limit);
        Ok(result)
    }

    async fn create_album(&self, album: Album) -> StoreResult<Album> {
        let mut albums = self.albums.write().await;
        albums.insert(album.id, album.clone());
        Ok(album)
    }

    async fn get_album(&self, id: Uuid) -> StoreResult<Option<Album>> {
        let albums = self.albums.read().await;
        Ok(albums.get(&id).cloned())
    }

    async fn list_albums(&self) -> StoreResult<Vec<Album>> {
        let albums = self.albums.read().await;
        let mut result: Vec<Album> = albums.values().cloned().collect();
        result.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(result)
    }

    async fn search_albums(&self, query: &str, limit: usize) -> StoreResult<Vec<Album>> {
        let albums = self.albums.read().await;
        let needle = query.to_lowercase();
        let mut result: Vec<Album> = albums
            .values()
            .filter(|a| a.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.title.cmp(&b.title));
        result.truncate(limit);
        Ok(result)
    }

    async fn create_song(&self, song: Song) -> StoreResult<Song> {
        let mut songs = self.songs.write().await;
        songs.insert(song.id, song.clone());
        Ok(song)
    }

    async fn get_song(&self, id: Uuid) -> StoreResult<Option<Song>> {
        let songs = self.songs.read().await;
        Ok(songs.get(&id).cloned())
    }

    async fn list_songs(&self) -> StoreResult<Vec<Song>> {
        let songs = self.songs.read().await;
        let mut result: Vec<Song> = songs.values().cloned().collect();
        result.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(result)
    }

    async fn search_songs(&self, query: &str, limit: usize) -> StoreResult<Vec<Song>> {
        let songs = self.songs.read().await;
        let needle = query.to_lowercase();
        let mut result: Vec<Song> = songs
            .values()
            .filter(|s| s.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.title.cmp(&b.title));
        result.truncate(limit);
        Ok(result)
    }

    async fn update_song(&self, song: Song) -> StoreResult<Song> {
        let mut songs = self.songs.write().await;
        if !songs.contains_key(&song.id) {
            return Err(StoreError::not_found("Song", song.id.to_string()));
        }
        songs.insert(song.id, song.clone());
        Ok(song)
    }

    // =========================================================================
    // Like operations
    // =========================================================================

    async fn like_song(&self, user_id: Uuid, song_id: Uuid) -> StoreResult<bool> {
        let mut likes = self.likes.write().await;
        Ok(likes.entry(user_id).or_default().insert(song_id))
    }

    async fn unlike_song(&self, user_id: Uuid, song_id: Uuid) -> StoreResult<bool> {
        let mut likes = self.likes.write().await;
        Ok(likes
            .get_mut(&user_id)
            .is_some_and(|songs| songs.remove(&song_id)))
    }

    async fn list_liked_songs(&self, user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let likes = self.likes.read().await;
        Ok(likes
            .get(&user_id)
            .map(|songs| songs.iter().copied().collect())
            .unwrap_or_default())
    }

    // =========================================================================
    // Playlist operations
    // =========================================================================

    async fn create_playlist(&self, playlist: Playlist) -> StoreResult<Playlist> {
        let mut playlists = self.playlists.write().await;
        playlists.insert(playlist.id, playlist.clone());
        Ok(playlist)
    }

    async fn get_playlist(&self, id: Uuid) -> StoreResult<Option<Playlist>> {
        let playlists = self.playlists.read().await;
        Ok(playlists.get(&id).cloned())
    }

    async fn list_playlists_of(&self, owner_id: Uuid) -> StoreResult<Vec<Playlist>> {
        let playlists = self.playlists.read().await;
        let mut result: Vec<Playlist> = playlists
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }

    async fn update_playlist(&self, playlist: Playlist) -> StoreResult<Playlist> {
        let mut playlists = self.playlists.write().await;
        if !playlists.contains_key(&playlist.id) {
            return Err(StoreError::not_found("Playlist", playlist.id.to_string()));
        }
        playlists.insert(playlist.id, playlist.clone());
        Ok(playlist)
    }

    async fn delete_playlist(&self, id: Uuid) -> StoreResult<()> {
        let mut playlists = self.playlists.write().await;
        if playlists.remove(&id).is_none() {
            return Err(StoreError::not_found("Playlist", id.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Listening history operations
    // =========================================================================

    async fn upsert_history(
        &self,
        user_id: Uuid,
        song_id: Uuid,
        position: i64,
    ) -> StoreResult<(ListeningHistory, bool)> {
        let mut history = self.history.write().await;
        if let Some(entry) = history
            .values_mut()
            .find(|h| h.user_id == user_id && h.song_id == song_id)
        {
            entry.position = position;
            entry.updated_at = Utc::now();
            return Ok((entry.clone(), false));
        }
        let entry = ListeningHistory::new(user_id, song_id, position);
        history.insert(entry.id, entry.clone());
        Ok((entry, true))
    }

    async fn get_history(&self, id: Uuid) -> StoreResult<Option<ListeningHistory>> {
        let history = self.history.read().await;
        Ok(history.get(&id).cloned())
    }

    async fn find_history_by_song(
        &self,
        user_id: Uuid,
        song_id: Uuid,
    ) -> StoreResult<Option<ListeningHistory>> {
        let history = self.history.read().await;
        Ok(history
            .values()
            .find(|h| h.user_id == user_id && h.song_id == song_id)
            .cloned())
    }

    async fn list_history_of(&self, user_id: Uuid) -> StoreResult<Vec<ListeningHistory>> {
        let history = self.history.read().await;
        let mut result: Vec<ListeningHistory> = history
            .values()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(result)
    }

    async fn delete_history(&self, id: Uuid) -> StoreResult<()> {
        let mut history = self.history.write().await;
        if history.remove(&id).is_none() {
            return Err(StoreError::not_found("ListeningHistory", id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_username_uniqueness() {
        let store = MemoryStore::new();
        store
            .create_user(User::new("alice", "hash-a"))
            .await
            .unwrap();

        let result = store.create_user(User::new("alice", "hash-b")).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_profile_email_uniqueness() {
        let store = MemoryStore::new();
        let alice = store
            .create_user(User::new("alice", "hash"))
            .await
            .unwrap();
        let bob = store.create_user(User::new("bob", "hash")).await.unwrap();

        store
            .create_profile(Profile::new(alice.id).with_email("shared@example.com"))
            .await
            .unwrap();

        let result = store
            .create_profile(Profile::new(bob.id).with_email("shared@example.com"))
            .await;
        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));

        // A second profile for the same user is rejected even without email.
        let result = store.create_profile(Profile::new(alice.id)).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_friendship_pair_uniqueness_both_orderings() {
        let store = MemoryStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        store
            .create_friendship(Friendship::pending(a, b))
            .await
            .unwrap();

        // Reverse ordering still collides with the stored pair.
        let result = store.create_friendship(Friendship::pending(b, a)).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));

        let found = store.get_friendship_between(b, a).await.unwrap();
        assert!(found.is_some());

        let removed = store.delete_friendships_between(b, a).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.get_friendship_between(a, b).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_upsert() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let song = Uuid::new_v4();

        let (first, created) = store.upsert_history(user, song, 10).await.unwrap();
        assert!(created);
        assert_eq!(first.position, 10);

        let (second, created) = store.upsert_history(user, song, 95).await.unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.position, 95);

        let entries = store.list_history_of(user).await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_likes_roundtrip() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let song = Uuid::new_v4();

        assert!(store.like_song(user, song).await.unwrap());
        assert!(!store.like_song(user, song).await.unwrap());
        assert_eq!(store.list_liked_songs(user).await.unwrap(), vec![song]);
        assert!(store.unlike_song(user, song).await.unwrap());
        assert!(!store.unlike_song(user, song).await.unwrap());
    }

    #[tokio::test]
    async fn test_user_search_case_insensitive() {
        let store = MemoryStore::new();
        store
            .create_user(User::new("Alice", "hash"))
            .await
            .unwrap();
        store
            .create_user(User::new("alicia", "hash"))
            .await
            .unwrap();
        store.create_user(User::new("bob", "hash")).await.unwrap();

        let found = store.search_users("ali", 10).await.unwrap();
        assert_eq!(found.len(), 2);

        let limited = store.search_users("ali", 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }
}
