//! Store trait definitions.

use async_trait::async_trait;
use entities::{
    Album, Artist, Friendship, ListeningHistory, Playlist, Profile, Song, User,
};
use uuid::Uuid;

use crate::StoreResult;

/// Trait for Resonate storage operations.
///
/// Uniqueness invariants the implementation must enforce:
/// - usernames are unique;
/// - profile emails, when present, are unique, and a user has at most one
///   profile;
/// - at most one friendship row per unordered user pair;
/// - at most one listening-history row per (user, song) pair.
#[async_trait]
pub trait MusicStore: Send + Sync {
    // =========================================================================
    // User operations
    // =========================================================================

    /// Creates a new user. Fails if the username is taken.
    async fn create_user(&self, user: User) -> StoreResult<User>;

    /// Gets a user by ID.
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Gets a user by exact username.
    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Lists users whose username contains `query` (case-insensitive).
    async fn search_users(&self, query: &str, limit: usize) -> StoreResult<Vec<User>>;

    /// Updates a user.
    async fn update_user(&self, user: User) -> StoreResult<User>;

    // =========================================================================
    // Profile operations
    // =========================================================================

    /// Creates a profile. Fails if the user already has one or the email
    /// is taken by another profile.
    async fn create_profile(&self, profile: Profile) -> StoreResult<Profile>;

    /// Gets the profile of a user.
    async fn get_profile(&self, user_id: Uuid) -> StoreResult<Option<Profile>>;

    /// Gets a profile by exact login email.
    async fn get_profile_by_email(&self, email: &str) -> StoreResult<Option<Profile>>;

    /// Updates a profile. Fails if the new email collides with another
    /// profile.
    async fn update_profile(&self, profile: Profile) -> StoreResult<Profile>;

    // =========================================================================
    // Friendship operations
    // =========================================================================

    /// Creates a friendship row. Fails if any row already connects the
    /// pair, in either ordering.
    async fn create_friendship(&self, friendship: Friendship) -> StoreResult<Friendship>;

    /// Gets the row connecting two users, probing both orderings.
    async fn get_friendship_between(&self, a: Uuid, b: Uuid) -> StoreResult<Option<Friendship>>;

    /// Updates a friendship row in place.
    async fn update_friendship(&self, friendship: Friendship) -> StoreResult<Friendship>;

    /// Deletes a friendship row by ID.
    async fn delete_friendship(&self, id: Uuid) -> StoreResult<()>;

    /// Deletes every row connecting the pair, both orderings. Returns the
    /// number of rows removed.
    async fn delete_friendships_between(&self, a: Uuid, b: Uuid) -> StoreResult<u32>;

    /// Lists every row touching a user, pending and accepted.
    async fn list_friendships_of(&self, user: Uuid) -> StoreResult<Vec<Friendship>>;

    // =========================================================================
    // Catalog operations
    // =========================================================================

    /// Adds an artist to the catalog.
    async fn create_artist(&self, artist: Artist) -> StoreResult<Artist>;

    /// Gets an artist by ID.
    async fn get_artist(&self, id: Uuid) -> StoreResult<Option<Artist>>;

    /// Lists all artists.
    async fn list_artists(&self) -> StoreResult<Vec<Artist>>;

    /// Lists artists whose name contains `query` (case-insensitive).
    async fn search_artists(&self, query: &str, limit: usize) -> StoreResult<Vec<Artist>>;

    /// Adds an album to the catalog.
    async fn create_album(&self, album: Album) -> StoreResult<Album>;

    /// Gets an album by ID.
    async fn get_album(&self, id: Uuid) -> StoreResult<Option<Album>>;

    /// Lists all albums.
    async fn list_albums(&self) -> StoreResult<Vec<Album>>;

    /// Lists albums whose title contains `query` (case-insensitive).
    async fn search_albums(&self, query: &str, limit: usize) -> StoreResult<Vec<Album>>;

    /// Adds a song to the catalog.
    async fn create_song(&self, song: Song) -> StoreResult<Song>;

    /// Gets a song by ID.
    async fn get_song(&self, id: Uuid) -> StoreResult<Option<Song>>;

    /// Lists all songs.
    async fn list_songs(&self) -> StoreResult<Vec<Song>>;

    /// Lists songs whose title contains `query` (case-insensitive).
    async fn search_songs(&self, query: &str, limit: usize) -> StoreResult<Vec<Song>>;

    /// Updates a song (lyrics, cover art, audio paths).
    async fn update_song(&self, song: Song) -> StoreResult<Song>;

    // =========================================================================
    // Like operations
    // =========================================================================

    /// Marks a song liked by a user. Returns false if it already was.
    async fn like_song(&self, user_id: Uuid, song_id: Uuid) -> StoreResult<bool>;

    /// Removes a like. Returns false if there was none.
    async fn unlike_song(&self, user_id: Uuid, song_id: Uuid) -> StoreResult<bool>;

    /// Lists the songs a user has liked.
    async fn list_liked_songs(&self, user_id: Uuid) -> StoreResult<Vec<Uuid>>;

    // =========================================================================
    // Playlist operations
    // =========================================================================

    /// Creates a playlist.
    async fn create_playlist(&self, playlist: Playlist) -> StoreResult<Playlist>;

    /// Gets a playlist by ID.
    async fn get_playlist(&self, id: Uuid) -> StoreResult<Option<Playlist>>;

    /// Lists playlists owned by a user.
    async fn list_playlists_of(&self, owner_id: Uuid) -> StoreResult<Vec<Playlist>>;

    /// Updates a playlist.
    async fn update_playlist(&self, playlist: Playlist) -> StoreResult<Playlist>;

    /// Deletes a playlist.
    async fn delete_playlist(&self, id: Uuid) -> StoreResult<()>;

    // =========================================================================
    // Listening history operations
    // =========================================================================

    /// Creates or updates the history row for (user, song). Returns the
    /// row and whether it was newly created.
    async fn upsert_history(
        &self,
        user_id: Uuid,
        song_id: Uuid,
        position: i64,
    ) -> StoreResult<(ListeningHistory, bool)>;

    /// Gets a history row by ID.
    async fn get_history(&self, id: Uuid) -> StoreResult<Option<ListeningHistory>>;

    /// Gets the history row for (user, song), if any.
    async fn find_history_by_song(
        &self,
        user_id: Uuid,
        song_id: Uuid,
    ) -> StoreResult<Option<ListeningHistory>>;

    /// Lists a user's history, most recently updated first.
    async fn list_history_of(&self, user_id: Uuid) -> StoreResult<Vec<ListeningHistory>>;

    /// Deletes a history row.
    async fn delete_history(&self, id: Uuid) -> StoreResult<()>;
}
