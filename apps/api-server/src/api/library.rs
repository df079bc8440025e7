//! Catalog browsing, search, likes and lyrics.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::{NaiveDate, Utc};
use entities::{Artist, LyricLine, Song};
use music_store::MusicStore;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

/// Default number of hits per category in a catalog search.
const DEFAULT_SEARCH_RESULTS: usize = 5;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub max_results: Option<usize>,
}

/// Song with its artist and album references expanded.
#[derive(Debug, Serialize)]
pub struct SongResponse {
    pub id: Uuid,
    pub title: String,
    pub artists: Vec<Artist>,
    pub albums: Vec<AlbumBrief>,
    pub release_date: Option<NaiveDate>,
    pub duration_secs: Option<u32>,
    pub cover_art: Option<String>,
    pub audio: Option<String>,
    pub lyrics: Option<Vec<LyricLine>>,
}

/// Album reference embedded in a song.
#[derive(Debug, Serialize)]
pub struct AlbumBrief {
    pub id: Uuid,
    pub title: String,
    pub cover_art: Option<String>,
}

/// Album with its artists and track list expanded.
#[derive(Debug, Serialize)]
pub struct AlbumResponse {
    pub id: Uuid,
    pub title: String,
    pub artists: Vec<Artist>,
    pub songs: Vec<TrackBrief>,
    pub release_date: Option<NaiveDate>,
    pub cover_art: Option<String>,
}

/// Song reference embedded in an album.
#[derive(Debug, Serialize)]
pub struct TrackBrief {
    pub id: Uuid,
    pub title: String,
    pub duration_secs: Option<u32>,
}

/// Lists all songs.
pub async fn list_songs<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<Vec<SongResponse>>> {
    let songs = state.store.list_songs().await?;
    let mut responses = Vec::with_capacity(songs.len());
    for song in songs {
        responses.push(song_response(&state.store, song).await?);
    }
    Ok(Json(responses))
}

/// Returns a single song.
pub async fn get_song<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<SongResponse>> {
    let song = require_song(&state, id).await?;
    Ok(Json(song_response(&state.store, song).await?))
}

/// Lists all artists.
pub async fn list_artists<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<Vec<Artist>>> {
    Ok(Json(state.store.list_artists().await?))
}

/// Returns a single artist.
pub async fn get_artist<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<Artist>> {
    state
        .store
        .get_artist(id)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound("Artist not found".to_string()))
}

/// Lists all albums.
pub async fn list_albums<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
) -> ServerResult<Json<Vec<AlbumResponse>>> {
    let albums = state.store.list_albums().await?;
    let mut responses = Vec::with_capacity(albums.len());
    for album in albums {
        responses.push(album_response(&state.store, album).await?);
    }
    Ok(Json(responses))
}

/// Returns a single album.
pub async fn get_album<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<AlbumResponse>> {
    let album = state
        .store
        .get_album(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Album not found".to_string()))?;
    Ok(Json(album_response(&state.store, album).await?))
}

/// Searches songs, artists and albums by name.
pub async fn search<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<SearchParams>,
) -> ServerResult<Json<Value>> {
    let query = params.query.as_deref().unwrap_or("").trim().to_string();
    if query.is_empty() {
        return Err(ServerError::InvalidRequest(
            "Query parameter is required".to_string(),
        ));
    }
    let limit = params.max_results.unwrap_or(DEFAULT_SEARCH_RESULTS);

    let mut songs = Vec::new();
    for song in state.store.search_songs(&query, limit).await? {
        songs.push(song_response(&state.store, song).await?);
    }
    let artists = state.store.search_artists(&query, limit).await?;
    let mut albums = Vec::new();
    for album in state.store.search_albums(&query, limit).await? {
        albums.push(album_response(&state.store, album).await?);
    }

    Ok(Json(json!({
        "songs": songs,
        "artists": artists,
        "albums": albums,
    })))
}

/// Lists the caller's liked songs.
pub async fn list_liked_songs<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<Vec<SongResponse>>> {
    let mut responses = Vec::new();
    for song_id in state.store.list_liked_songs(user.id).await? {
        if let Some(song) = state.store.get_song(song_id).await? {
            responses.push(song_response(&state.store, song).await?);
        }
    }
    Ok(Json(responses))
}

/// Likes a song.
pub async fn like_song<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<Value>> {
    require_song(&state, id).await?;
    let message = if state.store.like_song(user.id, id).await? {
        "Song liked"
    } else {
        "Song already liked"
    };
    Ok(Json(json!({ "message": message })))
}

/// Removes a like.
pub async fn unlike_song<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<Value>> {
    require_song(&state, id).await?;
    if state.store.unlike_song(user.id, id).await? {
        Ok(Json(json!({ "message": "Song unliked" })))
    } else {
        Err(ServerError::NotFound("Like not found".to_string()))
    }
}

/// Replaces a song's synchronized lyrics.
///
/// The payload is validated by hand so any malformed entry rejects the
/// whole upload and leaves the stored lyrics untouched.
pub async fn upload_lyrics<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> ServerResult<Json<Value>> {
    let mut song = require_song(&state, id).await?;
    let lines = parse_lyric_lines(&payload)?;

    song.lyrics = Some(lines);
    song.updated_at = Utc::now();
    state.store.update_song(song).await?;

    Ok(Json(json!({ "message": "Lyrics updated" })))
}

/// Deletes a song's lyrics.
pub async fn delete_lyrics<S: MusicStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<Value>> {
    let mut song = require_song(&state, id).await?;
    if song.lyrics.take().is_none() {
        return Err(ServerError::NotFound("Lyrics not found".to_string()));
    }
    song.updated_at = Utc::now();
    state.store.update_song(song).await?;

    Ok(Json(json!({ "message": "Lyrics deleted" })))
}

async fn require_song<S: MusicStore>(state: &AppState<S>, id: Uuid) -> ServerResult<Song> {
    state
        .store
        .get_song(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Song not found".to_string()))
}

async fn song_response<S: MusicStore>(store: &S, song: Song) -> ServerResult<SongResponse> {
    let mut artists = Vec::new();
    for artist_id in &song.artist_ids {
        if let Some(artist) = store.get_artist(*artist_id).await? {
            artists.push(artist);
        }
    }
    let mut albums = Vec::new();
    for album_id in &song.album_ids {
        if let Some(album) = store.get_album(*album_id).await? {
            albums.push(AlbumBrief {
                id: album.id,
                title: album.title,
                cover_art: album.cover_art,
            });
        }
    }

    Ok(SongResponse {
        id: song.id,
        title: song.title,
        artists,
        albums,
        release_date: song.release_date,
        duration_secs: song.duration_secs,
        cover_art: song.cover_art,
        audio: song.audio,
        lyrics: song.lyrics,
    })
}

async fn album_response<S: MusicStore>(
    store: &S,
    album: entities::Album,
) -> ServerResult<AlbumResponse> {
    let mut artists = Vec::new();
    for artist_id in &album.artist_ids {
        if let Some(artist) = store.get_artist(*artist_id).await? {
            artists.push(artist);
        }
    }
    let songs = store
        .list_songs()
        .await?
        .into_iter()
        .filter(|song| song.album_ids.contains(&album.id))
        .map(|song| TrackBrief {
            id: song.id,
            title: song.title,
            duration_secs: song.duration_secs,
        })
        .collect();

    Ok(AlbumResponse {
        id: album.id,
        title: album.title,
        artists,
        songs,
        release_date: album.release_date,
        cover_art: album.cover_art,
    })
}

/// Parses a lyrics payload: a JSON array of objects with a numeric
/// `startTime`, a string `text` and a numeric `duration`.
fn parse_lyric_lines(payload: &Value) -> ServerResult<Vec<LyricLine>> {
    let invalid =
        || ServerError::InvalidRequest("Invalid lyrics data format".to_string());

    let entries = payload.as_array().ok_or_else(invalid)?;
    entries
        .iter()
        .map(|entry| {
            let object = entry.as_object().ok_or_else(invalid)?;
            let start_time = object
                .get("startTime")
                .and_then(Value::as_f64)
                .ok_or_else(invalid)?;
            let text = object.get("text").and_then(Value::as_str).ok_or_else(invalid)?;
            let duration = object
                .get("duration")
                .and_then(Value::as_f64)
                .ok_or_else(invalid)?;
            Ok(LyricLine {
                start_time,
                text: text.to_string(),
                duration,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lyric_lines_valid() {
        let payload = json!([
            { "startTime": 0.0, "text": "first line", "duration": 2.5 },
            { "startTime": 2.5, "text": "second line", "duration": 3 },
        ]);

        let lines = parse_lyric_lines(&payload).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "first line");
        assert_eq!(lines[1].start_time, 2.5);
        assert_eq!(lines[1].duration, 3.0);
    }

    #[test]
    fn test_parse_lyric_lines_rejects_non_array() {
        let payload = json!({ "startTime": 0.0, "text": "x", "duration": 1.0 });
        assert!(parse_lyric_lines(&payload).is_err());
    }

    #[test]
    fn test_parse_lyric_lines_rejects_missing_field() {
        let payload = json!([{ "startTime": 0.0, "duration": 1.0 }]);
        assert!(parse_lyric_lines(&payload).is_err());
    }

    #[test]
    fn test_parse_lyric_lines_rejects_wrong_type() {
        let payload = json!([{ "startTime": "zero", "text": "x", "duration": 1.0 }]);
        assert!(parse_lyric_lines(&payload).is_err());
    }
}
