//! Music catalog entity definitions: artists, albums, songs, lyrics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recording artist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    /// Unique identifier.
    pub id: Uuid,
    /// Artist name.
    pub name: String,
    /// Biography text.
    pub bio: Option<String>,
    /// Relative media path of the artist picture.
    pub picture: Option<String>,
}

impl Artist {
    /// Creates a new artist.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            bio: None,
            picture: None,
        }
    }
}

/// An album, linked to one or more artists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    /// Unique identifier.
    pub id: Uuid,
    /// Album title.
    pub title: String,
    /// Contributing artists.
    pub artist_ids: Vec<Uuid>,
    /// Release date.
    pub release_date: Option<NaiveDate>,
    /// Relative media path of the cover art.
    pub cover_art: Option<String>,
}

impl Album {
    /// Creates a new album.
    pub fn new(title: impl Into<String>, artist_ids: Vec<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            artist_ids,
            release_date: None,
            cover_art: None,
        }
    }
}

/// A single timed lyric line.
///
/// Serialized with the wire field names the clients expect:
/// `{"startTime": 12.5, "text": "...", "duration": 3.2}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricLine {
    /// Offset from the start of the song, in seconds.
    pub start_time: f64,
    /// Line text.
    pub text: String,
    /// How long the line is displayed, in seconds.
    pub duration: f64,
}

/// A song in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    /// Unique identifier.
    pub id: Uuid,
    /// Song title.
    pub title: String,
    /// Contributing artists.
    pub artist_ids: Vec<Uuid>,
    /// Albums this song appears on.
    pub album_ids: Vec<Uuid>,
    /// Release date.
    pub release_date: Option<NaiveDate>,
    /// Duration in seconds.
    pub duration_secs: Option<u32>,
    /// Relative media path of the cover art.
    pub cover_art: Option<String>,
    /// Relative media path of the audio file.
    pub audio: Option<String>,
    /// Timed lyrics, when uploaded.
    pub lyrics: Option<Vec<LyricLine>>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Song {
    /// Creates a new song.
    pub fn new(title: impl Into<String>, artist_ids: Vec<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            artist_ids,
            album_ids: Vec::new(),
            release_date: None,
            duration_secs: None,
            cover_art: None,
            audio: None,
            lyrics: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds the song to an album.
    pub fn with_album(mut self, album_id: Uuid) -> Self {
        self.album_ids.push(album_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lyric_line_wire_format() {
        let line = LyricLine {
            start_time: 12.5,
            text: "hello".to_string(),
            duration: 3.0,
        };

        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["startTime"], 12.5);
        assert_eq!(json["text"], "hello");
        assert_eq!(json["duration"], 3.0);
    }

    #[test]
    fn test_song_builder() {
        let artist = Artist::new("The Fixtures");
        let album = Album::new("First Pressing", vec![artist.id]);
        let song = Song::new("Opening Track", vec![artist.id]).with_album(album.id);

        assert_eq!(song.artist_ids, vec![artist.id]);
        assert_eq!(song.album_ids, vec![album.id]);
        assert!(song.lyrics.is_none());
    }
}
