//! Spotify playback payload parsing

use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::error::Result;
use crate::track::PlaybackSnapshot;
use crate::types::Milliseconds;

/// Body of `GET /me/player`, reduced to the fields the poller reads
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackState {
    #[serde(default)]
    pub is_playing: bool,
    pub progress_ms: Option<i64>,
    pub item: Option<PlaybackItem>,
}

/// The track (or episode) loaded in the player
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackItem {
    /// Missing for local files
    pub id: Option<String>,
    pub uri: Option<String>,
    pub name: String,
    #[serde(default)]
    pub duration_ms: i64,
    #[serde(default)]
    pub artists: Vec<NamedObject>,
    pub album: Option<NamedObject>,
    /// Podcast episodes carry a show instead of an album
    pub show: Option<NamedObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedObject {
    pub name: String,
}

/// Turn a playback state into a snapshot; `None` if no item is loaded.
///
/// The first listed artist is used. Items without an id (local files) fall
/// back to their URI, then to `artist|title`.
#[must_use]
pub fn parse_playback(state: PlaybackState, polled_at: DateTime<Local>) -> Option<PlaybackSnapshot> {
    let item = state.item?;

    let artist = item
        .artists
        .into_iter()
        .next()
        .map(|a| a.name)
        .or_else(|| item.show.as_ref().map(|s| s.name.clone()))
        .unwrap_or_default();
    let album = item
        .album
        .or(item.show)
        .map(|a| a.name)
        .unwrap_or_default();
    let track_id = item
        .id
        .or(item.uri)
        .unwrap_or_else(|| format!("{artist}|{}", item.name));

    Some(PlaybackSnapshot {
        track_id,
        title: item.name,
        artist,
        album,
        duration: Milliseconds::new(item.duration_ms),
        progress: Milliseconds::new(state.progress_ms.unwrap_or(0)),
        is_playing: state.is_playing,
        polled_at,
    })
}

/// Parse a raw `GET /me/player` body
pub fn parse_playback_json(body: &str) -> Result<Option<PlaybackSnapshot>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let state: PlaybackState = serde_json::from_str(body)?;
    Ok(parse_playback(state, Local::now()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYING: &str = r#"{
        "is_playing": true,
        "progress_ms": 42000,
        "timestamp": 1700000000000,
        "currently_playing_type": "track",
        "item": {
            "id": "4uLU6hMCjMI75M1A2tKUQC",
            "uri": "spotify:track:4uLU6hMCjMI75M1A2tKUQC",
            "name": "Mogu Mogu",
            "duration_ms": 215000,
            "artists": [{"name": "First Artist"}, {"name": "Featured"}],
            "album": {"name": "Snacks", "album_type": "single"}
        }
    }"#;

    #[test]
    fn test_parse_playing_track() {
        let snapshot = parse_playback_json(PLAYING).unwrap().unwrap();
        assert_eq!(snapshot.track_id, "4uLU6hMCjMI75M1A2tKUQC");
        assert_eq!(snapshot.title, "Mogu Mogu");
        assert_eq!(snapshot.artist, "First Artist");
        assert_eq!(snapshot.album, "Snacks");
        assert_eq!(snapshot.duration, Milliseconds::new(215_000));
        assert_eq!(snapshot.progress, Milliseconds::new(42_000));
        assert!(snapshot.is_playing);
    }

    #[test]
    fn test_parse_without_item() {
        let body = r#"{"is_playing": false, "progress_ms": null, "item": null}"#;
        assert!(parse_playback_json(body).unwrap().is_none());
        assert!(parse_playback_json("").unwrap().is_none());
    }

    #[test]
    fn test_local_file_falls_back_to_uri() {
        let body = r#"{
            "is_playing": true,
            "progress_ms": 1000,
            "item": {
                "id": null,
                "uri": "spotify:local:Artist:Album:Song:180",
                "name": "Song",
                "duration_ms": 180000,
                "artists": [{"name": "Artist"}],
                "album": {"name": "Album"}
            }
        }"#;
        let snapshot = parse_playback_json(body).unwrap().unwrap();
        assert_eq!(snapshot.track_id, "spotify:local:Artist:Album:Song:180");
    }

    #[test]
    fn test_episode_uses_show_name() {
        let body = r#"{
            "is_playing": true,
            "progress_ms": 1000,
            "item": {"id": "ep1", "name": "Episode 1", "duration_ms": 3600000, "show": {"name": "The Show"}}
        }"#;
        let snapshot = parse_playback_json(body).unwrap().unwrap();
        assert_eq!(snapshot.artist, "The Show");
        assert_eq!(snapshot.album, "The Show");
    }

    #[test]
    fn test_malformed_body_is_an_error() {
        assert!(parse_playback_json("{not json").is_err());
    }
}
