//! Spotify Web API access
//!
//! The poller only needs "what is playing right now", so the service is
//! reached through the [`PlaybackSource`] trait and can be swapped for a
//! scripted source in tests.

mod client;
mod metadata;

pub use client::SpotifyClient;
pub use metadata::{parse_playback, parse_playback_json, PlaybackState};

use async_trait::async_trait;

use crate::error::Result;
use crate::track::PlaybackSnapshot;

/// Endpoint for the user's current playback state, relative to the API root
pub const PLAYER_PATH: &str = "/me/player";

/// Anything that can report the listener's current playback
#[async_trait]
pub trait PlaybackSource: Send + Sync {
    /// Current playback, or `None` when nothing is loaded in the player
    async fn current_playback(&self) -> Result<Option<PlaybackSnapshot>>;
}
