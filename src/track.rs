//! Playback snapshots and play detection

use std::fmt;

use chrono::{DateTime, Local};
use tracing::debug;

use crate::db::NewPlay;
use crate::types::Milliseconds;

/// Progress a track must pass before it counts as a play (15 seconds).
pub const DEFAULT_MIN_PROGRESS: Milliseconds = Milliseconds(15_000);

/// What the streaming service reported on one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub track_id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: Milliseconds,
    pub progress: Milliseconds,
    pub is_playing: bool,
    pub polled_at: DateTime<Local>,
}

impl PlaybackSnapshot {
    /// The play to record for this snapshot
    #[must_use]
    pub fn to_new_play(&self) -> NewPlay {
        NewPlay::new(
            self.title.clone(),
            self.artist.clone(),
            self.album.clone(),
            self.duration.to_seconds(),
        )
    }
}

/// Latest view of the player, shared with query handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NowPlaying {
    #[default]
    Nothing,
    Playing {
        title: String,
        artist: String,
        progress: Milliseconds,
        duration: Milliseconds,
    },
}

impl From<&PlaybackSnapshot> for NowPlaying {
    fn from(snapshot: &PlaybackSnapshot) -> Self {
        if snapshot.is_playing {
            Self::Playing {
                title: snapshot.title.clone(),
                artist: snapshot.artist.clone(),
                progress: snapshot.progress,
                duration: snapshot.duration,
            }
        } else {
            Self::Nothing
        }
    }
}

impl fmt::Display for NowPlaying {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nothing => write!(f, "Nothing is currently playing."),
            Self::Playing {
                title,
                artist,
                duration,
                ..
            } if duration.is_zero() => write!(f, "{title} by {artist}"),
            Self::Playing {
                title,
                artist,
                progress,
                duration,
            } => write!(
                f,
                "Currently playing **{title} by {artist}** {progress}/{duration}"
            ),
        }
    }
}

/// The special track started playing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialTrackHit {
    pub title: String,
    pub artist: String,
    /// How many times it has been announced by this process, starting at 1
    pub count: u64,
}

/// What a poll should trigger. Both fields may be set on the same poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// A new play to record
    pub play: Option<NewPlay>,
    /// The special track was just entered
    pub special: Option<SpecialTrackHit>,
}

impl PollOutcome {
    /// Nothing to do for this poll
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.play.is_none() && self.special.is_none()
    }
}

/// Decides which polls are new plays.
///
/// A snapshot counts once its progress passes the threshold, and each track
/// id is recorded at most once until a different track (or silence) is seen.
/// Owned by the polling task; not shared.
#[derive(Debug, Clone)]
pub struct PollDetector {
    min_progress: Milliseconds,
    special_track_id: Option<String>,
    last_recorded_id: Option<String>,
    in_special_track: bool,
    special_count: u64,
    now_playing: NowPlaying,
}

impl Default for PollDetector {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PROGRESS, None)
    }
}

impl PollDetector {
    /// Create a detector with a progress threshold and an optional special track id
    #[must_use]
    pub const fn new(min_progress: Milliseconds, special_track_id: Option<String>) -> Self {
        Self {
            min_progress,
            special_track_id,
            last_recorded_id: None,
            in_special_track: false,
            special_count: 0,
            now_playing: NowPlaying::Nothing,
        }
    }

    /// Feed one poll result and get back what it triggers.
    ///
    /// `None` or a paused snapshot resets to the not-playing baseline.
    pub fn observe(&mut self, snapshot: Option<&PlaybackSnapshot>) -> PollOutcome {
        let Some(snapshot) = snapshot.filter(|s| s.is_playing) else {
            self.reset();
            return PollOutcome::default();
        };

        self.now_playing = NowPlaying::from(snapshot);

        let is_special = self.special_track_id.as_deref() == Some(snapshot.track_id.as_str());
        if !is_special {
            self.in_special_track = false;
        }

        if snapshot.progress <= self.min_progress {
            debug!(
                "{} - {} at {}, below threshold",
                snapshot.artist, snapshot.title, snapshot.progress
            );
            return PollOutcome::default();
        }

        let play = if self.last_recorded_id.as_deref() == Some(snapshot.track_id.as_str()) {
            None
        } else {
            self.last_recorded_id = Some(snapshot.track_id.clone());
            Some(snapshot.to_new_play())
        };

        let special = if is_special && !self.in_special_track {
            self.in_special_track = true;
            self.special_count += 1;
            Some(SpecialTrackHit {
                title: snapshot.title.clone(),
                artist: snapshot.artist.clone(),
                count: self.special_count,
            })
        } else {
            None
        };

        PollOutcome { play, special }
    }

    /// Forget the current track
    pub fn reset(&mut self) {
        self.last_recorded_id = None;
        self.in_special_track = false;
        self.now_playing = NowPlaying::Nothing;
    }

    /// Latest player view
    #[must_use]
    pub const fn now_playing(&self) -> &NowPlaying {
        &self.now_playing
    }

    /// Track id of the last recorded play, if still playing
    #[must_use]
    pub fn last_recorded_id(&self) -> Option<&str> {
        self.last_recorded_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Seconds;

    fn snapshot(id: &str, progress_ms: i64) -> PlaybackSnapshot {
        PlaybackSnapshot {
            track_id: id.to_string(),
            title: format!("Title {id}"),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            duration: Milliseconds::new(200_500),
            progress: Milliseconds::new(progress_ms),
            is_playing: true,
            polled_at: Local::now(),
        }
    }

    fn special_detector() -> PollDetector {
        PollDetector::new(DEFAULT_MIN_PROGRESS, Some("mogu".to_string()))
    }

    #[test]
    fn test_below_threshold_never_records() {
        let mut detector = PollDetector::default();
        assert!(detector.observe(Some(&snapshot("a", 5_000))).is_noop());
        assert!(detector.observe(Some(&snapshot("b", 5_000))).is_noop());
        assert!(detector.observe(Some(&snapshot("c", 15_000))).is_noop());
    }

    #[test]
    fn test_new_track_past_threshold_records_once() {
        let mut detector = PollDetector::default();

        let outcome = detector.observe(Some(&snapshot("a", 20_000)));
        let play = outcome.play.expect("should record");
        assert_eq!(play.title, "Title a");
        assert_eq!(play.duration, Seconds::new(200));

        assert!(detector.observe(Some(&snapshot("a", 30_000))).is_noop());
        assert!(detector.observe(Some(&snapshot("a", 40_000))).is_noop());
        assert_eq!(detector.last_recorded_id(), Some("a"));
    }

    #[test]
    fn test_restart_of_same_track_is_not_recounted() {
        let mut detector = PollDetector::default();
        assert!(detector.observe(Some(&snapshot("a", 20_000))).play.is_some());
        // Restarted from the top, then past the threshold again
        assert!(detector.observe(Some(&snapshot("a", 1_000))).is_noop());
        assert!(detector.observe(Some(&snapshot("a", 16_000))).is_noop());
    }

    #[test]
    fn test_track_change_records_again() {
        let mut detector = PollDetector::default();
        assert!(detector.observe(Some(&snapshot("a", 20_000))).play.is_some());
        assert!(detector.observe(Some(&snapshot("b", 20_000))).play.is_some());
        assert!(detector.observe(Some(&snapshot("a", 20_000))).play.is_some());
    }

    #[test]
    fn test_stop_resets_state() {
        let mut detector = PollDetector::default();
        assert!(detector.observe(Some(&snapshot("a", 20_000))).play.is_some());

        assert!(detector.observe(None).is_noop());
        assert_eq!(detector.last_recorded_id(), None);
        assert_eq!(detector.now_playing(), &NowPlaying::Nothing);

        assert!(detector.observe(Some(&snapshot("a", 20_000))).play.is_some());
    }

    #[test]
    fn test_paused_snapshot_counts_as_stopped() {
        let mut detector = PollDetector::default();
        detector.observe(Some(&snapshot("a", 20_000)));

        let mut paused = snapshot("a", 25_000);
        paused.is_playing = false;
        assert!(detector.observe(Some(&paused)).is_noop());
        assert_eq!(detector.last_recorded_id(), None);
    }

    #[test]
    fn test_special_track_fires_once_per_visit() {
        let mut detector = special_detector();

        let first = detector.observe(Some(&snapshot("mogu", 20_000)));
        assert!(first.play.is_some());
        assert_eq!(first.special.as_ref().map(|h| h.count), Some(1));

        assert!(detector.observe(Some(&snapshot("mogu", 30_000))).special.is_none());
        assert!(detector.observe(Some(&snapshot("mogu", 40_000))).special.is_none());
    }

    #[test]
    fn test_special_track_refires_after_other_track() {
        let mut detector = special_detector();
        detector.observe(Some(&snapshot("mogu", 20_000)));
        detector.observe(Some(&snapshot("other", 5_000)));

        let again = detector.observe(Some(&snapshot("mogu", 20_000)));
        assert_eq!(again.special.map(|h| h.count), Some(2));
    }

    #[test]
    fn test_special_track_waits_for_threshold() {
        let mut detector = special_detector();
        assert!(detector.observe(Some(&snapshot("mogu", 3_000))).is_noop());
        assert!(detector.observe(Some(&snapshot("mogu", 16_000))).special.is_some());
    }

    #[test]
    fn test_special_counter_survives_stop() {
        let mut detector = special_detector();
        detector.observe(Some(&snapshot("mogu", 20_000)));
        detector.observe(None);
        let hit = detector.observe(Some(&snapshot("mogu", 20_000))).special;
        assert_eq!(hit.map(|h| h.count), Some(2));
    }

    #[test]
    fn test_now_playing_display() {
        let mut detector = PollDetector::default();
        detector.observe(Some(&snapshot("a", 83_000)));
        assert_eq!(
            detector.now_playing().to_string(),
            "Currently playing **Title a by Artist** 01:23/03:20"
        );

        assert_eq!(NowPlaying::Nothing.to_string(), "Nothing is currently playing.");

        let mut unknown_length = snapshot("b", 1_000);
        unknown_length.duration = Milliseconds::new(0);
        assert_eq!(NowPlaying::from(&unknown_length).to_string(), "Title b by Artist");
    }
}
