//! Playback polling loop
//!
//! Polls the streaming service on a fixed interval, runs each snapshot
//! through the [`PollDetector`] and records qualifying plays. The latest
//! [`NowPlaying`] value is published on a watch channel for query handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex, Notify};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::TrackingConfig;
use crate::db::{Database, NewPlay};
use crate::display::special_track_message;
use crate::error::Result;
use crate::notify::{deliver, MessageSink};
use crate::spotify::PlaybackSource;
use crate::track::{NowPlaying, PollDetector, PollOutcome, SpecialTrackHit};
use crate::types::Milliseconds;

/// Playback poller
pub struct PlayMonitor {
    source: Arc<dyn PlaybackSource>,
    db: Database,
    sink: Arc<dyn MessageSink>,
    poll_interval: Duration,
    special_track_message: String,
    max_message_length: usize,
    /// Only ever locked by the polling task
    detector: Mutex<PollDetector>,
    now_playing: watch::Sender<NowPlaying>,
    running: Arc<AtomicBool>,
    shutdown: Notify,
}

impl PlayMonitor {
    /// Create a monitor from tracking settings
    pub fn new(
        tracking: &TrackingConfig,
        max_message_length: usize,
        source: Arc<dyn PlaybackSource>,
        db: Database,
        sink: Arc<dyn MessageSink>,
    ) -> Result<Self> {
        let detector = PollDetector::new(
            Milliseconds::new(tracking.min_progress_ms),
            tracking.special_track_id.clone(),
        );
        let (now_playing, _) = watch::channel(NowPlaying::Nothing);

        Ok(Self {
            source,
            db,
            sink,
            poll_interval: tracking.poll_interval()?,
            special_track_message: tracking.special_track_message.clone(),
            max_message_length,
            detector: Mutex::new(detector),
            now_playing,
            running: Arc::new(AtomicBool::new(true)),
            shutdown: Notify::new(),
        })
    }

    /// Subscribe to now-playing updates
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NowPlaying> {
        self.now_playing.subscribe()
    }

    /// Latest now-playing value
    #[must_use]
    pub fn now_playing(&self) -> NowPlaying {
        self.now_playing.borrow().clone()
    }

    /// Poll until [`stop`](Self::stop) is called
    pub async fn run(&self) -> Result<()> {
        info!(
            "Polling playback every {}",
            humantime::format_duration(self.poll_interval)
        );

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.running.load(Ordering::SeqCst) {
            tokio::select! {
                _ = interval.tick() => {
                    self.poll_once().await;
                }
                () = self.shutdown.notified() => {}
            }
        }

        info!("Play monitor stopped");
        Ok(())
    }

    /// Stop the monitor.
    ///
    /// This method is synchronous as it only sets an atomic flag.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.notify_one();
    }

    /// Run one poll cycle.
    ///
    /// A failed poll leaves the detector untouched; the next poll picks up
    /// where this one would have.
    pub async fn poll_once(&self) -> PollOutcome {
        let snapshot = match self.source.current_playback().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Failed to poll playback: {}", e);
                return PollOutcome::default();
            }
        };

        let outcome = {
            let mut detector = self.detector.lock().await;
            let outcome = detector.observe(snapshot.as_ref());
            self.now_playing.send_replace(detector.now_playing().clone());
            outcome
        };

        if outcome.is_noop() {
            debug!("{}", &*self.now_playing.borrow());
        }

        if let Some(ref play) = outcome.play {
            self.record(play).await;
        }

        if let Some(ref hit) = outcome.special {
            self.announce(hit);
        }

        outcome
    }

    /// Record a play, giving up after one poll interval.
    ///
    /// The store transaction runs without yielding once it starts, so a
    /// timeout can only drop it before anything was written.
    async fn record(&self, play: &NewPlay) {
        match tokio::time::timeout(self.poll_interval, self.db.record_play(play)).await {
            Ok(Ok(recorded)) => info!(
                "Recorded play: {} - {} ({} today)",
                play.artist, play.title, recorded.play_count
            ),
            Ok(Err(e)) => error!("Recording failed for {} - {}: {}", play.artist, play.title, e),
            Err(_) => error!(
                "Recording timed out for {} - {} after {}",
                play.artist,
                play.title,
                humantime::format_duration(self.poll_interval)
            ),
        }
    }

    /// Send the special-track message without holding up polling
    fn announce(&self, hit: &SpecialTrackHit) {
        let message = special_track_message(&self.special_track_message, hit);
        let sink = Arc::clone(&self.sink);
        let max_length = self.max_message_length;

        info!("Special track playing: {} (#{})", hit.title, hit.count);
        tokio::spawn(async move {
            if let Err(e) = deliver(sink.as_ref(), &message, max_length).await {
                warn!("Could not send special-track message: {}", e);
            }
        });
    }
}
