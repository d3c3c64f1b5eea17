//! Tracker startup shared by `listen-ledger track` and `listen-tracker`
//!
//! Wires the poller and the daily review to Spotify, the ledger and the
//! configured sink, and stops both on Ctrl-C or SIGTERM.

use std::sync::Arc;

use tokio::signal;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::monitor::PlayMonitor;
use crate::notify::{sink_from_config, MessageSink};
use crate::spotify::{PlaybackSource, SpotifyClient};
use crate::summary::DailySummary;

/// The running poller plus the optional daily review
pub struct Tracker {
    monitor: Arc<PlayMonitor>,
    summary: Option<Arc<DailySummary>>,
}

impl Tracker {
    #[must_use]
    pub fn new(monitor: PlayMonitor, summary: Option<DailySummary>) -> Self {
        Self {
            monitor: Arc::new(monitor),
            summary: summary.map(Arc::new),
        }
    }

    /// Build the tracker from configuration.
    ///
    /// Fails if no Spotify access token is configured.
    pub fn from_config(config: &Config, db: Database, with_summary: bool) -> Result<Self> {
        let token = config.spotify.access_token.as_deref().ok_or_else(|| {
            Error::config("No Spotify access token; set spotify.access_token or SPOTIFY_ACCESS_TOKEN")
        })?;
        let source: Arc<dyn PlaybackSource> = Arc::new(SpotifyClient::new(&config.spotify, token)?);
        let sink: Arc<dyn MessageSink> = Arc::from(sink_from_config(&config.delivery)?);
        let max_length = config.delivery.max_message_length;

        let monitor = PlayMonitor::new(
            &config.tracking,
            max_length,
            source,
            db.clone(),
            Arc::clone(&sink),
        )?;

        let summary = if with_summary && config.summary.enabled {
            Some(DailySummary::new(db, sink, config.summary.time()?, max_length))
        } else {
            info!("Daily review disabled");
            None
        };

        Ok(Self::new(monitor, summary))
    }

    /// Poll until stopped, with the daily review running alongside
    pub async fn run(&self) -> Result<()> {
        if let Some(ref summary) = self.summary {
            let summary = Arc::clone(summary);
            tokio::spawn(async move {
                if let Err(e) = summary.run().await {
                    error!("Daily review scheduler failed: {}", e);
                }
            });
        }

        // Log now-playing changes
        let mut now_playing = self.monitor.subscribe();
        tokio::spawn(async move {
            while now_playing.changed().await.is_ok() {
                let current = now_playing.borrow_and_update().clone();
                debug!("{}", current);
            }
        });

        let result = self.monitor.run().await;
        if let Some(ref summary) = self.summary {
            summary.stop();
        }
        result
    }

    /// Stop the poller and the daily review
    pub fn stop(&self) {
        self.monitor.stop();
        if let Some(ref summary) = self.summary {
            summary.stop();
        }
    }
}

/// Run `tracker` until Ctrl-C or SIGTERM
pub async fn run_until_signal(tracker: Arc<Tracker>) -> Result<()> {
    let on_ctrl_c = Arc::clone(&tracker);
    tokio::spawn(async move {
        let _ = signal::ctrl_c().await;
        info!("Received shutdown signal, stopping...");
        on_ctrl_c.stop();
    });

    // Also handle SIGTERM
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                let on_sigterm = Arc::clone(&tracker);
                tokio::spawn(async move {
                    sigterm.recv().await;
                    info!("Received SIGTERM, stopping...");
                    on_sigterm.stop();
                });
            }
            Err(e) => {
                warn!("Failed to register SIGTERM handler: {}. Use Ctrl+C to stop.", e);
            }
        }
    }

    tracker.run().await?;
    info!("Listen tracker stopped");
    Ok(())
}
