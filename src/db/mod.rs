//! Database module using DuckDB
//!
//! Holds the two durable tables: the song identity store (`songs`) and the
//! daily play ledger (`play_history`). Recording a play upserts both in one
//! transaction; history queries join them back into ranked entries.

mod filter;
mod queries;
mod schema;

pub use filter::DateFilter;

use chrono::NaiveDate;
use duckdb::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;

use crate::config::DatabaseConfig;
use crate::date_range::{self, DateRange};
use crate::error::{Error, Result};
use crate::types::{PlayCount, Seconds};

/// File name used when no explicit database path is configured.
pub const DEFAULT_DB_FILE: &str = "ledger.duckdb";

/// Database wrapper for the play ledger using DuckDB
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Create a new database connection
    ///
    /// # Arguments
    /// * `config` - Database configuration
    /// * `data_dir` - Default data directory for the database file
    pub async fn new(config: &DatabaseConfig, data_dir: &Path) -> Result<Self> {
        let db_path = if let Some(ref path) = config.path {
            let path = Path::new(path);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path.to_path_buf()
        } else {
            std::fs::create_dir_all(data_dir)?;
            data_dir.join(DEFAULT_DB_FILE)
        };

        // Open DuckDB connection (synchronous, so we use spawn_blocking)
        let conn = tokio::task::spawn_blocking(move || Connection::open(&db_path))
            .await
            .map_err(|e| Error::other(e.to_string()))??;

        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Record one qualifying play of `play` for today.
    ///
    /// Invalid input is rejected before the store is touched. Any store
    /// failure rolls the whole transaction back and is returned; retrying is
    /// up to the caller.
    pub async fn record_play(&self, play: &NewPlay) -> Result<RecordedPlay> {
        self.record_play_on(play, date_range::today()).await
    }

    /// Record one play attributed to an explicit calendar day
    pub async fn record_play_on(&self, play: &NewPlay, date: NaiveDate) -> Result<RecordedPlay> {
        play.validate()?;
        let mut conn = self.conn.lock().await;
        queries::record_play(&mut conn, play, date)
    }

    /// Insert or resolve a song identity without touching the ledger
    pub async fn upsert_song(&self, play: &NewPlay) -> Result<i64> {
        play.validate()?;
        let conn = self.conn.lock().await;
        queries::upsert_song(&conn, play)
    }

    /// Ranked history for `range`, or an empty list if the store fails.
    ///
    /// Failures are logged rather than returned so report paths keep working.
    pub async fn history(&self, range: &DateRange) -> Vec<AggregatedEntry> {
        match self.try_history(range).await {
            Ok(entries) => entries,
            Err(e) => {
                error!("Failed to fetch play history for {}: {}", range, e);
                Vec::new()
            }
        }
    }

    /// Ranked history for `range`, propagating store errors
    pub async fn try_history(&self, range: &DateRange) -> Result<Vec<AggregatedEntry>> {
        let conn = self.conn.lock().await;
        queries::fetch_history(&conn, range)
    }

    /// Number of distinct songs
    pub async fn song_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        queries::song_count(&conn)
    }

    /// Number of ledger rows
    pub async fn ledger_row_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        queries::ledger_row_count(&conn)
    }

    /// Play count of a song on a day, `None` if it was not played
    pub async fn play_count_on(&self, song_id: i64, date: NaiveDate) -> Result<Option<PlayCount>> {
        let conn = self.conn.lock().await;
        queries::play_count_on(&conn, song_id, date)
    }
}

/// A detected play to be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlay {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Track length in whole seconds.
    pub duration: Seconds,
}

impl NewPlay {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        duration: Seconds,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            duration,
        }
    }

    /// Reject missing identity fields and negative durations.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("title", &self.title),
            ("artist", &self.artist),
            ("album", &self.album),
        ] {
            if value.trim().is_empty() {
                return Err(Error::invalid_input(format!("{field} must not be empty")));
            }
        }

        if self.duration.get() < 0 {
            return Err(Error::invalid_input(format!(
                "duration must not be negative, got {}s",
                self.duration.get()
            )));
        }

        Ok(())
    }
}

/// Outcome of a successful recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedPlay {
    pub song_id: i64,
    pub date: NaiveDate,
    /// Ledger count for (song, date) after this play.
    pub play_count: PlayCount,
}

/// A song with its play count over some date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedEntry {
    pub title: String,
    pub artist: String,
    pub duration: Seconds,
    pub play_count: PlayCount,
}
