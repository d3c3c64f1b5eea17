//! Configuration management for listen-ledger

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Largest message the chat platform accepts, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Placeholder printed in place of secrets
const REDACTED: &str = "<redacted>";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Database settings
    pub database: DatabaseConfig,

    /// Poll detection settings
    pub tracking: TrackingConfig,

    /// Streaming service access
    pub spotify: SpotifyConfig,

    /// Chat delivery
    pub delivery: DeliveryConfig,

    /// Daily summary schedule
    pub summary: SummaryConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Data directory (default: ~/.local/share/listen-ledger)
    pub data_dir: Option<PathBuf>,
}

/// Database configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file path
    pub path: Option<String>,
}

/// Tracking behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// How often the streaming service is polled (humantime, e.g. "10s")
    pub poll_interval: String,

    /// Progress a track must pass before it counts as a play
    pub min_progress_ms: i64,

    /// Track id that triggers an announcement when it starts playing
    pub special_track_id: Option<String>,

    /// Announcement template; `{title}`, `{artist}` and `{count}` are substituted
    pub special_track_message: String,
}

/// Spotify Web API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    /// API root
    pub api_base: String,

    /// OAuth bearer token with the `user-read-playback-state` scope
    pub access_token: Option<String>,

    /// Per-request timeout (humantime)
    pub request_timeout: String,
}

/// Chat delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Webhook that accepts `{"content": "..."}` posts; stdout when unset
    pub webhook_url: Option<String>,

    /// Longest message sent in one piece
    pub max_message_length: usize,
}

/// Daily summary settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Send the daily review at all
    pub enabled: bool,

    /// Local time of day (HH:MM) the review for the previous day is sent
    pub time: String,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            data_dir: None,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            poll_interval: "10s".to_string(),
            min_progress_ms: 15_000,
            special_track_id: None,
            special_track_message: "Now listening to {title} by {artist}!\nCounter: {count}"
                .to_string(),
        }
    }
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.spotify.com/v1".to_string(),
            access_token: None,
            request_timeout: "5s".to_string(),
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            max_message_length: MAX_MESSAGE_LENGTH,
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            time: "00:00".to_string(),
        }
    }
}

impl TrackingConfig {
    /// Parsed polling interval
    pub fn poll_interval(&self) -> Result<Duration> {
        parse_duration("tracking.poll_interval", &self.poll_interval)
    }
}

impl SpotifyConfig {
    /// Parsed request timeout
    pub fn request_timeout(&self) -> Result<Duration> {
        parse_duration("spotify.request_timeout", &self.request_timeout)
    }
}

impl SummaryConfig {
    /// Parsed time of day
    pub fn time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(&self.time, "%H:%M").map_err(|e| {
            Error::config(format!(
                "summary.time must be HH:MM, got '{}': {e}",
                self.time
            ))
        })
    }
}

fn parse_duration(key: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value)
        .map_err(|e| Error::config(format!("{key} is not a valid duration ('{value}'): {e}")))
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::config("Could not determine config directory"))?;
        Ok(config_dir.join(crate::APP_NAME).join("config.toml"))
    }

    /// Get the data directory
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.general.data_dir {
            Ok(dir.clone())
        } else {
            let data_dir = dirs::data_local_dir()
                .ok_or_else(|| Error::config("Could not determine data directory"))?;
            Ok(data_dir.join(crate::APP_NAME))
        }
    }

    /// Get the database path
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.database.path {
            return Ok(PathBuf::from(path));
        }
        Ok(self.data_dir()?.join(crate::db::DEFAULT_DB_FILE))
    }

    /// Copy with credentials masked, for printing
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.spotify.access_token.is_some() {
            config.spotify.access_token = Some(REDACTED.to_string());
        }
        if config.delivery.webhook_url.is_some() {
            config.delivery.webhook_url = Some(REDACTED.to_string());
        }
        config
    }

    /// Validate configuration values.
    ///
    /// Call this after loading to ensure all values are within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        if self.tracking.poll_interval()?.is_zero() {
            return Err(Error::config("tracking.poll_interval must be greater than zero"));
        }

        if self.tracking.min_progress_ms < 0 {
            return Err(Error::config(format!(
                "tracking.min_progress_ms must not be negative, got {}",
                self.tracking.min_progress_ms
            )));
        }

        self.spotify.request_timeout()?;

        if !(1..=MAX_MESSAGE_LENGTH).contains(&self.delivery.max_message_length) {
            return Err(Error::config(format!(
                "delivery.max_message_length must be between 1 and {MAX_MESSAGE_LENGTH}, got {}",
                self.delivery.max_message_length
            )));
        }

        self.summary.time()?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "log_level must be one of {:?}, got '{}'",
                valid_levels, self.general.log_level
            )));
        }

        Ok(())
    }
}
