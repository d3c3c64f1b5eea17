//! # Listen Ledger
//!
//! Personal listening history for a streaming-service account.
//!
//! This crate provides:
//! - Polling of the Spotify Web API for the current playback state
//! - Play detection with a progress threshold and per-track de-duplication
//! - A local DuckDB ledger of per-day play counts
//! - Ranked history, artist rollups and listening-time reports
//! - Chunked delivery of reports to a chat webhook, plus a daily review

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod analytics;
pub mod chunk;
pub mod config;
pub mod daemon;
pub mod date_range;
pub mod db;
pub mod display;
pub mod error;
pub mod monitor;
pub mod notify;
pub mod spotify;
pub mod summary;
pub mod track;
pub mod types;

pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "listen-ledger";
