//! Listen Tracker Daemon
//!
//! Standalone binary that polls Spotify, records plays and sends the daily
//! review.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use listen_ledger::config::Config;
use listen_ledger::daemon::{run_until_signal, Tracker};
use listen_ledger::db::Database;

#[derive(Parser)]
#[command(name = "listen-tracker")]
#[command(author, version, about = "Spotify listening tracker daemon")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Spotify access token (overrides spotify.access_token)
    #[arg(long, env = "SPOTIFY_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Chat webhook URL (overrides delivery.webhook_url)
    #[arg(long, env = "WEBHOOK_URL", hide_env_values = true)]
    webhook_url: Option<String>,

    /// Do not send the daily review
    #[arg(long)]
    no_summary: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(ref path) = args.config {
        Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?
    } else {
        Config::load().context("Failed to load config")?
    };
    if let Some(token) = args.token {
        config.spotify.access_token = Some(token);
    }
    if let Some(url) = args.webhook_url {
        config.delivery.webhook_url = Some(url);
    }
    config.validate().context("Invalid configuration")?;

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(&config.general.log_level)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::info!("Listen tracker starting...");

    // Initialize database
    let data_dir = config.data_dir()?;
    let db = Database::new(&config.database, &data_dir)
        .await
        .context("Failed to open database")?;
    tracing::info!("Database initialized at {:?}", config.database_path()?);

    let tracker = Tracker::from_config(&config, db, !args.no_summary)?;
    run_until_signal(Arc::new(tracker)).await?;
    Ok(())
}
