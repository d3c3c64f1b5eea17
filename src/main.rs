//! Listen Ledger - Main entry point
//!
//! Query and report CLI over the play ledger. `track` runs the poller in the
//! foreground; the `listen-tracker` binary is the standalone daemon.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use listen_ledger::analytics::{artist_rollup, top_n};
use listen_ledger::config::Config;
use listen_ledger::daemon::{run_until_signal, Tracker};
use listen_ledger::date_range::{self, DateRange};
use listen_ledger::db::{Database, NewPlay};
use listen_ledger::display;
use listen_ledger::notify::{deliver, sink_from_config, MessageSink, StdoutSink};
use listen_ledger::spotify::{PlaybackSource, SpotifyClient};
use listen_ledger::summary::send_daily_review;
use listen_ledger::track::NowPlaying;
use listen_ledger::types::Seconds;

#[derive(Parser)]
#[command(name = "listen-ledger")]
#[command(author, version, about = "Personal listening history for Spotify")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Spotify access token (overrides spotify.access_token)
    #[arg(long, global = true, env = "SPOTIFY_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Chat webhook URL (overrides delivery.webhook_url)
    #[arg(long, global = true, env = "WEBHOOK_URL", hide_env_values = true)]
    webhook_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the play tracker (runs in foreground)
    Track,

    /// Show what is playing right now
    Current,

    /// Show the plays of one day
    History {
        /// Day to show (YYYY-MM-DD, default today)
        date: Option<String>,

        /// Show every day summed together
        #[arg(long, conflicts_with = "date")]
        all: bool,

        /// Send to the chat channel instead of printing
        #[arg(long)]
        send: bool,
    },

    /// Show top songs with listening time
    Stats {
        /// Number of songs to show
        limit: Option<usize>,

        /// Only count plays from this day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Send to the chat channel instead of printing
        #[arg(long)]
        send: bool,
    },

    /// Show top artists
    TopArtists {
        /// Number of artists to show
        limit: Option<usize>,

        /// Only count plays from this day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Send to the chat channel instead of printing
        #[arg(long)]
        send: bool,
    },

    /// Build the daily review for the day before DATE (default: yesterday)
    Review {
        /// Day the review runs on (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,

        /// Send to the chat channel instead of printing
        #[arg(long)]
        send: bool,
    },

    /// Record a play by hand
    Record {
        title: String,
        artist: String,
        album: String,

        /// Track length in seconds
        #[arg(long, default_value_t = 0)]
        duration: i64,

        /// Day to attribute the play to (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show or edit configuration
    Config {
        /// Print current configuration
        #[arg(long)]
        show: bool,

        /// Create default configuration file
        #[arg(long)]
        init: bool,
    },

    /// Database operations
    Db {
        /// Show database path and stats
        #[arg(long)]
        info: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load and validate configuration
    let mut config = if let Some(ref path) = cli.config {
        Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?
    } else {
        Config::load().context("Failed to load config")?
    };
    if let Some(token) = cli.token.clone() {
        config.spotify.access_token = Some(token);
    }
    if let Some(url) = cli.webhook_url.clone() {
        config.delivery.webhook_url = Some(url);
    }
    config.validate().context("Invalid configuration")?;

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(&config.general.log_level)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Some(Commands::Track) => run_tracker(config).await,

        Some(Commands::Current) => {
            let client = spotify_client(&config)?;
            let now_playing = client
                .current_playback()
                .await?
                .as_ref()
                .map_or(NowPlaying::Nothing, NowPlaying::from);
            println!("{now_playing}");
            Ok(())
        }

        Some(Commands::History { date, all, send }) => {
            let range = if all {
                DateRange::all_time()
            } else {
                day_or_today(date.as_deref())?
            };
            let db = open_database(&config).await?;
            let entries = db.try_history(&range).await?;
            emit(&config, &display::history_report(&range, &entries), send).await
        }

        Some(Commands::Stats { limit, date, send }) => {
            let range = day_or_all_time(date.as_deref())?;
            let db = open_database(&config).await?;
            let entries = db.try_history(&range).await?;

            let mut report = display::stats_report(top_n(&entries, limit));
            if !entries.is_empty() {
                report.push('\n');
                report.push_str(&display::total_listened_line(&entries));
            }
            emit(&config, &report, send).await
        }

        Some(Commands::TopArtists { limit, date, send }) => {
            let range = day_or_all_time(date.as_deref())?;
            let db = open_database(&config).await?;
            let entries = db.try_history(&range).await?;
            let artists = artist_rollup(&entries, limit);
            emit(&config, &display::top_artists_report(&artists), send).await
        }

        Some(Commands::Review { date, send }) => {
            let run_date = date.as_deref().map(date_range::parse_date).transpose()?;
            let run_date = run_date.unwrap_or_else(date_range::today);
            let db = open_database(&config).await?;
            let sink = report_sink(&config, send)?;
            send_daily_review(&db, sink.as_ref(), run_date, config.delivery.max_message_length)
                .await?;
            Ok(())
        }

        Some(Commands::Record {
            title,
            artist,
            album,
            duration,
            date,
        }) => {
            let day = date.as_deref().map(date_range::parse_date).transpose()?;
            let day = day.unwrap_or_else(date_range::today);
            let db = open_database(&config).await?;
            let play = NewPlay::new(title, artist, album, Seconds::new(duration));
            let recorded = db.record_play_on(&play, day).await?;
            println!(
                "Recorded {} by {} ({} plays on {})",
                play.title, play.artist, recorded.play_count, recorded.date
            );
            Ok(())
        }

        Some(Commands::Config { show, init }) => {
            if init {
                let default_config = Config::default();
                default_config.save()?;
                println!(
                    "Created default configuration at {}",
                    Config::config_path()?.display()
                );
            } else if show {
                let contents = toml::to_string_pretty(&config.redacted())?;
                println!("{contents}");
            } else {
                println!("Configuration path: {}", Config::config_path()?.display());
            }
            Ok(())
        }

        Some(Commands::Db { info }) => {
            if info {
                let db = open_database(&config).await?;
                println!("Database path: {}", config.database_path()?.display());
                println!("Songs: {}", db.song_count().await?);
                println!("Ledger rows: {}", db.ledger_row_count().await?);
            }
            Ok(())
        }

        None => {
            // Default: today's history
            let range = DateRange::today();
            let db = open_database(&config).await?;
            let entries = db.try_history(&range).await?;
            println!("{}", display::history_report(&range, &entries));
            Ok(())
        }
    }
}

async fn open_database(config: &Config) -> anyhow::Result<Database> {
    let data_dir = config.data_dir()?;
    let db_path = config.database_path()?;
    Database::new(&config.database, &data_dir)
        .await
        .with_context(|| format!("Failed to open database at {}", db_path.display()))
}

fn spotify_client(config: &Config) -> anyhow::Result<SpotifyClient> {
    let Some(token) = config.spotify.access_token.as_deref() else {
        bail!("No Spotify access token; set spotify.access_token or SPOTIFY_ACCESS_TOKEN");
    };
    Ok(SpotifyClient::new(&config.spotify, token)?)
}

fn day_or_today(date: Option<&str>) -> anyhow::Result<DateRange> {
    Ok(date.map(DateRange::parse_day).transpose()?.unwrap_or_default())
}

fn day_or_all_time(date: Option<&str>) -> anyhow::Result<DateRange> {
    Ok(date
        .map(DateRange::parse_day)
        .transpose()?
        .unwrap_or_else(DateRange::all_time))
}

fn report_sink(config: &Config, send: bool) -> anyhow::Result<Box<dyn MessageSink>> {
    if send {
        Ok(sink_from_config(&config.delivery)?)
    } else {
        Ok(Box::new(StdoutSink))
    }
}

/// Print a report, or deliver it to the chat channel with `--send`
async fn emit(config: &Config, text: &str, send: bool) -> anyhow::Result<()> {
    let sink = report_sink(config, send)?;
    deliver(sink.as_ref(), text, config.delivery.max_message_length).await?;
    Ok(())
}

async fn run_tracker(config: Config) -> anyhow::Result<()> {
    let db = open_database(&config).await?;
    let tracker = Tracker::from_config(&config, db, true)?;
    run_until_signal(Arc::new(tracker)).await?;
    Ok(())
}
