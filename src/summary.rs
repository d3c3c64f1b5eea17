//! Daily review scheduler
//!
//! Once a day at the configured local time, sends the ranked play list of
//! the previous day to the chat channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use tokio::sync::Notify;
use tracing::{error, info};

use crate::date_range::DateRange;
use crate::db::Database;
use crate::display::daily_review;
use crate::error::Result;
use crate::notify::{deliver, MessageSink};

/// First occurrence of `at` strictly after `now`
#[must_use]
pub fn next_run_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    }
}

/// Send the review of the day before `run_date`.
///
/// Returns `false` without sending anything if nothing was played that day.
pub async fn send_daily_review(
    db: &Database,
    sink: &dyn MessageSink,
    run_date: NaiveDate,
    max_length: usize,
) -> Result<bool> {
    let range = DateRange::day_before(run_date);
    let entries = db.history(&range).await;

    let Some(review) = daily_review(&entries) else {
        info!("No play history found for {range}, skipping daily review");
        return Ok(false);
    };

    let sent = deliver(sink, &review, max_length).await?;
    info!("Sent daily review for {range} in {sent} message(s)");
    Ok(true)
}

/// Fires [`send_daily_review`] every day at a fixed time
pub struct DailySummary {
    db: Database,
    sink: Arc<dyn MessageSink>,
    at: NaiveTime,
    max_length: usize,
    running: Arc<AtomicBool>,
    shutdown: Notify,
}

impl DailySummary {
    pub fn new(db: Database, sink: Arc<dyn MessageSink>, at: NaiveTime, max_length: usize) -> Self {
        Self {
            db,
            sink,
            at,
            max_length,
            running: Arc::new(AtomicBool::new(true)),
            shutdown: Notify::new(),
        }
    }

    /// Sleep until each scheduled time and send the review, until stopped
    pub async fn run(&self) -> Result<()> {
        info!("Daily review scheduled for {}", self.at.format("%H:%M"));

        while self.running.load(Ordering::SeqCst) {
            let now = Local::now().naive_local();
            let next = next_run_after(now, self.at);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);

            tokio::select! {
                () = tokio::time::sleep(wait) => {}
                () = self.shutdown.notified() => break,
            }

            if let Err(e) =
                send_daily_review(&self.db, self.sink.as_ref(), next.date(), self.max_length).await
            {
                error!("Daily review failed: {}", e);
            }
        }

        info!("Daily review scheduler stopped");
        Ok(())
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.notify_one();
    }
}
