//! Report formatting.
//!
//! Turns ranked history into the text messages sent to chat or printed by
//! the CLI. Every list line ends in `times\n` so long reports can be split
//! by [`chunk`](crate::chunk::chunk) without cutting a line.
//!
//! # Functions
//!
//! - [`history_report`] - Per-day play list
//! - [`stats_report`] / [`total_listened_line`] - Top songs with listening time
//! - [`top_artists_report`] - Artist rollup
//! - [`daily_review`] - Previous-day summary for the scheduler
//! - [`special_track_message`] - Special-track announcement

use std::fmt::Write;

use crate::analytics::{seconds_listened, total_seconds_listened, ArtistRollup};
use crate::date_range::DateRange;
use crate::db::AggregatedEntry;
use crate::track::SpecialTrackHit;

/// `Play History from DATE:` followed by one line per song.
///
/// Returns the "nothing found" message when `entries` is empty.
#[must_use]
pub fn history_report(range: &DateRange, entries: &[AggregatedEntry]) -> String {
    if entries.is_empty() {
        return format!("No play history found for {range}.");
    }

    let mut out = format!("Play History from {range}:\n");
    for (i, entry) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} by {} - Played {} times",
            i + 1,
            entry.title,
            entry.artist,
            entry.play_count
        );
    }
    out
}

/// `Top Songs:` list with each song's listening time.
#[must_use]
pub fn stats_report(entries: &[AggregatedEntry]) -> String {
    if entries.is_empty() {
        return "No song data available.".to_string();
    }

    let mut out = String::from("Top Songs:\n");
    for (i, entry) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} by {} ({}) - Played {} times",
            i + 1,
            entry.title,
            entry.artist,
            seconds_listened(entry),
            entry.play_count
        );
    }
    out
}

/// Footer with the cumulative listening time of `entries`.
#[must_use]
pub fn total_listened_line(entries: &[AggregatedEntry]) -> String {
    format!(
        "Total Time Listened: {}",
        total_seconds_listened(entries).spelled_out()
    )
}

/// `Top Artists:` list.
#[must_use]
pub fn top_artists_report(artists: &[ArtistRollup]) -> String {
    if artists.is_empty() {
        return "No song data available.".to_string();
    }

    let mut out = String::from("Top Artists:\n");
    for (i, artist) in artists.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} - Played {} times",
            i + 1,
            artist.artist,
            artist.play_count
        );
    }
    out
}

/// The daily review message, or `None` if nothing was played.
#[must_use]
pub fn daily_review(entries: &[AggregatedEntry]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }

    let mut out = String::from("**Daily Review!**\n");
    for (i, entry) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. **{}** by {} - Played {} times",
            i + 1,
            entry.title,
            entry.artist,
            entry.play_count
        );
    }
    Some(out)
}

/// Fill the announcement template for a special-track hit.
///
/// `{title}`, `{artist}` and `{count}` are replaced.
#[must_use]
pub fn special_track_message(template: &str, hit: &SpecialTrackHit) -> String {
    template
        .replace("{title}", &hit.title)
        .replace("{artist}", &hit.artist)
        .replace("{count}", &hit.count.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::artist_rollup;
    use crate::chunk::{chunk, LINE_MARKER};
    use crate::types::{PlayCount, Seconds};

    fn entry(title: &str, artist: &str, secs: i64, plays: i64) -> AggregatedEntry {
        AggregatedEntry {
            title: title.to_string(),
            artist: artist.to_string(),
            duration: Seconds::new(secs),
            play_count: PlayCount::new(plays),
        }
    }

    fn sample() -> Vec<AggregatedEntry> {
        vec![entry("Mogu Mogu", "Band", 200, 3), entry("Other", "band", 125, 2)]
    }

    #[test]
    fn test_history_report() {
        let day = chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let report = history_report(&DateRange::day(day), &sample());
        assert_eq!(
            report,
            "Play History from 2024-05-01:\n\
             1. Mogu Mogu by Band - Played 3 times\n\
             2. Other by band - Played 2 times\n"
        );
    }

    #[test]
    fn test_history_report_empty() {
        let day = chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            history_report(&DateRange::day(day), &[]),
            "No play history found for 2024-05-01."
        );
    }

    #[test]
    fn test_stats_report_includes_listening_time() {
        let report = stats_report(&sample());
        assert!(report.starts_with("Top Songs:\n"));
        assert!(report.contains("1. Mogu Mogu by Band (0:10:00) - Played 3 times\n"));
        assert!(report.contains("2. Other by band (0:04:10) - Played 2 times\n"));
        assert_eq!(
            total_listened_line(&sample()),
            "Total Time Listened: 0 hours, 14 minutes, 10 seconds"
        );
    }

    #[test]
    fn test_top_artists_report() {
        let report = top_artists_report(&artist_rollup(&sample(), None));
        assert_eq!(report, "Top Artists:\n1. Band - Played 5 times\n");
    }

    #[test]
    fn test_daily_review() {
        assert!(daily_review(&[]).is_none());
        let review = daily_review(&sample()).unwrap();
        assert!(review.starts_with("**Daily Review!**\n1. **Mogu Mogu** by Band - Played 3 times\n"));
    }

    #[test]
    fn test_report_lines_follow_chunk_convention() {
        let entries: Vec<_> = (0..300).map(|i| entry(&format!("Song {i}"), "Artist", 180, 1)).collect();
        let report = stats_report(&entries);
        for line in report.lines().skip(1) {
            assert!(line.ends_with(LINE_MARKER));
        }
        let chunks = chunk(&report, 2000);
        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), report);
    }

    #[test]
    fn test_special_track_message() {
        let hit = SpecialTrackHit {
            title: "Mogu Mogu".to_string(),
            artist: "Band".to_string(),
            count: 4,
        };
        assert_eq!(
            special_track_message("{artist}: {title} (#{count})", &hit),
            "Band: Mogu Mogu (#4)"
        );
    }
}
