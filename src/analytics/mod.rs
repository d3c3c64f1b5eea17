//! Ranking views over aggregated history.
//!
//! All functions here are pure: they take the ranked entries returned by
//! [`Database::history`](crate::db::Database::history) and never fail or
//! mutate their input.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::db::AggregatedEntry;
use crate::types::{PlayCount, Seconds};

/// Play count summed over every song by one artist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistRollup {
    /// Artist name as spelled by the first entry seen for the group
    pub artist: String,
    pub play_count: PlayCount,
}

/// First `limit` entries of an already ranked list, or all of them.
#[must_use]
pub fn top_n<T>(entries: &[T], limit: Option<usize>) -> &[T] {
    match limit {
        Some(n) if n < entries.len() => &entries[..n],
        _ => entries,
    }
}

/// Sum play counts per artist, merging names case-insensitively.
///
/// Groups are ranked by total plays, descending; among groups with equal
/// totals the artist seen last comes first.
#[must_use]
pub fn artist_rollup(entries: &[AggregatedEntry], limit: Option<usize>) -> Vec<ArtistRollup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut ranked: Vec<ArtistRollup> = Vec::new();

    for entry in entries {
        match index.entry(entry.artist.to_lowercase()) {
            Entry::Occupied(slot) => ranked[*slot.get()].play_count += entry.play_count,
            Entry::Vacant(slot) => {
                slot.insert(ranked.len());
                ranked.push(ArtistRollup {
                    artist: entry.artist.clone(),
                    play_count: entry.play_count,
                });
            }
        }
    }

    // Stable ascending sort, then reverse: ties end up in reverse first-seen order
    ranked.sort_by_key(|rollup| rollup.play_count);
    ranked.reverse();

    if let Some(n) = limit {
        ranked.truncate(n);
    }
    ranked
}

/// Listening time of one entry: its length times its play count
#[must_use]
pub const fn seconds_listened(entry: &AggregatedEntry) -> Seconds {
    entry.duration.times(entry.play_count)
}

/// Cumulative listening time across all entries
#[must_use]
pub fn total_seconds_listened(entries: &[AggregatedEntry]) -> Seconds {
    entries.iter().map(seconds_listened).sum()
}
