//! Database query implementations for DuckDB

use chrono::NaiveDate;
use duckdb::{params, params_from_iter, Connection};

use crate::date_range::DateRange;
use crate::error::Result;
use crate::types::{PlayCount, Seconds};

use super::{filter, AggregatedEntry, NewPlay, RecordedPlay};

fn sql_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Insert the song identity, or resolve it to the existing row.
///
/// Conflicts on (title, artist, album) leave the stored row untouched,
/// including its duration.
pub fn upsert_song(conn: &Connection, play: &NewPlay) -> Result<i64> {
    conn.execute(
        r"
        INSERT INTO songs (title, artist, album, duration_seconds)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (title, artist, album) DO NOTHING
        ",
        params![play.title, play.artist, play.album, play.duration.get()],
    )?;

    let id = conn.query_row(
        "SELECT id FROM songs WHERE title = ? AND artist = ? AND album = ?",
        params![play.title, play.artist, play.album],
        |row| row.get(0),
    )?;

    Ok(id)
}

/// Create today's ledger row at 1 or bump an existing one by exactly 1.
pub fn increment_play(conn: &Connection, song_id: i64, date: NaiveDate) -> Result<PlayCount> {
    let date = sql_date(date);

    conn.execute(
        r"
        INSERT INTO play_history (song_id, play_date, play_count)
        VALUES (?, CAST(? AS DATE), 1)
        ON CONFLICT (song_id, play_date) DO UPDATE SET play_count = play_count + 1
        ",
        params![song_id, date],
    )?;

    let count: i64 = conn.query_row(
        "SELECT play_count FROM play_history WHERE song_id = ? AND play_date = CAST(? AS DATE)",
        params![song_id, date],
        |row| row.get(0),
    )?;

    Ok(PlayCount::new(count))
}

/// Record one play inside a single transaction.
///
/// Dropping the transaction on any error rolls both statements back, so a
/// song row is never committed without its ledger row.
pub fn record_play(conn: &mut Connection, play: &NewPlay, date: NaiveDate) -> Result<RecordedPlay> {
    let tx = conn.transaction()?;
    let song_id = upsert_song(&tx, play)?;
    let play_count = increment_play(&tx, song_id, date)?;
    tx.commit()?;

    Ok(RecordedPlay {
        song_id,
        date,
        play_count,
    })
}

/// Ledger rows joined to their songs, most played first.
///
/// Counts are summed per song, which only matters for multi-day ranges.
/// Ties are ordered by song id so a re-query returns the same order.
pub fn fetch_history(conn: &Connection, range: &DateRange) -> Result<Vec<AggregatedEntry>> {
    let mut query = r"
        SELECT
            s.title,
            s.artist,
            s.duration_seconds,
            CAST(SUM(ph.play_count) AS BIGINT) AS plays
        FROM play_history ph
        JOIN songs s ON s.id = ph.song_id
        WHERE 1=1
    "
    .to_string();

    let params = filter::for_range(range, &mut query);

    query.push_str(
        " GROUP BY s.id, s.title, s.artist, s.duration_seconds ORDER BY plays DESC, s.id ASC",
    );

    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
        Ok(AggregatedEntry {
            title: row.get(0)?,
            artist: row.get(1)?,
            duration: Seconds::new(row.get(2)?),
            play_count: PlayCount::new(row.get(3)?),
        })
    })?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }

    Ok(entries)
}

/// Number of distinct songs
pub fn song_count(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))?;
    Ok(count)
}

/// Number of (song, day) ledger rows
pub fn ledger_row_count(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM play_history", [], |row| row.get(0))?;
    Ok(count)
}

/// Play count of one song on one day, if it was played that day
pub fn play_count_on(conn: &Connection, song_id: i64, date: NaiveDate) -> Result<Option<PlayCount>> {
    let count: i64 = conn.query_row(
        r"
        SELECT COALESCE(MAX(play_count), 0)
        FROM play_history
        WHERE song_id = ? AND play_date = CAST(? AS DATE)
        ",
        params![song_id, sql_date(date)],
        |row| row.get(0),
    )?;

    Ok((count > 0).then_some(PlayCount::new(count)))
}
