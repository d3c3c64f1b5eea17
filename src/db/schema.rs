//! Database schema initialization

use duckdb::Connection;

use crate::error::Result;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r"
        CREATE SEQUENCE IF NOT EXISTS song_id_seq START 1;

        -- One row per distinct recording, keyed by (title, artist, album)
        CREATE TABLE IF NOT EXISTS songs (
            id BIGINT PRIMARY KEY DEFAULT nextval('song_id_seq'),
            title VARCHAR NOT NULL,
            artist VARCHAR NOT NULL,
            album VARCHAR NOT NULL,
            duration_seconds BIGINT NOT NULL,
            UNIQUE (title, artist, album)
        );

        -- One row per song per calendar day
        CREATE TABLE IF NOT EXISTS play_history (
            song_id BIGINT NOT NULL REFERENCES songs(id),
            play_date DATE NOT NULL,
            play_count BIGINT NOT NULL DEFAULT 1,
            PRIMARY KEY (song_id, play_date)
        );
        ",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables
                 WHERE table_name IN ('songs', 'play_history')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }
}
