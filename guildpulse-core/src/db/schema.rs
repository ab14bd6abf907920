//! Aggregate relation layouts
//!
//! The ingestion pipeline owns these tables; guildpulse only reads them. The
//! DDL lives here so fixtures and ingestion-side tooling agree with the
//! queries in [`super::store`] on column names and key order.

use rusqlite::Connection;

/// Relations every report depends on.
pub const REQUIRED_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS message_metrics_daily(
    guild_id     INTEGER NOT NULL,
    user_id      INTEGER NOT NULL,
    day          TEXT    NOT NULL,              -- 'YYYY-MM-DD' UTC
    messages     INTEGER NOT NULL DEFAULT 0,
    words        INTEGER NOT NULL DEFAULT 0,
    url_msgs     INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (guild_id, user_id, day)
);
CREATE INDEX IF NOT EXISTS idx_msg_daily_gd ON message_metrics_daily(guild_id, day);

CREATE TABLE IF NOT EXISTS message_metrics_hourly(
    guild_id INTEGER NOT NULL,
    hour     TEXT    NOT NULL,                  -- 'YYYY-MM-DDTHH' UTC
    messages INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (guild_id, hour)
);

CREATE TABLE IF NOT EXISTS latency_hist_daily(
    guild_id   INTEGER NOT NULL,
    channel_id INTEGER NOT NULL,
    day        TEXT    NOT NULL,
    bucket     INTEGER NOT NULL,                -- log2(ms), 0..=20
    n          INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (guild_id, channel_id, day, bucket)
);
CREATE INDEX IF NOT EXISTS idx_lat_hist_gd ON latency_hist_daily(guild_id, day);

CREATE TABLE IF NOT EXISTS user_token_daily(
    guild_id INTEGER NOT NULL,
    user_id  INTEGER NOT NULL,
    day      TEXT    NOT NULL,
    token    TEXT    NOT NULL,
    PRIMARY KEY (guild_id, user_id, day, token)
);
CREATE INDEX IF NOT EXISTS idx_utd_gud ON user_token_daily(guild_id, user_id, day);
"#;

/// Sentiment sums; only present when a sentiment scorer is installed.
pub const SENTIMENT_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS sentiment_daily(
    guild_id     INTEGER NOT NULL,
    user_id      INTEGER NOT NULL,
    day          TEXT    NOT NULL,
    n            INTEGER NOT NULL DEFAULT 0,
    sum_compound REAL    NOT NULL DEFAULT 0.0,
    PRIMARY KEY (guild_id, user_id, day)
);
CREATE INDEX IF NOT EXISTS idx_sent_gd ON sentiment_daily(guild_id, day);
"#;

/// Reaction histograms and the reply-thread index.
pub const ENGAGEMENT_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS reaction_hist_daily(
    guild_id INTEGER NOT NULL,
    day      TEXT    NOT NULL,
    kind     TEXT    NOT NULL,                  -- 'count' | 'diversity'
    bucket   INTEGER NOT NULL,                  -- 0..=9, 9 means 9+
    n        INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (guild_id, day, kind, bucket)
);
CREATE INDEX IF NOT EXISTS idx_rx_hist_gd ON reaction_hist_daily(guild_id, day);

CREATE TABLE IF NOT EXISTS thread_index(
    guild_id    INTEGER NOT NULL,
    root_id     INTEGER NOT NULL,
    started_utc TEXT    NOT NULL,
    last_utc    TEXT    NOT NULL,
    max_depth   INTEGER NOT NULL DEFAULT 0,
    messages    INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (guild_id, root_id)
);
CREATE INDEX IF NOT EXISTS idx_thread_g ON thread_index(guild_id);
"#;

/// Create the required aggregate relations.
pub fn create_required_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(REQUIRED_DDL)
}

/// Create every aggregate relation, optional ones included.
pub fn create_all_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(REQUIRED_DDL)?;
    conn.execute_batch(SENTIMENT_DDL)?;
    conn.execute_batch(ENGAGEMENT_DDL)
}

/// Check whether a table or view with this name exists.
pub fn relation_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1)",
        [name],
        |row| row.get(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AggregateFamily;

    #[test]
    fn test_required_tables_leave_optional_absent() {
        let conn = Connection::open_in_memory().unwrap();
        create_required_tables(&conn).unwrap();

        for family in [
            AggregateFamily::DailyMessages,
            AggregateFamily::HourlyMessages,
            AggregateFamily::LatencyHistogram,
            AggregateFamily::TokenDiversity,
        ] {
            assert!(relation_exists(&conn, family.relation()).unwrap());
        }
        assert!(!relation_exists(&conn, AggregateFamily::Sentiment.relation()).unwrap());
    }

    #[test]
    fn test_create_all_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_all_tables(&conn).unwrap();
        create_all_tables(&conn).unwrap();

        assert!(relation_exists(&conn, "sentiment_daily").unwrap());
        assert!(relation_exists(&conn, "reaction_hist_daily").unwrap());
        assert!(relation_exists(&conn, "thread_index").unwrap());
    }
}
