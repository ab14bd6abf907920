//! SQLite-backed aggregate reader
//!
//! Every read opens its own read-only connection and drops it before
//! returning, so no handle outlives a single query.

use crate::error::{Error, Result};
use crate::types::*;
use rusqlite::{params, Connection, OpenFlags, Params, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::schema::relation_exists;
use super::AggregateReader;

const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Read-only handle on the SQLite file written by the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct AggregateStore {
    path: PathBuf,
    query_timeout: Duration,
}

impl AggregateStore {
    /// Create a store for the database at `path`.
    ///
    /// Nothing is opened until the first read.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Create a store from loaded configuration.
    pub fn from_config(config: &crate::Config) -> Self {
        Self::new(config.store_path()).with_query_timeout(config.store.query_timeout())
    }

    /// Set the busy timeout applied to each query.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(self.query_timeout)?;
        Ok(conn)
    }

    /// Run a grouped query against a required family.
    fn query_rows<T, P, F>(&self, family: AggregateFamily, sql: &str, params: P, map: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.connect().map_err(|e| Error::store(family, e))?;
        let rows = collect_rows(&conn, sql, params, map).map_err(|e| Error::store(family, e))?;
        tracing::debug!(family = %family, rows = rows.len(), "Read aggregate rows");
        Ok(rows)
    }

    /// Run a grouped query against an optional family.
    ///
    /// A missing relation is reported as [`FamilyRows::Absent`]; any other
    /// failure is still an error so the caller can decide how to degrade.
    fn query_optional<T, P, F>(
        &self,
        family: AggregateFamily,
        sql: &str,
        params: P,
        map: F,
    ) -> Result<FamilyRows<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.connect().map_err(|e| Error::store(family, e))?;
        if !relation_exists(&conn, family.relation()).map_err(|e| Error::store(family, e))? {
            tracing::debug!(family = %family, "Optional relation absent");
            return Ok(FamilyRows::Absent);
        }
        let rows = collect_rows(&conn, sql, params, map).map_err(|e| Error::store(family, e))?;
        tracing::debug!(family = %family, rows = rows.len(), "Read optional aggregate rows");
        Ok(FamilyRows::Present(rows))
    }
}

fn collect_rows<T, P, F>(conn: &Connection, sql: &str, params: P, map: F) -> rusqlite::Result<Vec<T>>
where
    P: Params,
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map)?.collect::<rusqlite::Result<Vec<T>>>();
    rows
}

/// Read a summed counter column, treating NULL and negative sums as zero.
fn count(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let value: Option<i64> = row.get(idx)?;
    Ok(value.unwrap_or(0).max(0) as u64)
}

impl AggregateReader for AggregateStore {
    fn read_daily_totals(&self, guild_id: i64, start_day: &str, end_day: &str) -> Result<Vec<DailyTotals>> {
        self.query_rows(
            AggregateFamily::DailyMessages,
            r#"
            SELECT user_id, SUM(messages), SUM(words), SUM(url_msgs)
            FROM message_metrics_daily
            WHERE guild_id = ?1 AND day BETWEEN ?2 AND ?3
            GROUP BY user_id
            ORDER BY user_id
            "#,
            params![guild_id, start_day, end_day],
            |row| {
                Ok(DailyTotals {
                    user_id: row.get(0)?,
                    messages: count(row, 1)?,
                    words: count(row, 2)?,
                    url_messages: count(row, 3)?,
                })
            },
        )
    }

    fn read_hourly_counts(&self, guild_id: i64, start_hour: &str, end_hour: &str) -> Result<HourlyCounts> {
        let rows = self.query_rows(
            AggregateFamily::HourlyMessages,
            r#"
            SELECT hour, messages
            FROM message_metrics_hourly
            WHERE guild_id = ?1 AND hour BETWEEN ?2 AND ?3
            ORDER BY hour
            "#,
            params![guild_id, start_hour, end_hour],
            |row| Ok((row.get::<_, String>(0)?, count(row, 1)?)),
        )?;
        Ok(rows.into_iter().collect())
    }

    fn read_hourly_counts_for_days(&self, guild_id: i64, start_day: &str, end_day: &str) -> Result<HourlyCounts> {
        let rows = self.query_rows(
            AggregateFamily::HourlyMessages,
            r#"
            SELECT hour, SUM(messages)
            FROM message_metrics_hourly
            WHERE guild_id = ?1 AND substr(hour, 1, 10) BETWEEN ?2 AND ?3
            GROUP BY hour
            ORDER BY hour
            "#,
            params![guild_id, start_day, end_day],
            |row| Ok((row.get::<_, String>(0)?, count(row, 1)?)),
        )?;
        Ok(rows.into_iter().collect())
    }

    fn read_latency_histogram(&self, guild_id: i64, start_day: &str, end_day: &str) -> Result<Vec<LatencyBucketRow>> {
        self.query_rows(
            AggregateFamily::LatencyHistogram,
            r#"
            SELECT channel_id, bucket, SUM(n)
            FROM latency_hist_daily
            WHERE guild_id = ?1 AND day BETWEEN ?2 AND ?3
            GROUP BY channel_id, bucket
            ORDER BY channel_id, bucket
            "#,
            params![guild_id, start_day, end_day],
            |row| {
                Ok(LatencyBucketRow {
                    channel_id: row.get(0)?,
                    bucket: row.get(1)?,
                    samples: count(row, 2)?,
                })
            },
        )
    }

    fn read_token_diversity(&self, guild_id: i64, start_day: &str, end_day: &str) -> Result<Vec<TokenDiversityRow>> {
        self.query_rows(
            AggregateFamily::TokenDiversity,
            r#"
            SELECT user_id, COUNT(DISTINCT token)
            FROM user_token_daily
            WHERE guild_id = ?1 AND day BETWEEN ?2 AND ?3
            GROUP BY user_id
            ORDER BY user_id
            "#,
            params![guild_id, start_day, end_day],
            |row| {
                Ok(TokenDiversityRow {
                    user_id: row.get(0)?,
                    distinct_tokens: count(row, 1)?,
                })
            },
        )
    }

    fn read_sentiment(&self, guild_id: i64, start_day: &str, end_day: &str) -> Result<FamilyRows<SentimentRow>> {
        self.query_optional(
            AggregateFamily::Sentiment,
            r#"
            SELECT user_id, SUM(n), SUM(sum_compound)
            FROM sentiment_daily
            WHERE guild_id = ?1 AND day BETWEEN ?2 AND ?3
            GROUP BY user_id
            ORDER BY user_id
            "#,
            params![guild_id, start_day, end_day],
            |row| {
                Ok(SentimentRow {
                    user_id: row.get(0)?,
                    scored: count(row, 1)?,
                    compound_sum: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                })
            },
        )
    }

    fn read_reaction_histogram(
        &self,
        guild_id: i64,
        start_day: &str,
        end_day: &str,
    ) -> Result<FamilyRows<ReactionBucketRow>> {
        self.query_optional(
            AggregateFamily::ReactionHistogram,
            r#"
            SELECT kind, bucket, SUM(n)
            FROM reaction_hist_daily
            WHERE guild_id = ?1 AND day BETWEEN ?2 AND ?3
            GROUP BY kind, bucket
            ORDER BY kind, bucket
            "#,
            params![guild_id, start_day, end_day],
            |row| {
                Ok(ReactionBucketRow {
                    kind: row.get(0)?,
                    bucket: row.get(1)?,
                    messages: count(row, 2)?,
                })
            },
        )
    }

    fn read_threads(&self, guild_id: i64, start_utc: &str, end_utc: &str) -> Result<FamilyRows<ThreadRow>> {
        self.query_optional(
            AggregateFamily::ThreadIndex,
            r#"
            SELECT started_utc, last_utc, max_depth, messages
            FROM thread_index
            WHERE guild_id = ?1 AND NOT (last_utc < ?2 OR started_utc > ?3)
            ORDER BY started_utc
            "#,
            params![guild_id, start_utc, end_utc],
            |row| {
                Ok(ThreadRow {
                    started_utc: row.get(0)?,
                    last_utc: row.get(1)?,
                    max_depth: count(row, 2)?,
                    messages: count(row, 3)?,
                })
            },
        )
    }
}
