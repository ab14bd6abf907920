//! Aggregate store access for guildpulse
//!
//! This module provides the read side of the aggregate tables:
//! - Relation layouts shared with the ingestion pipeline
//! - The [`AggregateReader`] seam the report facade depends on
//! - A read-only SQLite implementation

pub mod schema;
pub mod store;

pub use store::AggregateStore;

use crate::error::Result;
use crate::types::{
    DailyTotals, FamilyRows, HourlyCounts, LatencyBucketRow, ReactionBucketRow, SentimentRow,
    ThreadRow, TokenDiversityRow,
};

/// Grouped, window-scoped reads over the aggregate families of one guild.
///
/// Day bounds are inclusive `YYYY-MM-DD` strings, hour bounds are inclusive
/// `YYYY-MM-DDTHH` strings. Required families fail with
/// [`Error::StoreUnavailable`](crate::Error::StoreUnavailable); optional
/// families return [`FamilyRows::Absent`] when their relation is missing.
pub trait AggregateReader {
    /// Per-user message, word, and url-message sums.
    fn read_daily_totals(&self, guild_id: i64, start_day: &str, end_day: &str) -> Result<Vec<DailyTotals>>;

    /// Hour -> message count for hours in `[start_hour, end_hour]`.
    fn read_hourly_counts(&self, guild_id: i64, start_hour: &str, end_hour: &str) -> Result<HourlyCounts>;

    /// Hour -> message count for hours whose date lies in `[start_day, end_day]`.
    fn read_hourly_counts_for_days(&self, guild_id: i64, start_day: &str, end_day: &str) -> Result<HourlyCounts>;

    /// Per-(channel, bucket) latency sample sums.
    fn read_latency_histogram(&self, guild_id: i64, start_day: &str, end_day: &str) -> Result<Vec<LatencyBucketRow>>;

    /// Per-user distinct token counts.
    fn read_token_diversity(&self, guild_id: i64, start_day: &str, end_day: &str) -> Result<Vec<TokenDiversityRow>>;

    /// Per-user sentiment sums.
    fn read_sentiment(&self, guild_id: i64, start_day: &str, end_day: &str) -> Result<FamilyRows<SentimentRow>>;

    /// Per-(kind, bucket) reaction histogram sums.
    fn read_reaction_histogram(
        &self,
        guild_id: i64,
        start_day: &str,
        end_day: &str,
    ) -> Result<FamilyRows<ReactionBucketRow>>;

    /// Reply threads overlapping `[start_utc, end_utc]` (RFC 3339).
    fn read_threads(&self, guild_id: i64, start_utc: &str, end_utc: &str) -> Result<FamilyRows<ThreadRow>>;
}
