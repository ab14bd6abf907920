//! Row types read from the aggregate store.
//!
//! Every type here is a read-only snapshot of rows produced by the external
//! ingestion pipeline. Counts are non-negative; the store layer clamps any
//! stray negative sums to zero before they reach this module.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A named aggregate relation the reader knows how to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateFamily {
    /// Per-user daily message/word/url counters
    DailyMessages,
    /// Per-guild hourly message counters
    HourlyMessages,
    /// Per-channel log2 response latency histograms
    LatencyHistogram,
    /// Per-user daily token sets
    TokenDiversity,
    /// Per-user daily sentiment sums (may be absent)
    Sentiment,
    /// Per-guild daily reaction histograms (may be absent)
    ReactionHistogram,
    /// Reply-thread index (may be absent)
    ThreadIndex,
}

impl AggregateFamily {
    /// Name of the backing SQLite relation.
    pub fn relation(&self) -> &'static str {
        match self {
            AggregateFamily::DailyMessages => "message_metrics_daily",
            AggregateFamily::HourlyMessages => "message_metrics_hourly",
            AggregateFamily::LatencyHistogram => "latency_hist_daily",
            AggregateFamily::TokenDiversity => "user_token_daily",
            AggregateFamily::Sentiment => "sentiment_daily",
            AggregateFamily::ReactionHistogram => "reaction_hist_daily",
            AggregateFamily::ThreadIndex => "thread_index",
        }
    }

    /// Whether a missing relation is tolerated rather than fatal.
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            AggregateFamily::Sentiment
                | AggregateFamily::ReactionHistogram
                | AggregateFamily::ThreadIndex
        )
    }
}

impl fmt::Display for AggregateFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.relation())
    }
}

/// Outcome of reading an optional aggregate family.
///
/// `Absent` means the backing relation does not exist (or could not be
/// read); assemblers treat it as an empty set but may report it differently.
#[derive(Debug, Clone, PartialEq)]
pub enum FamilyRows<T> {
    Present(Vec<T>),
    Absent,
}

impl<T> FamilyRows<T> {
    /// Rows of a present family, or an empty slice when absent.
    pub fn rows(&self) -> &[T] {
        match self {
            FamilyRows::Present(rows) => rows,
            FamilyRows::Absent => &[],
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FamilyRows::Absent)
    }
}

impl<T> Default for FamilyRows<T> {
    fn default() -> Self {
        FamilyRows::Absent
    }
}

/// Per-user message counters summed over a day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTotals {
    pub user_id: i64,
    pub messages: u64,
    pub words: u64,
    pub url_messages: u64,
}

/// Hour key (`YYYY-MM-DDTHH`) to message count, ordered by hour.
pub type HourlyCounts = BTreeMap<String, u64>;

/// One latency histogram cell summed over a day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyBucketRow {
    pub channel_id: i64,
    /// log2(ms) bucket index; valid range is `0..=MAX_LATENCY_BUCKET`
    pub bucket: i64,
    pub samples: u64,
}

/// Highest latency bucket index; bucket 20 covers roughly 17 minutes.
pub const MAX_LATENCY_BUCKET: usize = 20;

/// Distinct tokens a user produced over a day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenDiversityRow {
    pub user_id: i64,
    pub distinct_tokens: u64,
}

/// Per-user sentiment sums over a day window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentRow {
    pub user_id: i64,
    /// Number of messages that received a sentiment score
    pub scored: u64,
    /// Sum of compound scores over the scored messages
    pub compound_sum: f64,
}

/// Kind of reaction histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKind {
    /// Total reactions per message
    Count,
    /// Distinct emoji per message
    Diversity,
}

impl ReactionKind {
    /// Parse the `kind` column; unknown kinds yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "count" => Some(ReactionKind::Count),
            "diversity" => Some(ReactionKind::Diversity),
            _ => None,
        }
    }
}

/// One reaction histogram cell summed over a day window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionBucketRow {
    pub kind: String,
    pub bucket: i64,
    pub messages: u64,
}

/// Highest reaction bucket index; bucket 9 means "9 or more".
pub const MAX_REACTION_BUCKET: usize = 9;

/// A reply thread that overlaps the report window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRow {
    pub started_utc: String,
    pub last_utc: String,
    pub max_depth: u64,
    pub messages: u64,
}
