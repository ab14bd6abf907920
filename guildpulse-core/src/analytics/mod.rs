//! Activity analytics for guildpulse
//!
//! Each submodule is a pure assembler over rows returned by an
//! [`AggregateReader`](crate::db::AggregateReader):
//! - [`basic`]: per-user message distribution shape
//! - [`temporal`]: time-of-week heatmap and rolling burst dispersion
//! - [`latency`]: response latency percentiles from log2 histograms
//! - [`content`]: words, urls, lexical diversity, sentiment
//! - [`engagement`]: reaction histograms and reply threads
//!
//! [`report`] resolves the window, performs the reads, and combines the
//! blocks into an [`ActivityReport`].

pub mod basic;
pub mod content;
pub mod engagement;
pub mod latency;
pub mod report;
pub mod stats;
pub mod temporal;
pub mod window;

pub use basic::BasicStats;
pub use content::{ContentStats, SentimentSummary};
pub use engagement::{ReactionStats, ThreadStats};
pub use latency::{ChannelLatency, LatencyStats, LatencySummary};
pub use report::{get_activity_report, get_activity_report_at, ActivityReport, DEFAULT_WINDOW_DAYS};
pub use temporal::{Heatmap, TemporalStats};
pub use window::GuildTimeWindow;
