//! Activity report facade.
//!
//! Resolves the window, performs every aggregate read once, and feeds the
//! same reader output to each metric assembler.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::basic::{basic_distribution, BasicStats};
use super::content::{content_stats, ContentStats};
use super::engagement::{reaction_stats, thread_stats, ReactionStats, ThreadStats};
use super::latency::{latency_stats, LatencyStats};
use super::temporal::{burst_detector, temporal_heatmap, TemporalStats};
use super::window::GuildTimeWindow;
use crate::db::AggregateReader;
use crate::error::Result;
use crate::types::{AggregateFamily, FamilyRows};

/// Lookback used when the caller does not choose one.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Combined activity report for one guild.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityReport {
    pub range: GuildTimeWindow,
    pub basic: BasicStats,
    pub temporal: TemporalStats,
    pub latency: LatencyStats,
    pub content: ContentStats,
    /// `None` when the reaction histogram relation is absent
    pub reactions: Option<ReactionStats>,
    /// `None` when the thread index relation is absent
    pub threads: Option<ThreadStats>,
}

/// Build the activity report for the window ending at the current UTC hour.
pub fn get_activity_report<R>(reader: &R, guild_id: i64, window_days: i64) -> Result<ActivityReport>
where
    R: AggregateReader + ?Sized,
{
    get_activity_report_at(reader, guild_id, window_days, Utc::now())
}

/// Build the activity report for the window ending at `reference`.
///
/// Fails with [`Error::InvalidWindow`](crate::Error::InvalidWindow) before
/// any read when `window_days <= 0`, and with
/// [`Error::StoreUnavailable`](crate::Error::StoreUnavailable) when a
/// required family cannot be read. Optional families degrade silently.
pub fn get_activity_report_at<R>(
    reader: &R,
    guild_id: i64,
    window_days: i64,
    reference: DateTime<Utc>,
) -> Result<ActivityReport>
where
    R: AggregateReader + ?Sized,
{
    let window = GuildTimeWindow::resolve(window_days, reference)?;
    let span = tracing::info_span!("activity_report", guild_id, window_days);
    let _enter = span.enter();

    let start_day = window.start_day_key();
    let end_day = window.end_day_key();
    let start_hour = window.start_hour_key();
    let end_hour = window.end_hour_key();

    let daily = reader.read_daily_totals(guild_id, &start_day, &end_day)?;
    let hourly = reader.read_hourly_counts(guild_id, &start_hour, &end_hour)?;
    let hourly_by_day = reader.read_hourly_counts_for_days(guild_id, &start_day, &end_day)?;
    let latency_rows = reader.read_latency_histogram(guild_id, &start_day, &end_day)?;
    let tokens = reader.read_token_diversity(guild_id, &start_day, &end_day)?;

    let sentiment = degrade(
        AggregateFamily::Sentiment,
        reader.read_sentiment(guild_id, &start_day, &end_day),
    );
    let reactions = degrade(
        AggregateFamily::ReactionHistogram,
        reader.read_reaction_histogram(guild_id, &start_day, &end_day),
    );
    let threads = degrade(
        AggregateFamily::ThreadIndex,
        reader.read_threads(guild_id, &window.start_instant(), &window.end_instant()),
    );

    let burst = burst_detector(&hourly, window.start_hour, window.end_hour);
    let report = ActivityReport {
        range: window,
        basic: basic_distribution(&daily),
        temporal: TemporalStats {
            heatmap_avg_per_hour: temporal_heatmap(&hourly_by_day, window.start_day, window.end_day),
            burst_std_24h: burst.std_by_hour,
            silence_ratio: burst.silence_ratio,
        },
        latency: latency_stats(&latency_rows),
        content: content_stats(&daily, &tokens, &sentiment),
        reactions: reaction_stats(&reactions),
        threads: thread_stats(&threads),
    };

    tracing::info!(
        users = daily.len(),
        total_messages = report.content.total_messages,
        sentiment_present = !sentiment.is_absent(),
        "Activity report generated"
    );
    Ok(report)
}

/// Treat an unreadable optional family as absent.
fn degrade<T>(family: AggregateFamily, result: Result<FamilyRows<T>>) -> FamilyRows<T> {
    debug_assert!(family.is_optional());
    match result {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(family = %family, error = %e, "Optional aggregate family unreadable, continuing without it");
            FamilyRows::Absent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::*;
    use chrono::TimeZone;
    use std::cell::Cell;

    /// In-memory reader with canned rows and switchable failures.
    #[derive(Default)]
    struct FakeReader {
        daily: Vec<DailyTotals>,
        hourly: HourlyCounts,
        sentiment: FamilyRows<SentimentRow>,
        fail_latency: bool,
        fail_sentiment: bool,
        reads: Cell<usize>,
    }

    fn unavailable(family: AggregateFamily) -> Error {
        Error::store(family, rusqlite::Error::InvalidQuery)
    }

    impl AggregateReader for FakeReader {
        fn read_daily_totals(&self, _: i64, _: &str, _: &str) -> Result<Vec<DailyTotals>> {
            self.reads.set(self.reads.get() + 1);
            Ok(self.daily.clone())
        }

        fn read_hourly_counts(&self, _: i64, _: &str, _: &str) -> Result<HourlyCounts> {
            Ok(self.hourly.clone())
        }

        fn read_hourly_counts_for_days(&self, _: i64, _: &str, _: &str) -> Result<HourlyCounts> {
            Ok(self.hourly.clone())
        }

        fn read_latency_histogram(&self, _: i64, _: &str, _: &str) -> Result<Vec<LatencyBucketRow>> {
            if self.fail_latency {
                return Err(unavailable(AggregateFamily::LatencyHistogram));
            }
            Ok(vec![])
        }

        fn read_token_diversity(&self, _: i64, _: &str, _: &str) -> Result<Vec<TokenDiversityRow>> {
            Ok(vec![])
        }

        fn read_sentiment(&self, _: i64, _: &str, _: &str) -> Result<FamilyRows<SentimentRow>> {
            if self.fail_sentiment {
                return Err(unavailable(AggregateFamily::Sentiment));
            }
            Ok(self.sentiment.clone())
        }

        fn read_reaction_histogram(&self, _: i64, _: &str, _: &str) -> Result<FamilyRows<ReactionBucketRow>> {
            Ok(FamilyRows::Absent)
        }

        fn read_threads(&self, _: i64, _: &str, _: &str) -> Result<FamilyRows<ThreadRow>> {
            Ok(FamilyRows::Present(vec![]))
        }
    }

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_invalid_window_skips_reads() {
        let reader = FakeReader::default();
        let err = get_activity_report_at(&reader, 1, 0, reference()).unwrap_err();

        assert!(matches!(err, Error::InvalidWindow(0)));
        assert_eq!(reader.reads.get(), 0);
    }

    #[test]
    fn test_empty_store_report() {
        let reader = FakeReader::default();
        let report = get_activity_report_at(&reader, 1, 30, reference()).unwrap();

        assert_eq!(report.basic, BasicStats::default());
        assert_eq!(report.content.total_messages, 0);
        assert_eq!(report.latency.global.n, 0);
        assert_eq!(report.temporal.burst_std_24h.len(), 30 * 24 + 1);
        assert_eq!(report.temporal.silence_ratio, 1.0);
        assert!(report.reactions.is_none());
        assert_eq!(report.threads.map(|t| t.n_threads), Some(0));
    }

    #[test]
    fn test_required_family_failure_aborts() {
        let reader = FakeReader {
            fail_latency: true,
            ..Default::default()
        };
        let err = get_activity_report_at(&reader, 1, 7, reference()).unwrap_err();
        assert!(matches!(
            err,
            Error::StoreUnavailable { family: AggregateFamily::LatencyHistogram, .. }
        ));
    }

    #[test]
    fn test_optional_family_failure_degrades() {
        crate::logging::init_test();
        let reader = FakeReader {
            daily: vec![DailyTotals { user_id: 1, messages: 4, words: 8, url_messages: 0 }],
            fail_sentiment: true,
            ..Default::default()
        };
        let report = get_activity_report_at(&reader, 1, 7, reference()).unwrap();

        assert_eq!(report.content.total_messages, 4);
        assert_eq!(report.content.sentiment.coverage, 0.0);
        assert_eq!(report.content.sentiment.compound_mean, None);
    }

    #[test]
    fn test_report_json_shape() {
        let reader = FakeReader {
            sentiment: FamilyRows::Present(vec![]),
            ..Default::default()
        };
        let report = get_activity_report_at(&reader, 1, 1, reference()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["range"]["end_hour"], "2025-03-10T12");
        assert_eq!(json["basic"]["min"], 0);
        assert!(json["basic"]["gini"].is_null());
        assert_eq!(json["temporal"]["heatmap_avg_per_hour"].as_array().unwrap().len(), 7);
        assert!(json["content"]["sentiment"]["compound_median"].is_null());
        assert!(json["reactions"].is_null());
    }
}
