//! Reaction histograms and reply-thread statistics.
//!
//! Both families are optional: when the ingestion pipeline does not keep
//! them, the report carries `None` for the block instead of zeros.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use super::stats::percentile;
use crate::types::{FamilyRows, ReactionBucketRow, ReactionKind, ThreadRow, MAX_REACTION_BUCKET};

/// Messages per reaction bucket; the last bucket means "9 or more".
pub type ReactionHistogram = [u64; MAX_REACTION_BUCKET + 1];

/// Reaction distributions over the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionStats {
    /// Messages by total reaction count
    pub count: ReactionHistogram,
    /// Messages by number of distinct emoji
    pub diversity: ReactionHistogram,
}

/// Reply-thread statistics for threads overlapping the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadStats {
    pub n_threads: u64,
    pub lifespan_median_s: Option<f64>,
    pub lifespan_p95_s: Option<f64>,
    pub depth_median: Option<f64>,
    pub depth_max: Option<u64>,
    pub messages_total: u64,
}

/// Fold reaction histogram rows into zero-filled `count` and `diversity` arrays.
pub fn reaction_stats(rows: &FamilyRows<ReactionBucketRow>) -> Option<ReactionStats> {
    let FamilyRows::Present(rows) = rows else {
        return None;
    };

    let mut stats = ReactionStats {
        count: [0; MAX_REACTION_BUCKET + 1],
        diversity: [0; MAX_REACTION_BUCKET + 1],
    };
    for row in rows {
        let bucket = match usize::try_from(row.bucket) {
            Ok(bucket) if bucket <= MAX_REACTION_BUCKET => bucket,
            _ => continue,
        };
        match ReactionKind::parse(&row.kind) {
            Some(ReactionKind::Count) => stats.count[bucket] += row.messages,
            Some(ReactionKind::Diversity) => stats.diversity[bucket] += row.messages,
            None => tracing::debug!(kind = %row.kind, "Skipping unknown reaction kind"),
        }
    }
    Some(stats)
}

/// Lifespan, depth, and volume of reply threads.
///
/// Threads whose timestamps do not parse still count toward depth and
/// message totals but contribute no lifespan.
pub fn thread_stats(rows: &FamilyRows<ThreadRow>) -> Option<ThreadStats> {
    let FamilyRows::Present(rows) = rows else {
        return None;
    };

    let lifespans: Vec<f64> = rows
        .iter()
        .filter_map(|row| {
            let started = parse_instant(&row.started_utc)?;
            let last = parse_instant(&row.last_utc)?;
            Some((last - started).num_milliseconds() as f64 / 1000.0)
        })
        .collect();
    let depths: Vec<f64> = rows.iter().map(|row| row.max_depth as f64).collect();

    Some(ThreadStats {
        n_threads: rows.len() as u64,
        lifespan_median_s: percentile(&lifespans, 50.0),
        lifespan_p95_s: percentile(&lifespans, 95.0),
        depth_median: percentile(&depths, 50.0),
        depth_max: rows.iter().map(|row| row.max_depth).max(),
        messages_total: rows.iter().map(|row| row.messages).sum(),
    })
}

/// Parse an RFC 3339 timestamp, or a naive ISO timestamp taken as UTC.
fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reaction(kind: &str, bucket: i64, messages: u64) -> ReactionBucketRow {
        ReactionBucketRow {
            kind: kind.to_string(),
            bucket,
            messages,
        }
    }

    fn thread(started: &str, last: &str, max_depth: u64, messages: u64) -> ThreadRow {
        ThreadRow {
            started_utc: started.to_string(),
            last_utc: last.to_string(),
            max_depth,
            messages,
        }
    }

    #[test]
    fn test_absent_families_yield_none() {
        assert_eq!(reaction_stats(&FamilyRows::Absent), None);
        assert_eq!(thread_stats(&FamilyRows::Absent), None);
    }

    #[test]
    fn test_reaction_buckets_zero_filled() {
        let stats = reaction_stats(&FamilyRows::Present(vec![
            reaction("count", 0, 12),
            reaction("count", 9, 1),
            reaction("diversity", 2, 4),
            reaction("count", 10, 99),
            reaction("emoji", 1, 99),
        ]))
        .unwrap();

        assert_eq!(stats.count, [12, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(stats.diversity, [0, 0, 4, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_empty_thread_index() {
        let stats = thread_stats(&FamilyRows::Present(vec![])).unwrap();
        assert_eq!(
            stats,
            ThreadStats {
                n_threads: 0,
                lifespan_median_s: None,
                lifespan_p95_s: None,
                depth_median: None,
                depth_max: None,
                messages_total: 0,
            }
        );
    }

    #[test]
    fn test_thread_stats() {
        let stats = thread_stats(&FamilyRows::Present(vec![
            thread("2025-03-01T10:00:00+00:00", "2025-03-01T10:01:40+00:00", 1, 3),
            thread("2025-03-01T11:00:00Z", "2025-03-01T11:05:00Z", 4, 10),
            thread("not a time", "2025-03-01T12:00:00", 2, 2),
        ]))
        .unwrap();

        assert_eq!(stats.n_threads, 3);
        assert_eq!(stats.lifespan_median_s, Some(200.0));
        assert!((stats.lifespan_p95_s.unwrap() - 290.0).abs() < 1e-9);
        assert_eq!(stats.depth_median, Some(2.0));
        assert_eq!(stats.depth_max, Some(4));
        assert_eq!(stats.messages_total, 15);
    }

    #[test]
    fn test_parse_naive_instant_as_utc() {
        let ts = parse_instant("2025-03-01T12:00:00.250").unwrap();
        assert_eq!(ts.timestamp_millis() % 1000, 250);
    }
}
