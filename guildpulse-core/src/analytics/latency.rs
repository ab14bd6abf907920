//! Response latency percentiles from log2 histograms.

use std::collections::BTreeMap;

use serde::Serialize;

use super::stats::quantiles_from_log2_histogram;
use crate::types::{LatencyBucketRow, MAX_LATENCY_BUCKET};

const LATENCY_PROBABILITIES: [f64; 2] = [0.5, 0.95];

type LatencyHistogram = [u64; MAX_LATENCY_BUCKET + 1];

/// Median and p95 estimate for one histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencySummary {
    pub median_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    /// Number of latency samples
    pub n: u64,
}

impl LatencySummary {
    fn from_histogram(histogram: &LatencyHistogram) -> Self {
        let quantiles = quantiles_from_log2_histogram(histogram, &LATENCY_PROBABILITIES);
        Self {
            median_ms: quantiles[0],
            p95_ms: quantiles[1],
            n: histogram.iter().sum(),
        }
    }
}

/// Latency summary for a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelLatency {
    pub channel_id: i64,
    #[serde(flatten)]
    pub summary: LatencySummary,
}

/// Latency block of the activity report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencyStats {
    /// Channels with at least one sample, ordered by channel id
    pub channels: Vec<ChannelLatency>,
    pub global: LatencySummary,
}

/// Sum histogram rows per channel and globally, then estimate percentiles.
///
/// Rows with a bucket outside `0..=20` are skipped.
pub fn latency_stats(rows: &[LatencyBucketRow]) -> LatencyStats {
    let mut by_channel: BTreeMap<i64, LatencyHistogram> = BTreeMap::new();
    let mut global: LatencyHistogram = [0; MAX_LATENCY_BUCKET + 1];

    for row in rows {
        let bucket = match usize::try_from(row.bucket) {
            Ok(bucket) if bucket <= MAX_LATENCY_BUCKET => bucket,
            _ => {
                tracing::debug!(
                    channel_id = row.channel_id,
                    bucket = row.bucket,
                    "Skipping out-of-range latency bucket"
                );
                continue;
            }
        };
        let histogram = by_channel
            .entry(row.channel_id)
            .or_insert([0; MAX_LATENCY_BUCKET + 1]);
        histogram[bucket] += row.samples;
        global[bucket] += row.samples;
    }

    let channels = by_channel
        .iter()
        .filter(|(_, histogram)| histogram.iter().any(|&count| count > 0))
        .map(|(&channel_id, histogram)| ChannelLatency {
            channel_id,
            summary: LatencySummary::from_histogram(histogram),
        })
        .collect();

    LatencyStats {
        channels,
        global: LatencySummary::from_histogram(&global),
    }
}
