//! Time-of-week heatmap and hourly burst detection.

use std::collections::{BTreeMap, VecDeque};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use super::stats::mean_and_population_std;
use super::window::{hour_key, parse_hour_key};
use crate::types::HourlyCounts;

/// Trailing samples in the burst window.
pub const BURST_WINDOW_HOURS: usize = 24;

/// Average messages per (weekday, hour) slot; row 0 is Monday.
pub type Heatmap = [[f64; 24]; 7];

/// Temporal block of the activity report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalStats {
    pub heatmap_avg_per_hour: Heatmap,
    /// Hour key -> rolling population std over the trailing 24 hours
    pub burst_std_24h: BTreeMap<String, f64>,
    /// Share of hours in the window with no messages
    pub silence_ratio: f64,
}

/// Output of the burst detector.
#[derive(Debug, Clone, PartialEq)]
pub struct BurstSeries {
    pub std_by_hour: BTreeMap<String, f64>,
    pub silence_ratio: f64,
}

/// How many dates in `[start, end]` fall on each weekday (Monday first).
pub fn weekday_occurrences(start: NaiveDate, end: NaiveDate) -> [u32; 7] {
    let mut counts = [0u32; 7];
    for day in start.iter_days().take_while(|d| *d <= end) {
        counts[day.weekday().num_days_from_monday() as usize] += 1;
    }
    counts
}

/// Average message count per weekday/hour slot over `[start_day, end_day]`.
///
/// Each cell is divided by the number of times its weekday occurs in the
/// range (at least 1). Hours outside the range and malformed keys are
/// ignored.
pub fn temporal_heatmap(hourly: &HourlyCounts, start_day: NaiveDate, end_day: NaiveDate) -> Heatmap {
    let occurrences = weekday_occurrences(start_day, end_day);
    let mut grid: Heatmap = [[0.0; 24]; 7];

    for (key, &messages) in hourly {
        let Some(hour) = parse_hour_key(key) else {
            tracing::debug!(hour = %key, "Skipping malformed hourly key");
            continue;
        };
        let day = hour.date();
        if day < start_day || day > end_day {
            continue;
        }
        let weekday = day.weekday().num_days_from_monday() as usize;
        grid[weekday][hour.hour() as usize] += messages as f64;
    }

    for (row, &days) in grid.iter_mut().zip(occurrences.iter()) {
        let divisor = f64::from(days.max(1));
        for cell in row.iter_mut() {
            *cell /= divisor;
        }
    }
    grid
}

/// Rolling 24-hour dispersion of hourly message counts.
///
/// Walks every hour in `[start_hour, end_hour]`, filling missing hours with
/// zero. Each hour gets the population std of up to the last 24 samples, or
/// `0.0` while fewer than two samples are available.
pub fn burst_detector(hourly: &HourlyCounts, start_hour: NaiveDateTime, end_hour: NaiveDateTime) -> BurstSeries {
    let mut std_by_hour = BTreeMap::new();
    let mut window: VecDeque<f64> = VecDeque::with_capacity(BURST_WINDOW_HOURS + 1);
    let mut silent_hours = 0usize;

    let mut hour = start_hour;
    while hour <= end_hour {
        let key = hour_key(&hour);
        let messages = hourly.get(&key).copied().unwrap_or(0);
        if messages == 0 {
            silent_hours += 1;
        }

        window.push_back(messages as f64);
        if window.len() > BURST_WINDOW_HOURS {
            window.pop_front();
        }
        let std = if window.len() < 2 {
            0.0
        } else {
            mean_and_population_std(window.make_contiguous()).1
        };
        std_by_hour.insert(key, std);

        hour += Duration::hours(1);
    }

    let silence_ratio = silent_hours as f64 / std_by_hour.len().max(1) as f64;
    BurstSeries {
        std_by_hour,
        silence_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn hour(s: &str) -> NaiveDateTime {
        parse_hour_key(s).unwrap()
    }

    #[test]
    fn test_weekday_occurrences() {
        // 2025-03-03 is a Monday
        assert_eq!(weekday_occurrences(date("2025-03-03"), date("2025-03-09")), [1; 7]);
        assert_eq!(
            weekday_occurrences(date("2025-03-03"), date("2025-03-10")),
            [2, 1, 1, 1, 1, 1, 1]
        );
        assert_eq!(weekday_occurrences(date("2025-03-10"), date("2025-03-03")), [0; 7]);
    }

    #[test]
    fn test_heatmap_single_slot() {
        let hourly: HourlyCounts = [("2025-03-03T09".to_string(), 42)].into_iter().collect();
        let grid = temporal_heatmap(&hourly, date("2025-03-03"), date("2025-03-09"));

        for (weekday, row) in grid.iter().enumerate() {
            for (h, &cell) in row.iter().enumerate() {
                if weekday == 0 && h == 9 {
                    assert_eq!(cell, 42.0);
                } else {
                    assert_eq!(cell, 0.0);
                }
            }
        }
    }

    #[test]
    fn test_heatmap_averages_over_weekday_occurrences() {
        let hourly: HourlyCounts = [
            ("2025-03-03T09".to_string(), 10),
            ("2025-03-10T09".to_string(), 20),
            ("2025-03-11T23".to_string(), 5),
            // Outside the range
            ("2025-03-20T09".to_string(), 1000),
            ("not-an-hour".to_string(), 7),
        ]
        .into_iter()
        .collect();
        let grid = temporal_heatmap(&hourly, date("2025-03-03"), date("2025-03-16"));

        assert_eq!(grid[0][9], 15.0);
        assert_eq!(grid[1][23], 2.5);
        assert_eq!(grid[3][9], 0.0);
    }

    #[test]
    fn test_burst_spike_at_end() {
        let start = hour("2025-03-01T00");
        let end = hour("2025-03-02T05");
        let hourly: HourlyCounts = [("2025-03-02T05".to_string(), 100)].into_iter().collect();

        let burst = burst_detector(&hourly, start, end);
        assert_eq!(burst.std_by_hour.len(), 30);
        assert!(burst
            .std_by_hour
            .iter()
            .filter(|(k, _)| k.as_str() != "2025-03-02T05")
            .all(|(_, &std)| std == 0.0));

        // Window of 24 samples: one 100 and 23 zeros
        let expected = mean_and_population_std(&{
            let mut v = vec![0.0; 23];
            v.push(100.0);
            v
        })
        .1;
        let last = burst.std_by_hour["2025-03-02T05"];
        assert!(last > 0.0);
        assert!((last - expected).abs() < 1e-9);
        assert!((burst.silence_ratio - 29.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_burst_short_window_uses_available_samples() {
        let start = hour("2025-03-01T00");
        let end = hour("2025-03-01T01");
        let hourly: HourlyCounts = [
            ("2025-03-01T00".to_string(), 2),
            ("2025-03-01T01".to_string(), 4),
        ]
        .into_iter()
        .collect();

        let burst = burst_detector(&hourly, start, end);
        assert_eq!(burst.std_by_hour["2025-03-01T00"], 0.0);
        assert_eq!(burst.std_by_hour["2025-03-01T01"], 1.0);
        assert_eq!(burst.silence_ratio, 0.0);
    }

    #[test]
    fn test_burst_window_slides() {
        let start = hour("2025-03-01T00");
        let end = hour("2025-03-02T01");
        // Spike in the first hour falls out of the 24-sample window at T00 next day
        let hourly: HourlyCounts = [("2025-03-01T00".to_string(), 50)].into_iter().collect();

        let burst = burst_detector(&hourly, start, end);
        assert!(burst.std_by_hour["2025-03-01T23"] > 0.0);
        assert_eq!(burst.std_by_hour["2025-03-02T00"], 0.0);
    }

    #[test]
    fn test_burst_empty_range() {
        let burst = burst_detector(&HourlyCounts::new(), hour("2025-03-02T00"), hour("2025-03-01T00"));
        assert!(burst.std_by_hour.is_empty());
        assert_eq!(burst.silence_ratio, 0.0);
    }
}
