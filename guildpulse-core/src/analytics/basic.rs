//! Per-user message distribution.

use serde::Serialize;

use super::stats::{gini, mean_and_population_std, population_skewness_and_excess_kurtosis};
use crate::types::DailyTotals;

/// Shape of the per-user message-count distribution over the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicStats {
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    /// Population skewness; `None` with fewer than two users
    pub skewness: Option<f64>,
    /// Population excess kurtosis; `None` with fewer than two users
    pub kurtosis: Option<f64>,
    /// Concentration of messages across users; `None` with no users
    pub gini: Option<f64>,
}

impl Default for BasicStats {
    fn default() -> Self {
        Self {
            min: 0,
            max: 0,
            mean: 0.0,
            std: 0.0,
            skewness: None,
            kurtosis: None,
            gini: None,
        }
    }
}

/// Summarize per-user message totals.
pub fn basic_distribution(totals: &[DailyTotals]) -> BasicStats {
    let counts: Vec<u64> = totals.iter().map(|t| t.messages).collect();
    let (Some(&min), Some(&max)) = (counts.iter().min(), counts.iter().max()) else {
        return BasicStats::default();
    };

    let values: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
    let (mean, std) = mean_and_population_std(&values);
    let (skewness, kurtosis) = population_skewness_and_excess_kurtosis(&values);

    BasicStats {
        min,
        max,
        mean,
        std,
        skewness,
        kurtosis,
        gini: gini(&values),
    }
}
