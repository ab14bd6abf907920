//! Statistical primitives shared by the metric assemblers.
//!
//! All functions are total over non-negative input: empty samples, zero
//! totals, and zero variance map to `0.0` or `None` instead of panicking or
//! producing NaN.

/// Gini coefficient of a non-negative distribution.
///
/// Returns `None` for an empty sample and `0.0` when every value is zero.
/// Negative and NaN values are ignored.
pub fn gini(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| *v >= 0.0).collect();
    if sorted.is_empty() {
        return None;
    }
    let total: f64 = sorted.iter().sum();
    if total == 0.0 {
        return Some(0.0);
    }
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len() as f64;
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, v)| (i + 1) as f64 * v)
        .sum();
    Some(2.0 * weighted / (n * total) - (n + 1.0) / n)
}

/// Arithmetic mean and population (divide-by-n) standard deviation.
pub fn mean_and_population_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Population skewness and excess kurtosis.
///
/// `(None, None)` below two samples, `(0, 0)` when the spread is zero.
pub fn population_skewness_and_excess_kurtosis(values: &[f64]) -> (Option<f64>, Option<f64>) {
    if values.len() < 2 {
        return (None, None);
    }
    let (mean, std) = mean_and_population_std(values);
    if std == 0.0 {
        return (Some(0.0), Some(0.0));
    }

    let n = values.len() as f64;
    let (m3, m4) = values.iter().fold((0.0, 0.0), |(m3, m4), x| {
        let z = (x - mean) / std;
        (m3 + z.powi(3), m4 + z.powi(4))
    });
    (Some(m3 / n), Some(m4 / n - 3.0))
}

/// Quantiles from a log2-bucketed histogram.
///
/// Bucket `i` counts samples in `[2^i, 2^(i+1))`. For each probability the
/// result is the lower edge `2^i` of the first bucket whose cumulative
/// fraction reaches it. This is a discrete lower-bound estimate, not an
/// interpolated quantile. Every entry is `None` when the histogram is empty.
pub fn quantiles_from_log2_histogram(histogram: &[u64], probabilities: &[f64]) -> Vec<Option<f64>> {
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return vec![None; probabilities.len()];
    }

    let mut cumulative = 0u64;
    let cdf: Vec<f64> = histogram
        .iter()
        .map(|count| {
            cumulative += count;
            cumulative as f64 / total as f64
        })
        .collect();

    probabilities
        .iter()
        .map(|&p| {
            let bucket = cdf.iter().take_while(|&&fraction| fraction < p).count();
            Some(2f64.powi(bucket as i32))
        })
        .collect()
}

/// Element at index `n / 2` of the ascending-sorted sample.
///
/// Even-sized samples report the upper of the middle pair.
pub fn upper_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(sorted[sorted.len() / 2])
}

/// Percentile with linear interpolation between closest ranks.
///
/// `pct` is in `[0, 100]`; the median is `percentile(values, 50.0)`.
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}
