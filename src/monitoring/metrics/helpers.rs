//! Helper functions for metrics calculations

use super::types::MetricSummary;

/// Nearest-rank percentile over sorted values
///
/// Index is `floor(p * n) - 1`, clamped to `[0, n - 1]`; an empty slice yields 0.
pub(crate) fn calculate_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let n = sorted_values.len();
    let rank = (percentile * n as f64).floor() as i64 - 1;
    let index = rank.clamp(0, n as i64 - 1) as usize;
    sorted_values.get(index).copied().unwrap_or(0.0)
}

/// Calculate average of f64 values
pub(crate) fn calculate_average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Sort finite values ascending
pub(crate) fn sorted_finite<I: IntoIterator<Item = f64>>(values: I) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

/// Summary of a set of observations; zero-valued when there are none
pub(crate) fn summarize(values: Vec<f64>, unit: Option<String>) -> MetricSummary {
    let sorted = sorted_finite(values);

    MetricSummary {
        count: sorted.len(),
        avg: calculate_average(&sorted),
        min: sorted.first().copied().unwrap_or(0.0),
        max: sorted.last().copied().unwrap_or(0.0),
        p95: calculate_percentile(&sorted, 0.95),
        unit,
    }
}
