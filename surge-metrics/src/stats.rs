use crate::series::LatencySeries;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("no latency samples were collected")]
pub struct EmptySeriesError;

/// Descriptive statistics derived once from a finalized series.
///
/// All figures are in milliseconds except `count`, `slow_count` and
/// `slow_percentage`. `gap` is p95 minus median; its sign is not guarded.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub p99: f64,
    pub slow_count: usize,
    pub slow_percentage: f64,
    pub gap: f64,
}

impl SummaryStats {
    /// Compute statistics over a non-empty series. A sample is "slow" when it
    /// is strictly greater than `slow_threshold_ms`.
    pub fn from_series(
        series: &LatencySeries,
        slow_threshold_ms: f64,
    ) -> Result<SummaryStats, EmptySeriesError> {
        let samples = series.samples();
        if samples.is_empty() {
            return Err(EmptySeriesError);
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let variance = sorted.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / count as f64;
        let median = percentile(&sorted, 50.0);
        let p95 = percentile(&sorted, 95.0);
        let p99 = percentile(&sorted, 99.0);
        let slow_count = samples.iter().filter(|&&s| s > slow_threshold_ms).count();

        Ok(SummaryStats {
            count,
            mean,
            median,
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[count - 1],
            p95,
            p99,
            slow_count,
            slow_percentage: 100.0 * slow_count as f64 / count as f64,
            gap: p95 - median,
        })
    }
}

/// Percentile by linear interpolation between order statistics: the rank
/// `p/100 * (n - 1)` is split into its integer neighbors and the value is
/// interpolated between them. `sorted` must be non-empty and ascending.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
