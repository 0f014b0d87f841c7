use serde::Serialize;

use super::FlowRecord;

/// Percentile ranks reported in every summary.
pub const SUMMARY_QUANTILES: [f64; 3] = [0.50, 0.95, 0.99];

/// Count and completion-duration percentiles over one input.
///
/// Percentiles are `None` when there are no records; they are never NaN or
/// infinite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentileSummary {
    pub count: usize,
    pub p50: Option<f64>,
    pub p95: Option<f64>,
    pub p99: Option<f64>,
}

impl PercentileSummary {
    pub fn from_records(records: &[FlowRecord]) -> Self {
        let durations: Vec<f64> = records.iter().map(|r| r.duration).collect();
        Self::from_durations(&durations)
    }

    pub fn from_durations(durations: &[f64]) -> Self {
        let mut sorted: Vec<f64> = durations.iter().copied().filter(|d| d.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);
        let [p50, p95, p99] = SUMMARY_QUANTILES.map(|q| percentile(&sorted, q));
        Self {
            count: sorted.len(),
            p50,
            p95,
            p99,
        }
    }

    pub fn empty() -> Self {
        Self::from_durations(&[])
    }
}

/// Linear-interpolation percentile of an ascending slice.
///
/// `q` is a fraction in `[0, 1]`. The rank `q * (n - 1)` is split into the
/// two bracketing order statistics and interpolated between them. A
/// non-finite result is `None`.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = q.clamp(0.0, 1.0) * last as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    let value = if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    };
    Some(value).filter(|v| v.is_finite())
}
