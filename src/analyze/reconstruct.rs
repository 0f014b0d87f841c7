//! Per-family flow completion reconstruction.
//!
//! Each signal family has one strategy: a pure function from a normalised
//! [`Series`] (plus an optional expected byte total) to at most one
//! [`FlowRecord`].

use serde::Serialize;

use crate::trace::{Sample, Series, SignalFamily};

/// Where the byte total that defines "completed" came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetSource {
    /// Expected size from the traffic configuration.
    Expected,
    /// The series' own final cumulative value.
    ///
    /// This cannot tell a truncated flow from a completed one: the last sample
    /// always matches. Records built this way are approximate.
    FinalValue,
    /// Delay-only signal; completion is the span between first and last
    /// arrival and no byte total exists.
    ArrivalSpan,
}

impl TargetSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expected => "expected",
            Self::FinalValue => "final-value",
            Self::ArrivalSpan => "arrival-span",
        }
    }

    /// Whether the record may hide a flow that never finished.
    pub fn is_lossy(&self) -> bool {
        !matches!(self, Self::Expected)
    }
}

/// One reconstructed flow completion measurement.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlowRecord {
    pub entity: String,
    pub signal: String,
    pub family: SignalFamily,
    pub start: f64,
    pub end: f64,
    /// Cumulative bytes at the completing sample; `None` for delay signals.
    pub total_bytes: Option<f64>,
    /// `end - start`, never negative.
    pub duration: f64,
    pub target: TargetSource,
}

/// A reconstruction strategy.
pub type ReconstructFn = fn(&Series, Option<f64>) -> Option<FlowRecord>;

impl SignalFamily {
    /// The reconstruction rule for this family.
    pub fn strategy(&self) -> ReconstructFn {
        match self {
            SignalFamily::CumulativeBytes => from_cumulative,
            SignalFamily::IncrementalPacketBytes => from_increments,
            SignalFamily::InterArrivalDelay => from_arrival_span,
        }
    }
}

/// Values are already a running byte total.
pub fn from_cumulative(series: &Series, expected: Option<f64>) -> Option<FlowRecord> {
    let values: Vec<f64> = series.samples().iter().map(|s| s.value).collect();
    completion(series, SignalFamily::CumulativeBytes, &values, expected)
}

/// Values are per-arrival byte counts; they are prefix-summed first.
pub fn from_increments(series: &Series, expected: Option<f64>) -> Option<FlowRecord> {
    let values = prefix_sum(series.samples());
    completion(series, SignalFamily::IncrementalPacketBytes, &values, expected)
}

/// Values are delays; only the first and last arrival times are used.
pub fn from_arrival_span(series: &Series, _expected: Option<f64>) -> Option<FlowRecord> {
    let samples = series.samples();
    let start = samples.iter().map(|s| s.time).reduce(f64::min)?;
    let end = samples.iter().map(|s| s.time).reduce(f64::max)?;
    Some(FlowRecord {
        entity: series.entity().to_string(),
        signal: series.signal().to_string(),
        family: SignalFamily::InterArrivalDelay,
        start,
        end,
        total_bytes: None,
        duration: (end - start).max(0.0),
        target: TargetSource::ArrivalSpan,
    })
}

/// Running sum of sample values.
pub fn prefix_sum(samples: &[Sample]) -> Vec<f64> {
    samples
        .iter()
        .scan(0.0, |acc, s| {
            *acc += s.value;
            Some(*acc)
        })
        .collect()
}

/// Shared start/end detection over a cumulative byte curve.
///
/// Start is the first sample with more than zero bytes. End is the first
/// sample whose total reaches the target. No record when either is missing.
fn completion(
    series: &Series,
    family: SignalFamily,
    cumulative: &[f64],
    expected: Option<f64>,
) -> Option<FlowRecord> {
    let samples = series.samples();
    let start_idx = cumulative.iter().position(|&v| v > 0.0)?;

    let (target, source) = match expected {
        Some(bytes) => (bytes, TargetSource::Expected),
        None => (*cumulative.last()?, TargetSource::FinalValue),
    };
    let end_idx = cumulative.iter().position(|&v| v >= target)?;

    let start = samples[start_idx].time;
    let end = samples[end_idx].time;
    Some(FlowRecord {
        entity: series.entity().to_string(),
        signal: series.signal().to_string(),
        family,
        start,
        end,
        total_bytes: Some(cumulative[end_idx]),
        duration: (end - start).max(0.0),
        target: source,
    })
}
