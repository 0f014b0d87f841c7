//! Row types written to the flows and summary tables.
//!
//! Undefined values are `None` and serialise as empty CSV cells or JSON
//! `null`.

use serde::Serialize;

use crate::analyze::{FlowRecord, TargetSource};
use crate::error::ExtractError;
use crate::extract::FileReport;
use crate::trace::SignalFamily;

/// One reconstructed flow, labelled with the input it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowRow {
    pub file: String,
    pub entity: String,
    pub signal: String,
    pub family: SignalFamily,
    pub start: f64,
    pub end: f64,
    pub total_bytes: Option<f64>,
    pub duration: f64,
    pub target: TargetSource,
}

impl FlowRow {
    pub const HEADER: [&'static str; 9] = [
        "file",
        "entity",
        "signal",
        "family",
        "start",
        "end",
        "total_bytes",
        "duration",
        "target",
    ];

    pub fn new(file: &str, record: &FlowRecord) -> Self {
        Self {
            file: file.to_string(),
            entity: record.entity.clone(),
            signal: record.signal.clone(),
            family: record.family,
            start: record.start,
            end: record.end,
            total_bytes: record.total_bytes,
            duration: record.duration,
            target: record.target,
        }
    }

    /// Rows for every record of a report, keeping the report's order.
    pub fn from_report(report: &FileReport) -> Vec<Self> {
        report
            .records
            .iter()
            .map(|r| Self::new(&report.file, r))
            .collect()
    }
}

/// One summary line per input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub file: String,
    pub entity: String,
    pub count: usize,
    pub p50: Option<f64>,
    pub p95: Option<f64>,
    pub p99: Option<f64>,
    pub status: String,
}

impl SummaryRow {
    pub const HEADER: [&'static str; 7] = ["file", "entity", "count", "p50", "p95", "p99", "status"];

    pub fn from_report(report: &FileReport) -> Self {
        Self {
            file: report.file.clone(),
            entity: report.entity.clone(),
            count: report.summary.count,
            p50: report.summary.p50,
            p95: report.summary.p95,
            p99: report.summary.p99,
            status: report.status.as_str().to_string(),
        }
    }

    /// A zero-count row for an input that failed before reconstruction.
    pub fn from_error(file: &str, entity: &str, err: &ExtractError) -> Self {
        Self {
            file: file.to_string(),
            entity: entity.to_string(),
            count: 0,
            p50: None,
            p95: None,
            p99: None,
            status: err.status_tag().to_string(),
        }
    }

    /// Cell strings for table rendering; undefined values show as `-`.
    pub fn cells(&self) -> Vec<String> {
        let opt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
        vec![
            self.file.clone(),
            self.entity.clone(),
            self.count.to_string(),
            opt(self.p50),
            opt(self.p95),
            opt(self.p99),
            self.status.clone(),
        ]
    }
}

/// Header of the inventory table.
pub const INVENTORY_HEADER: [&str; 3] = ["entity", "signal", "samples"];
