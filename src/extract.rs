//! End-to-end extraction for a single trace export.
//!
//! Load → filter to the receiving entity → reconstruct → summarise. Fatal
//! conditions are [`ExtractError`]s; the two degraded outcomes (no recognised
//! signal, nothing reconstructable) are reported through [`ExtractStatus`]
//! together with a [`SignalInventory`].

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::analyze::{reconstruct, searched_signals, FlowRecord, PercentileSummary, SignalInventory};
use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::trace::{Encoding, Series, TraceTable};

/// How extraction of one input ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractStatus {
    /// At least one flow record was produced.
    Complete,
    /// None of the recognised signal names was recorded under the entity.
    NoRecognizedSignal,
    /// Recognised signals exist but none yielded a start/end pair.
    NoUsableFlows,
}

impl ExtractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "ok",
            Self::NoRecognizedSignal => "no-signal",
            Self::NoUsableFlows => "no-flows",
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Everything produced for one input file.
#[derive(Debug, Clone)]
pub struct FileReport {
    /// File name of the input, used to label output rows.
    pub file: String,
    /// Entity segment the input was filtered to.
    pub entity: String,
    pub encoding: Encoding,
    pub status: ExtractStatus,
    /// Sorted by duration ascending.
    pub records: Vec<FlowRecord>,
    pub summary: PercentileSummary,
    /// Present for the degraded outcomes only.
    pub inventory: Option<SignalInventory>,
}

impl FileReport {
    /// Records whose target was not an expected byte total, so a truncated
    /// flow could pass for a completed one.
    pub fn lossy_records(&self) -> usize {
        self.records.iter().filter(|r| r.target.is_lossy()).count()
    }

    /// Operator-facing explanation of a degraded outcome.
    pub fn diagnostic(&self) -> Option<String> {
        match self.status {
            ExtractStatus::Complete => None,
            ExtractStatus::NoRecognizedSignal => Some(format!(
                "{}: none of [{}] recorded under {}",
                self.file,
                searched_signals().join(" | "),
                self.entity
            )),
            ExtractStatus::NoUsableFlows => Some(format!(
                "{}: could not derive any flow completion time under {} \
                 (signals present but no flow both started and reached its byte total)",
                self.file, self.entity
            )),
        }
    }
}

/// Extract flow completion records from a trace export on disk.
pub fn extract_file(path: &Path, config: &ExtractConfig) -> Result<FileReport, ExtractError> {
    let table = TraceTable::open(path)?;
    extract_table(&table, config)
}

/// Extract flow completion records from an already loaded table.
pub fn extract_table(table: &TraceTable, config: &ExtractConfig) -> Result<FileReport, ExtractError> {
    let entity = config.entity.segment();
    if !table.has_entity(&config.entity) {
        return Err(ExtractError::NoEntityRows {
            path: table.path().to_path_buf(),
            entity,
        });
    }

    let series: Vec<Series> = table.series(&config.entity).collect();
    debug!(
        "{}: {} series under {entity}",
        table.path().display(),
        series.len()
    );

    let any_recognised = series.iter().any(|s| s.family().is_some());
    let records = if any_recognised {
        reconstruct(&series, config)
    } else {
        Vec::new()
    };

    let status = if !any_recognised {
        ExtractStatus::NoRecognizedSignal
    } else if records.is_empty() {
        ExtractStatus::NoUsableFlows
    } else {
        ExtractStatus::Complete
    };

    let inventory = (!status.is_complete()).then(|| SignalInventory::from_series(&series));
    let summary = PercentileSummary::from_records(&records);

    let file = table
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| table.path().display().to_string());

    info!(
        "{file}: {} flows ({}, {} encoding)",
        records.len(),
        status.as_str(),
        table.encoding().as_str()
    );

    Ok(FileReport {
        file,
        entity,
        encoding: table.encoding(),
        status,
        records,
        summary,
        inventory,
    })
}
