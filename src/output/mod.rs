//! Writing extraction results.
//!
//! Flows, summary and inventory tables are CSV files; the summary is also
//! rendered to stdout as a table, CSV or JSON.

mod types;

pub use types::*;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::analyze::SignalInventory;

/// Rendering of the summary on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => bail!("Invalid output format: {s}. Must be one of: table, csv, json"),
        }
    }
}

/// Write rows to a CSV file, creating parent directories. The header is
/// always written, even with no rows.
fn write_csv<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    wtr.write_record(header)?;
    for row in rows {
        wtr.serialize(row)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_flows(path: &Path, rows: &[FlowRow]) -> Result<()> {
    write_csv(path, &FlowRow::HEADER, rows)
}

pub fn write_summary(path: &Path, rows: &[SummaryRow]) -> Result<()> {
    write_csv(path, &SummaryRow::HEADER, rows)
}

pub fn write_inventory(path: &Path, inventory: &SignalInventory) -> Result<()> {
    write_csv(path, &INVENTORY_HEADER, inventory.entries())
}

/// Where the inventory for an input is written: next to the summary, named
/// `<summary-stem>_inventory.csv`, or `<summary-stem>_<input-stem>_inventory.csv`
/// when several inputs share one summary.
pub fn inventory_path(summary: &Path, input: Option<&Path>) -> PathBuf {
    let stem = summary
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "summary".to_string());
    let name = match input.and_then(Path::file_stem) {
        Some(input_stem) => format!("{stem}_{}_inventory.csv", input_stem.to_string_lossy()),
        None => format!("{stem}_inventory.csv"),
    };
    summary.with_file_name(name)
}

/// Render summary rows for stdout.
pub fn render_summary(rows: &[SummaryRow], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::Csv => {
            let mut wtr = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(Vec::new());
            wtr.write_record(SummaryRow::HEADER)?;
            for row in rows {
                wtr.serialize(row)?;
            }
            let bytes = wtr.into_inner().context("Failed to flush CSV output")?;
            Ok(String::from_utf8(bytes)?)
        }
        OutputFormat::Table => Ok(render_table(rows)),
    }
}

const MAX_COLUMN_WIDTH: usize = 50;

/// Which summary columns hold numbers; those are right-aligned.
const NUMERIC_COLUMNS: [bool; 7] = [false, false, true, true, true, true, false];

/// Shorten `value` to `width` characters, marking the cut with `...`.
fn clip(value: &str, width: usize) -> String {
    if value.chars().count() <= width || width <= 3 {
        return value.to_string();
    }
    let keep: String = value.chars().take(width - 3).collect();
    format!("{keep}...")
}

/// Summary rows aligned under their header, one line per input file.
fn render_table(rows: &[SummaryRow]) -> String {
    if rows.is_empty() {
        return "(no results)\n".to_string();
    }

    let cells: Vec<Vec<String>> = rows.iter().map(SummaryRow::cells).collect();
    let widths: [usize; 7] = std::array::from_fn(|i| {
        cells
            .iter()
            .map(|row| row[i].chars().count())
            .fold(SummaryRow::HEADER[i].len(), usize::max)
            .min(MAX_COLUMN_WIDTH)
    });

    let line = |values: &[&str]| -> String {
        let fields: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let width = widths[i];
                let v = clip(v, width);
                if NUMERIC_COLUMNS[i] {
                    format!("{v:>width$}")
                } else {
                    format!("{v:<width$}")
                }
            })
            .collect();
        let mut out = fields.join("  ").trim_end().to_string();
        out.push('\n');
        out
    };

    let mut out = line(&SummaryRow::HEADER);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in &cells {
        let values: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&line(&values));
    }
    out
}
