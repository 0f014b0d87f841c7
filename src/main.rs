//! fctrace: extract flow completion times from simulator vector exports
//!
//! Takes one or more vector CSV files, reconstructs the flows received by one
//! entity in each, and writes per-flow and per-file summary tables.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fctrace::output::{self, FlowRow, OutputFormat, SummaryRow};
use fctrace::{extract_batch, BatchOutcome, EntitySelector, ExtractConfig, FlowSizes};

#[derive(Parser)]
#[command(name = "fctrace")]
#[command(about = "Extract flow completion times from simulator vector exports")]
#[command(version)]
struct Cli {
    /// Vector CSV exports to analyse
    #[arg(long, num_args = 1.., required = true)]
    vectors: Vec<PathBuf>,

    /// Index of the receiving entity
    #[arg(long, default_value_t = 0)]
    rx_host: u32,

    /// Module kind of the receiving entity
    #[arg(long, default_value = "host")]
    entity_kind: String,

    /// Per-flow output table
    #[arg(long, default_value = "results/fct_flows.csv")]
    out_flows: PathBuf,

    /// Per-file summary table
    #[arg(long, default_value = "results/fct_summary.csv")]
    out_summary: PathBuf,

    /// Traffic configuration fragment with per-flow sendBytes
    #[arg(long)]
    flows_config: Option<PathBuf>,

    /// Skip byte-based reconstruction for flows without an expected total
    #[arg(long)]
    require_expected: bool,

    /// Number of files processed in parallel
    #[arg(short, long, default_value_t = 4)]
    jobs: usize,

    /// Summary output format: table, csv, json
    #[arg(short, long, default_value = "table")]
    format: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_config(cli: &Cli) -> Result<ExtractConfig> {
    let flow_sizes = match &cli.flows_config {
        Some(path) => FlowSizes::load(path)?,
        None => FlowSizes::default(),
    };
    Ok(ExtractConfig {
        entity: EntitySelector::new(cli.entity_kind.clone(), cli.rx_host),
        flow_sizes,
        require_expected_total: cli.require_expected,
    })
}

/// Write the inventory of a degraded input and tell the operator why it has
/// no flows.
fn report_degraded(outcome: &BatchOutcome, summary: &Path, batch: bool) -> Result<()> {
    match &outcome.result {
        Ok(report) => {
            if let Some(msg) = report.diagnostic() {
                eprintln!("[ERR] {msg}");
            }
            if let Some(inventory) = &report.inventory {
                let input = batch.then_some(outcome.path.as_path());
                let path = output::inventory_path(summary, input);
                output::write_inventory(&path, inventory)?;
                eprintln!(
                    "[ok] wrote signal inventory ({} series) -> {}",
                    inventory.len(),
                    path.display()
                );
            }
        }
        Err(e) => eprintln!("[ERR] {e}"),
    }
    Ok(())
}

fn run(cli: Cli) -> Result<ExitCode> {
    let format: OutputFormat = cli.format.parse()?;

    let missing: Vec<String> = cli
        .vectors
        .iter()
        .filter(|p| !p.is_file())
        .map(|p| p.display().to_string())
        .collect();
    if !missing.is_empty() {
        bail!("vectors CSV not found: {}", missing.join(", "));
    }

    let config = Arc::new(build_config(&cli)?);
    let outcomes = extract_batch(&cli.vectors, config.clone(), cli.jobs);
    let batch = outcomes.len() > 1;
    let entity = config.entity.segment();

    let mut flows = Vec::new();
    let mut lossy = 0;
    let mut summary = Vec::with_capacity(outcomes.len());
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => {
                flows.extend(FlowRow::from_report(report));
                lossy += report.lossy_records();
                summary.push(SummaryRow::from_report(report));
            }
            Err(e) => summary.push(SummaryRow::from_error(&outcome.file_name(), &entity, e)),
        }
        if !outcome.is_complete() {
            report_degraded(outcome, &cli.out_summary, batch)?;
        }
    }

    output::write_flows(&cli.out_flows, &flows)?;
    let lossy_note = if lossy > 0 {
        format!(" ({lossy} without an expected byte total)")
    } else {
        String::new()
    };
    eprintln!(
        "[ok] wrote {} flow records{lossy_note} -> {}",
        flows.len(),
        cli.out_flows.display()
    );
    output::write_summary(&cli.out_summary, &summary)?;
    eprintln!(
        "[ok] wrote {} summary rows -> {}",
        summary.len(),
        cli.out_summary.display()
    );

    print!("{}", output::render_summary(&summary, format)?);
    if format == OutputFormat::Json {
        println!();
    }

    if outcomes.iter().all(BatchOutcome::is_complete) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[ERR] {e:#}");
            ExitCode::FAILURE
        }
    }
}
