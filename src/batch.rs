//! Extraction over many inputs on a worker pool.
//!
//! Every input is independent: failures are captured per file and results
//! come back in input order regardless of completion order.

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;

use tracing::{debug, warn};
use workerpool::thunk::{Thunk, ThunkWorker};
use workerpool::Pool;

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::extract::{extract_file, FileReport};

/// Result of extracting one input of a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub path: PathBuf,
    pub result: Result<FileReport, ExtractError>,
}

impl BatchOutcome {
    /// File name used to label rows for this input.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn is_complete(&self) -> bool {
        matches!(&self.result, Ok(report) if report.status.is_complete())
    }
}

/// Extract every path with up to `jobs` workers.
pub fn extract_batch(paths: &[PathBuf], config: Arc<ExtractConfig>, jobs: usize) -> Vec<BatchOutcome> {
    let jobs = jobs.clamp(1, paths.len().max(1));
    debug!("extracting {} inputs with {jobs} workers", paths.len());

    let pool = Pool::<ThunkWorker<(usize, Result<FileReport, ExtractError>)>>::new(jobs);
    let (tx, rx) = mpsc::channel();

    for (idx, path) in paths.iter().enumerate() {
        let config = config.clone();
        let path = path.clone();
        pool.execute_to(
            tx.clone(),
            Thunk::of(move || (idx, extract_file(&path, &config))),
        );
    }
    drop(tx);
    pool.join();

    let mut slots: Vec<Option<Result<FileReport, ExtractError>>> =
        paths.iter().map(|_| None).collect();
    for (idx, result) in rx.iter() {
        slots[idx] = Some(result);
    }

    paths
        .iter()
        .zip(slots)
        .map(|(path, slot)| {
            let result = slot.unwrap_or_else(|| {
                warn!("{}: worker exited without a result", path.display());
                Err(ExtractError::Read {
                    path: path.clone(),
                    message: "extraction worker panicked".to_string(),
                })
            });
            BatchOutcome {
                path: path.clone(),
                result,
            }
        })
        .collect()
}
