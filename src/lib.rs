//! fctrace library - flow completion times from simulator vector exports.
//!
//! Reads the vector CSV written by a packet-level network simulator,
//! reconstructs one start/end pair per flow terminating at a receiving
//! entity, and summarises the completion-time distribution.
//!
//! # Modules
//!
//! - [`trace`] - Loading and normalising vector exports
//! - [`analyze`] - Flow reconstruction, percentiles and signal inventory
//! - [`extract`] - Single-file pipeline producing a [`FileReport`]
//! - [`batch`] - Multi-file extraction on a worker pool
//! - [`output`] - Flows, summary and inventory tables
//!
//! # Example
//!
//! ```no_run
//! use fctrace::{extract_file, EntitySelector, ExtractConfig};
//! use std::path::Path;
//!
//! let config = ExtractConfig::for_entity(EntitySelector::new("host", 0));
//! let report = extract_file(Path::new("results/vectors.csv"), &config)
//!     .expect("Failed to extract flows");
//! println!("{} flows, p50 {:?}", report.summary.count, report.summary.p50);
//! ```

pub mod analyze;
pub mod batch;
pub mod config;
pub mod error;
pub mod extract;
pub mod flow_sizes;
pub mod output;
pub mod trace;

// Re-export for convenience
pub use batch::{extract_batch, BatchOutcome};
pub use config::{EntitySelector, ExtractConfig};
pub use error::ExtractError;
pub use extract::{extract_file, extract_table, ExtractStatus, FileReport};
pub use flow_sizes::FlowSizes;
