//! Trace export loading and schema normalisation.
//!
//! # Module Organization
//!
//! - [`constants`]: Column names, the recognised signal table, shared regexes
//! - [`models`]: `Sample`, `Series` and `SignalFamily`
//! - [`schema`]: Encoding detection and cell tokenising
//! - [`loader`]: `TraceTable`, which yields series for one entity

pub mod constants;
pub mod loader;
pub mod models;
pub mod schema;

// Re-export commonly used types
pub use loader::TraceTable;
pub use models::*;
pub use schema::{Encoding, Layout};
