//! Error types for trace extraction.
//!
//! Every variant carries enough context (file path, entity, column names) for
//! the message alone to tell an operator which precondition is missing.
//! Degraded-but-reportable outcomes such as "no recognised signal" are not
//! errors; see [`crate::extract::ExtractStatus`].

use std::fmt;
use std::path::PathBuf;

/// Fatal extraction failures for a single input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The trace export does not exist.
    InputNotFound { path: PathBuf },
    /// The trace export could not be read.
    Read { path: PathBuf, message: String },
    /// The table header matches neither the wide nor the row-wise layout.
    MissingColumns {
        path: PathBuf,
        missing: Vec<&'static str>,
        found: Vec<String>,
    },
    /// No vector row belongs to the target entity.
    NoEntityRows { path: PathBuf, entity: String },
    /// The traffic configuration fragment could not be read.
    FlowConfig { path: PathBuf, message: String },
}

impl ExtractError {
    /// Short machine-friendly tag used in the summary `status` column.
    pub fn status_tag(&self) -> &'static str {
        match self {
            ExtractError::NoEntityRows { .. } => "no-entity-rows",
            _ => "error",
        }
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::InputNotFound { path } => {
                write!(f, "vectors CSV not found: {}", path.display())
            }
            ExtractError::Read { path, message } => {
                write!(f, "failed to read {}: {message}", path.display())
            }
            ExtractError::MissingColumns {
                path,
                missing,
                found,
            } => {
                write!(
                    f,
                    "{}: missing column(s) [{}]; header has [{}]",
                    path.display(),
                    missing.join(", "),
                    found.join(", ")
                )
            }
            ExtractError::NoEntityRows { path, entity } => {
                write!(f, "no vectors under {entity} in {}", path.display())
            }
            ExtractError::FlowConfig { path, message } => {
                write!(
                    f,
                    "failed to read flow configuration {}: {message}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for ExtractError {}
