//! Error taxonomy for the forecasting and optimization core.

use std::error::Error;
use std::fmt;

use crate::grid::profile::Region;

/// Errors surfaced by the core to CLI/API callers.
///
/// All variants are raised synchronously at call time. The computation is
/// deterministic and pure, so callers must not retry; the same inputs
/// reproduce the same error.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizeError {
    /// An input value violated a constructor or call-time invariant.
    Validation {
        /// Dotted field path (e.g., `"workload.deadline_hours"`).
        field: String,
        /// Human-readable constraint description.
        message: String,
    },
    /// The region identifier is not in the region profile table.
    UnknownRegion {
        /// The unrecognized identifier as supplied by the caller.
        region: String,
    },
    /// No feasible start offset exists for the workload.
    Infeasible {
        /// Explanation of which constraint emptied the feasible set.
        message: String,
    },
}

impl OptimizeError {
    /// Shorthand constructor for validation failures.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for OptimizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { field, message } => {
                write!(f, "validation error: {field}: {message}")
            }
            Self::UnknownRegion { region } => {
                write!(
                    f,
                    "unknown region \"{region}\", available: {}",
                    Region::ALL
                        .iter()
                        .map(Region::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            Self::Infeasible { message } => write!(f, "infeasible schedule: {message}"),
        }
    }
}

impl Error for OptimizeError {}
