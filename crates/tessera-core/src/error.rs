//! Error type returned by physics package callbacks.

use std::error::Error;
use std::fmt;

/// Errors raised by a package's derived-field or timestep callback.
///
/// Wrapped by the update layer together with the name of the package that
/// produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PackageError {
    /// The callback could not complete.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A variable the package depends on is missing from the container.
    MissingVariable {
        /// Label of the absent variable.
        label: String,
    },
}

impl fmt::Display for PackageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
            Self::MissingVariable { label } => write!(f, "missing variable '{label}'"),
        }
    }
}

impl Error for PackageError {}
