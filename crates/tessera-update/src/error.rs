//! Errors raised by the update kernels.

use std::error::Error;
use std::fmt;

use tessera_core::{PackageError, Real};
use tessera_data::DataError;

/// Errors from kernels, timestep estimation and derived-field filling.
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateError {
    /// The kernel needs block geometry or packages, but the container is
    /// not bound to a block.
    Unbound,

    /// Positional pairing of two containers (or two partitions) failed.
    MismatchedContainers {
        /// What did not line up.
        reason: String,
    },

    /// A package's timestep estimate was non-finite or non-positive.
    InvalidTimestep {
        /// Which package.
        package: String,
        /// The value it returned.
        value: Real,
    },

    /// A package's derived-field callback failed.
    Package {
        /// Which package.
        name: String,
        /// The package's error.
        source: PackageError,
    },

    /// A registered pre or post hook failed.
    Hook {
        /// `"pre"` or `"post"`.
        hook: &'static str,
        /// The hook's error.
        source: PackageError,
    },

    /// A container or collection lookup failed.
    Data(DataError),
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbound => write!(f, "container is not bound to a block"),
            Self::MismatchedContainers { reason } => {
                write!(f, "mismatched containers: {reason}")
            }
            Self::InvalidTimestep { package, value } => {
                write!(f, "package '{package}' estimated invalid timestep {value}")
            }
            Self::Package { name, source } => {
                write!(f, "package '{name}' failed to fill derived fields: {source}")
            }
            Self::Hook { hook, source } => write!(f, "{hook} hook failed: {source}"),
            Self::Data(e) => write!(f, "data error: {e}"),
        }
    }
}

impl Error for UpdateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Package { source, .. } | Self::Hook { source, .. } => Some(source),
            Self::Data(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DataError> for UpdateError {
    fn from(e: DataError) -> Self {
        Self::Data(e)
    }
}

impl From<tessera_data::VariableError> for UpdateError {
    fn from(e: tessera_data::VariableError) -> Self {
        Self::Data(e.into())
    }
}
