//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use crate::handle::ArrayHandle;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The slot limit is reached; no more arrays can be allocated.
    CapacityExceeded {
        /// The configured slot limit.
        max_slots: u32,
    },
    /// A handle whose array has been freed by its owner.
    StaleHandle {
        /// The offending handle.
        handle: ArrayHandle,
        /// Current generation of the slot the handle points into.
        current_generation: u32,
    },
    /// A handle that points outside the slot table.
    InvalidHandle {
        /// The offending handle.
        handle: ArrayHandle,
    },
    /// The arena configuration is invalid.
    InvalidConfig {
        /// Description of the violated invariant.
        reason: String,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { max_slots } => {
                write!(f, "arena capacity exceeded: {max_slots} live arrays")
            }
            Self::StaleHandle {
                handle,
                current_generation,
            } => {
                write!(
                    f,
                    "stale handle {handle}: slot is at generation {current_generation}"
                )
            }
            Self::InvalidHandle { handle } => write!(f, "invalid handle {handle}"),
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
        }
    }
}

impl Error for ArenaError {}
