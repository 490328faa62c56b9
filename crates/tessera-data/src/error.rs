//! Error types for variables, containers, and data collections.

use std::error::Error;
use std::fmt;

use tessera_arena::ArenaError;
use tessera_core::BlockId;
use tessera_mesh::MeshError;

use crate::variable::VariableKind;

/// Errors raised by a single [`Variable`](crate::Variable).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VariableError {
    /// Face and edge variables cannot be sparse.
    SparseUnsupported {
        /// Label of the rejected variable.
        label: String,
        /// Its kind.
        kind: VariableKind,
    },
    /// A direction outside `1..=3`.
    InvalidDirection {
        /// Label of the variable.
        label: String,
        /// The rejected direction.
        dir: usize,
    },
    /// A dimension index outside `1..=6`.
    DimensionOutOfRange {
        /// Label of the variable.
        label: String,
        /// The rejected dimension.
        dim: usize,
    },
    /// The metadata flags are inconsistent.
    InvalidMetadata {
        /// Label of the variable.
        label: String,
        /// Description of the violated rule.
        reason: String,
    },
    /// The operation needs storage, but the variable is still blank.
    NotAllocated {
        /// Label of the variable.
        label: String,
    },
    /// The variable already has storage.
    AlreadyAllocated {
        /// Label of the variable.
        label: String,
    },
    /// The operation is defined for a different kind of variable.
    KindMismatch {
        /// Label of the variable.
        label: String,
        /// Kind the operation needs.
        expected: VariableKind,
        /// Kind of the variable.
        found: VariableKind,
    },
    /// The cell variable has no flux buffers.
    NoFluxes {
        /// Label of the variable.
        label: String,
    },
    /// Communication was already allocated for this variable.
    CommsAlreadyAllocated {
        /// Label of the variable.
        label: String,
    },
    /// The variable is not bound to a block, so communication cannot be
    /// allocated.
    NoBlock {
        /// Label of the variable.
        label: String,
    },
}

impl fmt::Display for VariableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SparseUnsupported { label, kind } => {
                write!(f, "variable '{label}': sparse {kind} variables are not supported")
            }
            Self::InvalidDirection { label, dir } => {
                write!(f, "variable '{label}': direction must be 1, 2 or 3, got {dir}")
            }
            Self::DimensionOutOfRange { label, dim } => {
                write!(f, "variable '{label}': dimension must be in 1..=6, got {dim}")
            }
            Self::InvalidMetadata { label, reason } => {
                write!(f, "variable '{label}': invalid metadata: {reason}")
            }
            Self::NotAllocated { label } => write!(f, "variable '{label}' has no storage"),
            Self::AlreadyAllocated { label } => {
                write!(f, "variable '{label}' is already allocated")
            }
            Self::KindMismatch {
                label,
                expected,
                found,
            } => write!(
                f,
                "variable '{label}' is a {found} variable, operation needs a {expected} variable"
            ),
            Self::NoFluxes { label } => write!(f, "variable '{label}' has no flux buffers"),
            Self::CommsAlreadyAllocated { label } => {
                write!(f, "variable '{label}' already has boundary communication")
            }
            Self::NoBlock { label } => {
                write!(f, "variable '{label}' is not bound to a block")
            }
        }
    }
}

impl Error for VariableError {}

/// Errors in a [`MeshConfig`](crate::MeshConfig).
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `pack_size` was `Some(0)`.
    ZeroPackSize,
    /// The block shape or cell width is invalid.
    Mesh(MeshError),
    /// The arena configuration is invalid.
    Arena(ArenaError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroPackSize => {
                write!(f, "pack_size must be positive, use None for a single pack")
            }
            Self::Mesh(e) => write!(f, "mesh: {e}"),
            Self::Arena(e) => write!(f, "arena: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Mesh(e) => Some(e),
            Self::Arena(e) => Some(e),
            Self::ZeroPackSize => None,
        }
    }
}

impl From<MeshError> for ConfigError {
    fn from(e: MeshError) -> Self {
        Self::Mesh(e)
    }
}

impl From<ArenaError> for ConfigError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

/// Errors raised by containers, collections, and the mesh.
#[derive(Clone, Debug, PartialEq)]
pub enum DataError {
    /// `add` was called with an existing stage name whose container does not
    /// hold every requested field.
    NameCollision {
        /// The stage name.
        name: String,
        /// Requested fields absent from the existing stage.
        missing: Vec<String>,
    },
    /// No stage with this name.
    StageNotFound {
        /// The requested name.
        name: String,
    },
    /// No variable with this label.
    VariableNotFound {
        /// The requested label.
        label: String,
    },
    /// A variable with this label exists with a different shape, kind or
    /// metadata.
    VariableConflict {
        /// The label.
        label: String,
        /// What differs.
        reason: String,
    },
    /// A variable with this label is already present.
    DuplicateVariable {
        /// The label.
        label: String,
    },
    /// The variable is an alias, and the operation would change storage it
    /// does not own.
    AliasedVariable {
        /// The label.
        label: String,
    },
    /// A shallow initialization from a container whose arrays live in a
    /// different arena.
    ForeignArena {
        /// The label that would have been aliased.
        label: String,
    },
    /// A package with this name is already registered.
    DuplicatePackage {
        /// The package name.
        name: String,
    },
    /// The requested partition does not exist for the current block list.
    PartitionOutOfRange {
        /// Source stage label.
        label: String,
        /// The requested partition.
        id: usize,
        /// Number of partitions.
        count: usize,
    },
    /// A block index past the end of a [`MeshData`](crate::MeshData).
    BlockOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of blocks.
        count: usize,
    },
    /// No block with this id in the mesh.
    BlockNotFound {
        /// The requested id.
        id: BlockId,
    },
    /// A variable-level error.
    Variable(VariableError),
    /// An arena error while allocating, copying or resolving storage.
    Arena(ArenaError),
    /// Invalid mesh configuration.
    Config(ConfigError),
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameCollision { name, missing } => write!(
                f,
                "stage '{name}' already exists but does not contain fields {missing:?}"
            ),
            Self::StageNotFound { name } => write!(f, "stage '{name}' not found"),
            Self::VariableNotFound { label } => write!(f, "variable '{label}' not found"),
            Self::VariableConflict { label, reason } => {
                write!(f, "variable '{label}' conflicts with existing variable: {reason}")
            }
            Self::DuplicateVariable { label } => {
                write!(f, "variable '{label}' already exists")
            }
            Self::AliasedVariable { label } => {
                write!(f, "variable '{label}' is an alias and cannot change storage")
            }
            Self::ForeignArena { label } => {
                write!(f, "variable '{label}' lives in another arena and cannot be aliased")
            }
            Self::DuplicatePackage { name } => {
                write!(f, "package '{name}' is already registered")
            }
            Self::PartitionOutOfRange { label, id, count } => write!(
                f,
                "partition {id} of '{label}' out of range ({count} partitions)"
            ),
            Self::BlockOutOfRange { index, count } => {
                write!(f, "block index {index} out of range ({count} blocks)")
            }
            Self::BlockNotFound { id } => write!(f, "block {id} not found"),
            Self::Variable(e) => write!(f, "{e}"),
            Self::Arena(e) => write!(f, "arena: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl Error for DataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Variable(e) => Some(e),
            Self::Arena(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<VariableError> for DataError {
    fn from(e: VariableError) -> Self {
        Self::Variable(e)
    }
}

impl From<ArenaError> for DataError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

impl From<ConfigError> for DataError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<MeshError> for DataError {
    fn from(e: MeshError) -> Self {
        Self::Config(ConfigError::Mesh(e))
    }
}
