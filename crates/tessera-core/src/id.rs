//! Strongly-typed identifiers.

use std::fmt;

/// Identifies a spatial block within a mesh.
///
/// Blocks are numbered by their position in the mesh block list at the time
/// they are created (the global id). The id is stable for the lifetime of the
/// block even if the block list is later reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for BlockId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Version of a mesh block list.
///
/// Incremented every time blocks are added to, removed from, or reordered in
/// the list. Partition caches record the generation they were built from and
/// are rebuilt when it no longer matches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockListGeneration(pub u64);

impl BlockListGeneration {
    /// The generation that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for BlockListGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BlockListGeneration {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
