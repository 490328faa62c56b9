//! Binding between a cell variable and the boundary-exchange layer.

use tessera_arena::ArrayHandle;
use tessera_core::BlockId;

/// Communication resource of a cell variable.
///
/// Created once by [`Container::allocate_comms`](crate::Container::allocate_comms)
/// and bound to the block that owns the variable. The exchange layer reads
/// ghost-zone data through [`buffer`](Self::buffer), which must name the
/// variable's current data array; after the data is reallocated or swapped
/// it is repointed with
/// [`Container::reset_boundary`](crate::Container::reset_boundary).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundaryComms {
    block: BlockId,
    buffer: Option<ArrayHandle>,
}

impl BoundaryComms {
    pub(crate) fn new(block: BlockId, buffer: Option<ArrayHandle>) -> Self {
        Self { block, buffer }
    }

    /// The block this resource is bound to.
    pub fn block(&self) -> BlockId {
        self.block
    }

    /// The array the exchange layer sends from, or `None` while the variable
    /// is blank.
    pub fn buffer(&self) -> Option<ArrayHandle> {
        self.buffer
    }

    pub(crate) fn repoint(&mut self, buffer: Option<ArrayHandle>) {
        self.buffer = buffer;
    }
}
