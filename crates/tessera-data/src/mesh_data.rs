//! [`MeshData`]: one stage across a set of blocks.

use std::sync::Arc;

use tessera_core::BlockId;

use crate::block::MeshBlock;
use crate::collection::StageData;
use crate::container::Container;
use crate::error::DataError;

/// The containers of one stage for a group of blocks.
///
/// A `MeshData` is either the whole mesh (the mesh-level `"base"` stage and
/// stages derived from it) or one partition of the block list. Container
/// `b` belongs to block `b`; both vectors have the same length.
#[derive(Debug, Default)]
pub struct MeshData {
    blocks: Vec<Arc<MeshBlock>>,
    block_data: Vec<Arc<Container>>,
}

impl MeshData {
    /// A `MeshData` covering no blocks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to `blocks`, taking each block's stage `label`.
    pub fn set(blocks: &[Arc<MeshBlock>], label: &str) -> Result<Self, DataError> {
        let block_data = blocks
            .iter()
            .map(|b| b.stage(label))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            blocks: blocks.to_vec(),
            block_data,
        })
    }

    /// Number of blocks.
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// The blocks in order.
    pub fn blocks(&self) -> &[Arc<MeshBlock>] {
        &self.blocks
    }

    /// Ids of the blocks in order.
    pub fn block_ids(&self) -> Vec<BlockId> {
        self.blocks.iter().map(|b| b.id()).collect()
    }

    /// The container of the `b`-th block.
    pub fn block_data(&self, b: usize) -> Result<&Arc<Container>, DataError> {
        self.block_data.get(b).ok_or(DataError::BlockOutOfRange {
            index: b,
            count: self.block_data.len(),
        })
    }

    /// Blocks paired with their containers.
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<MeshBlock>, &Arc<Container>)> {
        self.blocks.iter().zip(&self.block_data)
    }

    /// Whether every block's container holds all of `labels`.
    pub fn contains(&self, labels: &[&str]) -> bool {
        self.block_data.iter().all(|c| c.contains(labels))
    }

    /// Take `labels` (all when empty) of `src` for every block of `src`.
    ///
    /// Any blocks previously held are replaced.
    pub fn initialize(
        &mut self,
        src: &MeshData,
        labels: &[&str],
        shallow: bool,
    ) -> Result<(), DataError> {
        let block_data = src
            .block_data
            .iter()
            .map(|c| c.derive(labels, shallow).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        self.blocks = src.blocks.clone();
        self.block_data = block_data;
        Ok(())
    }
}

impl StageData for MeshData {
    fn missing_fields(&self, labels: &[&str]) -> Vec<String> {
        let mut missing: Vec<String> = Vec::new();
        for c in &self.block_data {
            for label in c.missing(labels) {
                if !missing.contains(&label) {
                    missing.push(label);
                }
            }
        }
        missing
    }

    fn derive(&self, labels: &[&str], shallow: bool) -> Result<Self, DataError> {
        let mut out = MeshData::new();
        out.initialize(self, labels, shallow)?;
        Ok(out)
    }

    /// Register each block's container under `name` in that block's own
    /// collection, so both levels resolve `name` to the same containers.
    fn on_registered(&self, name: &str) {
        for (block, container) in self.iter() {
            block.data_mut().set(name, Arc::clone(container));
        }
    }
}
