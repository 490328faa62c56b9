//! Blocks and the versioned block list.

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tessera_arena::Shape;
use tessera_core::{BlockId, BlockListGeneration};
use tessera_mesh::{Coordinates, IndexShape};

use crate::collection::DataCollection;
use crate::container::Container;
use crate::error::DataError;
use crate::package::Packages;

/// Immutable description of a block: identity, index layout, geometry and
/// the packages its variables come from.
///
/// Containers hold an `Arc<BlockInfo>` as their back-reference to the
/// block, which keeps the reference acyclic: the block's stages point at
/// containers, and containers point only at this description.
pub struct BlockInfo {
    id: BlockId,
    shape: IndexShape,
    coords: Box<dyn Coordinates>,
    packages: Arc<Packages>,
}

impl BlockInfo {
    /// Describe a block.
    pub fn new(
        id: BlockId,
        shape: IndexShape,
        coords: Box<dyn Coordinates>,
        packages: Arc<Packages>,
    ) -> Self {
        Self {
            id,
            shape,
            coords,
            packages,
        }
    }

    /// The block's id.
    pub fn id(&self) -> BlockId {
        self.id
    }

    /// Index ranges of the block.
    pub fn shape(&self) -> &IndexShape {
        &self.shape
    }

    /// Active spatial dimensionality.
    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    /// Face areas and cell volumes.
    pub fn coords(&self) -> &dyn Coordinates {
        self.coords.as_ref()
    }

    /// The registered packages.
    pub fn packages(&self) -> &Arc<Packages> {
        &self.packages
    }

    /// Array shape of a cell variable with `components` components on this
    /// block, ghost zones included.
    pub fn cell_shape(&self, components: usize) -> Shape {
        let [ni, nj, nk] = self.shape.entire_extents();
        [ni, nj, nk, components, 1, 1]
    }
}

impl fmt::Debug for BlockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockInfo")
            .field("id", &self.id)
            .field("shape", &self.shape)
            .field("packages", &self.packages)
            .finish_non_exhaustive()
    }
}

/// A block and its local collection of stages.
#[derive(Debug)]
pub struct MeshBlock {
    info: Arc<BlockInfo>,
    data: RwLock<DataCollection<Container>>,
}

impl MeshBlock {
    /// A block whose `"base"` stage is `base`.
    pub fn new(info: Arc<BlockInfo>, base: Container) -> Self {
        Self {
            info,
            data: RwLock::new(DataCollection::new(base)),
        }
    }

    /// The block description.
    pub fn info(&self) -> &Arc<BlockInfo> {
        &self.info
    }

    /// The block's id.
    pub fn id(&self) -> BlockId {
        self.info.id
    }

    /// Read access to the block's stages.
    pub fn data(&self) -> RwLockReadGuard<'_, DataCollection<Container>> {
        self.data.read()
    }

    /// Write access to the block's stages.
    pub fn data_mut(&self) -> RwLockWriteGuard<'_, DataCollection<Container>> {
        self.data.write()
    }

    /// The block's container for stage `name`.
    pub fn stage(&self, name: &str) -> Result<Arc<Container>, DataError> {
        self.data.read().get(name).map(Arc::clone)
    }
}

/// The mesh's ordered list of blocks.
///
/// Every mutation moves the list to a new [`BlockListGeneration`];
/// partition caches compare generations to detect that they are stale.
#[derive(Debug, Default)]
pub struct BlockList {
    blocks: Vec<Arc<MeshBlock>>,
    generation: BlockListGeneration,
    pack_size: Option<usize>,
}

impl BlockList {
    /// An empty list grouped into packs of `pack_size` blocks (`None`: one
    /// pack holding every block).
    pub fn new(pack_size: Option<usize>) -> Self {
        Self {
            blocks: Vec::new(),
            generation: BlockListGeneration::default(),
            pack_size,
        }
    }

    /// Append a block.
    pub fn push(&mut self, block: Arc<MeshBlock>) {
        self.blocks.push(block);
        self.bump();
    }

    /// Remove the block with `id`, keeping the order of the others.
    pub fn remove(&mut self, id: BlockId) -> Option<Arc<MeshBlock>> {
        let pos = self.blocks.iter().position(|b| b.id() == id)?;
        let removed = self.blocks.remove(pos);
        self.bump();
        Some(removed)
    }

    /// Reorder the blocks by `key`.
    pub fn sort_by_key<K: Ord>(&mut self, mut key: impl FnMut(&MeshBlock) -> K) {
        self.blocks.sort_by_key(|b| key(b.as_ref()));
        self.bump();
    }

    /// Change the pack size. Existing partitions become stale.
    pub fn set_pack_size(&mut self, pack_size: Option<usize>) {
        self.pack_size = pack_size;
        self.bump();
    }

    fn bump(&mut self) {
        self.generation = self.generation.next();
    }

    /// Current generation.
    pub fn generation(&self) -> BlockListGeneration {
        self.generation
    }

    /// Blocks per pack, `None` for a single pack.
    pub fn pack_size(&self) -> Option<usize> {
        self.pack_size
    }

    /// The blocks in order.
    pub fn as_slice(&self) -> &[Arc<MeshBlock>] {
        &self.blocks
    }

    /// Iterate over the blocks.
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<MeshBlock>> {
        self.blocks.iter()
    }

    /// Find a block by id.
    pub fn get(&self, id: BlockId) -> Option<&Arc<MeshBlock>> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_arena::{ArenaConfig, ArrayArena};
    use tessera_mesh::UniformCartesian;

    fn block(id: u32) -> Arc<MeshBlock> {
        let info = Arc::new(BlockInfo::new(
            BlockId(id),
            IndexShape::new([4, 1, 1], 1, 1).unwrap(),
            Box::new(UniformCartesian::unit()),
            Arc::new(Packages::new()),
        ));
        let arena = ArrayArena::new(ArenaConfig::default()).unwrap().into_shared();
        let base = Container::with_block(arena, Arc::clone(&info));
        Arc::new(MeshBlock::new(info, base))
    }

    #[test]
    fn every_mutation_bumps_generation() {
        let mut list = BlockList::new(Some(2));
        let g0 = list.generation();
        list.push(block(0));
        list.push(block(1));
        assert_eq!(list.generation(), BlockListGeneration(2));
        assert!(list.remove(BlockId(7)).is_none());
        assert_eq!(list.generation(), BlockListGeneration(2));
        list.remove(BlockId(0)).unwrap();
        list.set_pack_size(None);
        assert!(list.generation() > g0.next().next().next());
    }

    #[test]
    fn sort_reorders_blocks() {
        let mut list = BlockList::new(None);
        list.push(block(2));
        list.push(block(0));
        list.sort_by_key(|b| b.id());
        let ids: Vec<_> = list.iter().map(|b| b.id()).collect();
        assert_eq!(ids, vec![BlockId(0), BlockId(2)]);
    }

    #[test]
    fn cell_shape_includes_ghosts() {
        let b = block(0);
        assert_eq!(b.info().cell_shape(3), [6, 1, 1, 3, 1, 1]);
        assert_eq!(b.info().ndim(), 1);
    }

    #[test]
    fn base_stage_present() {
        let b = block(0);
        assert!(b.stage("base").is_ok());
        assert!(matches!(
            b.stage("stage1"),
            Err(DataError::StageNotFound { .. })
        ));
    }
}
