//! [`Mesh`]: the block list and the mesh-level stage collection.

use std::sync::Arc;

use tessera_arena::{ArrayArena, SharedArena};
use tessera_core::{BlockId, MetadataFlag};
use tessera_mesh::{IndexShape, UniformCartesian};

use crate::block::{BlockInfo, BlockList, MeshBlock};
use crate::collection::{DataCollection, BASE_STAGE};
use crate::config::MeshConfig;
use crate::container::Container;
use crate::error::{ConfigError, DataError};
use crate::mesh_data::MeshData;
use crate::package::Packages;

/// A uniform mesh of equally shaped blocks.
///
/// Each block starts with a `"base"` container holding every variable the
/// packages declare. The mesh-level collection's `"base"` stage spans all
/// blocks and is rebuilt whenever the block list changes.
pub struct Mesh {
    config: MeshConfig,
    shape: IndexShape,
    coords: UniformCartesian,
    arena: SharedArena,
    packages: Arc<Packages>,
    block_list: BlockList,
    mesh_data: DataCollection<MeshData>,
    next_id: u32,
}

impl Mesh {
    /// Validate `config` and create `nblocks` blocks.
    pub fn new(config: MeshConfig, packages: Packages, nblocks: usize) -> Result<Self, DataError> {
        config.validate()?;
        let shape = config.index_shape()?;
        let coords = config.coordinates()?;
        let arena = ArrayArena::new(config.arena.clone())?.into_shared();
        let mut mesh = Self {
            block_list: BlockList::new(config.pack_size),
            config,
            shape,
            coords,
            arena,
            packages: Arc::new(packages),
            mesh_data: DataCollection::new(MeshData::new()),
            next_id: 0,
        };
        for _ in 0..nblocks {
            let block = mesh.build_block()?;
            mesh.block_list.push(block);
        }
        mesh.refresh_base()?;
        tracing::debug!(
            blocks = nblocks,
            packages = mesh.packages.len(),
            arrays = mesh.arena.live_count(),
            bytes = mesh.arena.memory_bytes(),
            "mesh created"
        );
        Ok(mesh)
    }

    fn build_block(&mut self) -> Result<Arc<MeshBlock>, DataError> {
        let id = BlockId(self.next_id);
        let info = Arc::new(BlockInfo::new(
            id,
            self.shape.clone(),
            Box::new(self.coords.clone()),
            Arc::clone(&self.packages),
        ));
        let mut base = Container::with_block(Arc::clone(&self.arena), Arc::clone(&info));
        for package in self.packages.iter() {
            for decl in package.fields() {
                let shape = info.cell_shape(decl.components);
                let fill_ghost = decl.metadata.is_set(MetadataFlag::FillGhost);
                if decl.metadata.is_set(MetadataFlag::Face) {
                    base.add_face(decl.label, shape, decl.metadata)?;
                } else if decl.metadata.is_set(MetadataFlag::Edge) {
                    base.add_edge(decl.label, shape, decl.metadata)?;
                } else {
                    base.add(decl.label.clone(), shape, decl.metadata)?;
                    if fill_ghost {
                        base.allocate_comms(&decl.label)?;
                    }
                }
            }
        }
        self.next_id += 1;
        Ok(Arc::new(MeshBlock::new(info, base)))
    }

    fn refresh_base(&mut self) -> Result<(), DataError> {
        let base = MeshData::set(self.block_list.as_slice(), BASE_STAGE)?;
        self.mesh_data.set(BASE_STAGE, Arc::new(base));
        Ok(())
    }

    /// Append a new block.
    pub fn add_block(&mut self) -> Result<BlockId, DataError> {
        let block = self.build_block()?;
        let id = block.id();
        self.block_list.push(block);
        self.refresh_base()?;
        Ok(id)
    }

    /// Remove the block with `id`.
    pub fn remove_block(&mut self, id: BlockId) -> Result<(), DataError> {
        self.block_list
            .remove(id)
            .ok_or(DataError::BlockNotFound { id })?;
        self.refresh_base()
    }

    /// Change the number of blocks per partition.
    pub fn set_pack_size(&mut self, pack_size: Option<usize>) -> Result<(), DataError> {
        if pack_size == Some(0) {
            return Err(ConfigError::ZeroPackSize.into());
        }
        self.block_list.set_pack_size(pack_size);
        Ok(())
    }

    /// The configuration the mesh was built from.
    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// The arena holding every block's arrays.
    pub fn arena(&self) -> &SharedArena {
        &self.arena
    }

    /// The registered packages.
    pub fn packages(&self) -> &Arc<Packages> {
        &self.packages
    }

    /// The block list.
    pub fn block_list(&self) -> &BlockList {
        &self.block_list
    }

    /// Number of blocks.
    pub fn num_blocks(&self) -> usize {
        self.block_list.len()
    }

    /// Blocks per partition, `None` for a single partition.
    pub fn default_pack_size(&self) -> Option<usize> {
        self.block_list.pack_size()
    }

    /// Number of partitions the current block list splits into.
    pub fn num_partitions(&self) -> usize {
        let n = self.block_list.len();
        match self.block_list.pack_size() {
            _ if n == 0 => 0,
            Some(p) => n.div_ceil(p),
            None => 1,
        }
    }

    /// The block with `id`.
    pub fn block(&self, id: BlockId) -> Result<&Arc<MeshBlock>, DataError> {
        self.block_list
            .get(id)
            .ok_or(DataError::BlockNotFound { id })
    }

    /// The mesh-level stages.
    pub fn mesh_data(&self) -> &DataCollection<MeshData> {
        &self.mesh_data
    }

    /// Mutable access to the mesh-level stages.
    pub fn mesh_data_mut(&mut self) -> &mut DataCollection<MeshData> {
        &mut self.mesh_data
    }

    /// Partition `id` of stage `label`, built from the current block list.
    pub fn get_or_add_by_partition(
        &mut self,
        label: &str,
        id: usize,
    ) -> Result<Arc<MeshData>, DataError> {
        self.mesh_data
            .get_or_add_by_partition(&self.block_list, label, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{FieldDecl, Package};
    use tessera_core::Metadata;

    struct Hydro;

    impl Package for Hydro {
        fn name(&self) -> &str {
            "hydro"
        }

        fn fields(&self) -> Vec<FieldDecl> {
            vec![
                FieldDecl::new(
                    "cons",
                    Metadata::new([MetadataFlag::Independent, MetadataFlag::FillGhost]),
                )
                .with_components(5),
                FieldDecl::new("prim", Metadata::new([MetadataFlag::Derived])).with_components(5),
                FieldDecl::new("bface", Metadata::new([MetadataFlag::Face])),
            ]
        }
    }

    fn mesh(nblocks: usize) -> Mesh {
        let mut packages = Packages::new();
        packages.add(Hydro).unwrap();
        let cfg = MeshConfig {
            block_cells: [8, 1, 1],
            pack_size: Some(2),
            ..MeshConfig::default()
        };
        Mesh::new(cfg, packages, nblocks).unwrap()
    }

    #[test]
    fn blocks_get_declared_variables() {
        let m = mesh(2);
        let base = m.block(BlockId(1)).unwrap().stage(BASE_STAGE).unwrap();
        assert_eq!(base.labels().collect::<Vec<_>>(), vec!["bface", "cons", "prim"]);
        assert_eq!(base.get("cons").unwrap().shape(), [12, 1, 1, 5, 1, 1]);
        assert!(base.get("cons").unwrap().comms().is_some());
        assert!(base.get("prim").unwrap().comms().is_none());
    }

    #[test]
    fn mesh_base_spans_all_blocks() {
        let mut m = mesh(3);
        assert_eq!(m.mesh_data().get_base().num_blocks(), 3);
        let id = m.add_block().unwrap();
        assert_eq!(id, BlockId(3));
        assert_eq!(m.mesh_data().get_base().num_blocks(), 4);
        m.remove_block(BlockId(0)).unwrap();
        assert_eq!(
            m.mesh_data().get_base().block_ids(),
            vec![BlockId(1), BlockId(2), BlockId(3)]
        );
        assert!(matches!(
            m.remove_block(BlockId(0)),
            Err(DataError::BlockNotFound { .. })
        ));
    }

    #[test]
    fn num_partitions_rounds_up() {
        let mut m = mesh(5);
        assert_eq!(m.num_partitions(), 3);
        m.set_pack_size(None).unwrap();
        assert_eq!(m.num_partitions(), 1);
        assert!(m.set_pack_size(Some(0)).is_err());
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = MeshConfig {
            block_cells: [8, 4, 1],
            ..MeshConfig::default()
        };
        assert!(matches!(
            Mesh::new(cfg, Packages::new(), 1),
            Err(DataError::Config(ConfigError::Mesh(_)))
        ));
    }
}
