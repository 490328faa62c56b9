//! Mesh configuration and validation.
//!
//! [`MeshConfig`] is the input for constructing a [`Mesh`](crate::Mesh).
//! [`validate()`](MeshConfig::validate) checks structural invariants before
//! any block or array is created.

use tessera_arena::ArenaConfig;
use tessera_core::Real;
use tessera_mesh::{IndexShape, UniformCartesian};

use crate::error::ConfigError;

/// Configuration of a uniform block mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshConfig {
    /// Interior cells per block along `[i, j, k]`. Axes beyond `ndim` must
    /// be 1. Default: `[16, 1, 1]`.
    pub block_cells: [usize; 3],
    /// Ghost zone width on active axes. Default: 2.
    pub num_ghost: usize,
    /// Active spatial dimensionality, 1 to 3. Default: 1.
    pub ndim: usize,
    /// Blocks per partition. `None` puts every block in one partition.
    /// Default: `None`.
    pub pack_size: Option<usize>,
    /// Cell widths `[dx1, dx2, dx3]`. Default: `[1.0; 3]`.
    pub cell_width: [Real; 3],
    /// Arena sizing.
    pub arena: ArenaConfig,
}

impl MeshConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pack_size == Some(0) {
            return Err(ConfigError::ZeroPackSize);
        }
        self.index_shape()?;
        self.coordinates()?;
        self.arena.validate()?;
        Ok(())
    }

    /// The index layout every block gets.
    pub fn index_shape(&self) -> Result<IndexShape, ConfigError> {
        Ok(IndexShape::new(self.block_cells, self.num_ghost, self.ndim)?)
    }

    /// The coordinates every block gets.
    pub fn coordinates(&self) -> Result<UniformCartesian, ConfigError> {
        Ok(UniformCartesian::new(self.cell_width)?)
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            block_cells: [16, 1, 1],
            num_ghost: 2,
            ndim: 1,
            pack_size: None,
            cell_width: [1.0; 3],
            arena: ArenaConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_mesh::MeshError;

    #[test]
    fn default_is_valid() {
        assert!(MeshConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_pack_size_rejected() {
        let cfg = MeshConfig {
            pack_size: Some(0),
            ..MeshConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroPackSize));
    }

    #[test]
    fn bad_dimensionality_rejected() {
        let cfg = MeshConfig {
            ndim: 0,
            ..MeshConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::Mesh(MeshError::InvalidDimensionality { ndim: 0 })) => {}
            other => panic!("expected InvalidDimensionality, got {other:?}"),
        }
    }

    #[test]
    fn negative_width_rejected() {
        let cfg = MeshConfig {
            cell_width: [1.0, -1.0, 1.0],
            ..MeshConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Mesh(MeshError::InvalidCellWidth { axis: 1, .. }))
        ));
    }

    #[test]
    fn arena_config_checked() {
        let mut cfg = MeshConfig::default();
        cfg.arena.max_slots = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Arena(_))));
    }
}
