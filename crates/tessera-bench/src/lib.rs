//! Benchmark profiles for the Tessera field-data framework.
//!
//! - [`reference_profile`]: 8 blocks of 16³ cells, packs of 4.
//! - [`stress_profile`]: 64 blocks of 16³ cells, packs of 8.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tessera_core::{Metadata, MetadataFlag, Real};
use tessera_data::{Container, DataError, FieldDecl, Mesh, MeshConfig, Package, Packages};

/// Number of conserved components in the benchmark package.
pub const NCOMP: usize = 5;

/// A hydro-like package: one conserved vector, one derived vector, and a
/// fixed timestep estimate.
pub struct BenchHydro;

impl Package for BenchHydro {
    fn name(&self) -> &str {
        "bench_hydro"
    }

    fn fields(&self) -> Vec<FieldDecl> {
        vec![
            FieldDecl::new(
                "cons",
                Metadata::new([MetadataFlag::Independent, MetadataFlag::FillGhost]),
            )
            .with_components(NCOMP),
            FieldDecl::new("prim", Metadata::new([MetadataFlag::Derived])).with_components(NCOMP),
        ]
    }

    fn estimate_timestep(&self, _container: &Container) -> Option<Real> {
        Some(0.1)
    }
}

fn profile(nblocks: usize, pack_size: usize) -> Result<Mesh, DataError> {
    let mut packages = Packages::new();
    packages.add(BenchHydro)?;
    let config = MeshConfig {
        block_cells: [16, 16, 16],
        num_ghost: 2,
        ndim: 3,
        pack_size: Some(pack_size),
        ..MeshConfig::default()
    };
    Mesh::new(config, packages, nblocks)
}

/// 8 blocks of 16³ interior cells (32K cells), packs of 4.
pub fn reference_profile() -> Result<Mesh, DataError> {
    profile(8, 4)
}

/// 64 blocks of 16³ interior cells (~262K cells), packs of 8.
pub fn stress_profile() -> Result<Mesh, DataError> {
    profile(64, 8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_profile_builds() {
        let m = reference_profile().unwrap();
        assert_eq!(m.num_blocks(), 8);
        assert_eq!(m.num_partitions(), 2);
    }
}
