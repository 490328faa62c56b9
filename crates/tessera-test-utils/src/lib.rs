//! Test utilities and mock packages for Tessera development.
//!
//! [`TestMeshBuilder`] assembles small meshes with sensible defaults, and
//! [`fixtures`] holds packages with scripted behavior for kernel and
//! collection tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use tessera_core::Real;
use tessera_data::{Container, Mesh, MeshConfig, Package, Packages};

/// Builder for small test meshes.
///
/// Defaults: one block of 8 interior cells, 1D, one ghost cell, unit cell
/// width, no packages, a single partition.
pub struct TestMeshBuilder {
    config: MeshConfig,
    packages: Packages,
    nblocks: usize,
}

impl TestMeshBuilder {
    pub fn new() -> Self {
        Self {
            config: MeshConfig {
                block_cells: [8, 1, 1],
                num_ghost: 1,
                ..MeshConfig::default()
            },
            packages: Packages::new(),
            nblocks: 1,
        }
    }

    /// Interior cells along `[i, j, k]`; also sets `ndim` from the number
    /// of axes with more than one cell.
    pub fn cells(mut self, cells: [usize; 3]) -> Self {
        self.config.block_cells = cells;
        self.config.ndim = if cells[2] > 1 {
            3
        } else if cells[1] > 1 {
            2
        } else {
            1
        };
        self
    }

    pub fn num_ghost(mut self, num_ghost: usize) -> Self {
        self.config.num_ghost = num_ghost;
        self
    }

    pub fn cell_width(mut self, dx: [Real; 3]) -> Self {
        self.config.cell_width = dx;
        self
    }

    pub fn blocks(mut self, nblocks: usize) -> Self {
        self.nblocks = nblocks;
        self
    }

    pub fn pack_size(mut self, pack_size: Option<usize>) -> Self {
        self.config.pack_size = pack_size;
        self
    }

    /// Register a package. Panics on a duplicate name.
    pub fn package(mut self, package: impl Package) -> Self {
        self.packages
            .add(package)
            .expect("test fixture: duplicate package name");
        self
    }

    pub fn build(self) -> Mesh {
        Mesh::new(self.config, self.packages, self.nblocks).expect("test fixture: invalid mesh")
    }
}

impl Default for TestMeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Overwrite every element of `label`'s data array with `f(l, k, j, i)`.
pub fn fill_with(
    container: &Container,
    label: &str,
    f: impl Fn(usize, usize, usize, usize) -> Real,
) {
    let array = container.data(label).expect("test fixture: unknown variable");
    write_all(&mut array.write(), f);
}

/// Overwrite every element of `label`'s flux along `dir` with `f(l, k, j, i)`.
pub fn fill_flux_with(
    container: &Container,
    label: &str,
    dir: usize,
    f: impl Fn(usize, usize, usize, usize) -> Real,
) {
    let array = container
        .flux(label, dir)
        .expect("test fixture: variable has no flux");
    write_all(&mut array.write(), f);
}

fn write_all(array: &mut tessera_arena::Array6, f: impl Fn(usize, usize, usize, usize) -> Real) {
    let [ni, nj, nk, nl, ..] = array.dims();
    for l in 0..nl {
        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    array.set(l, k, j, i, f(l, k, j, i));
                }
            }
        }
    }
}
