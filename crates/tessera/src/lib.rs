//! Tessera: field-data management for block-structured simulations.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Tessera sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use tessera::prelude::*;
//!
//! struct Advection;
//! impl Package for Advection {
//!     fn name(&self) -> &str { "advection" }
//!     fn fields(&self) -> Vec<FieldDecl> {
//!         vec![FieldDecl::new("q", Metadata::new([MetadataFlag::Independent]))]
//!     }
//!     fn estimate_timestep(&self, _c: &Container) -> Option<Real> { Some(0.2) }
//! }
//!
//! let mut packages = Packages::new();
//! packages.add(Advection).unwrap();
//! let config = MeshConfig { block_cells: [8, 1, 1], pack_size: Some(2), ..Default::default() };
//! let mut mesh = Mesh::new(config, packages, 4).unwrap();
//!
//! // A deep copy of every variable for the time derivative.
//! mesh.mesh_data_mut().add_deep_from_base("dudt", &[]).unwrap();
//!
//! for p in 0..mesh.num_partitions() {
//!     let state = mesh.get_or_add_by_partition(BASE_STAGE, p).unwrap();
//!     let dudt = mesh.get_or_add_by_partition("dudt", p).unwrap();
//!     tessera::update::pack::flux_divergence(&state, &dudt).unwrap();
//!     tessera::update::pack::update_mesh_data(&state, &dudt, 0.1, &state).unwrap();
//!     assert_eq!(tessera::update::pack::estimate_timestep(&state).unwrap(), 0.2);
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tessera-core` | `Real`, IDs, metadata flags, `PackageError` |
//! | [`arena`] | `tessera-arena` | `Array6`, generational handles, the shared arena |
//! | [`mesh`] | `tessera-mesh` | Index ranges, coordinates, partition helpers |
//! | [`data`] | `tessera-data` | Variables, containers, stage collections, the mesh |
//! | [`update`] | `tessera-update` | Kernels and the derived-field registry |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, IDs and metadata (`tessera-core`).
pub use tessera_core as types;

/// Array storage (`tessera-arena`).
///
/// Most users reach arrays through [`data::Container`] rather than the
/// arena directly.
pub use tessera_arena as arena;

/// Block geometry (`tessera-mesh`).
///
/// Provides [`mesh::IndexShape`] and the [`mesh::Coordinates`] trait with
/// the [`mesh::UniformCartesian`] backend.
pub use tessera_mesh as mesh;

/// Variables, containers and stage collections (`tessera-data`).
pub use tessera_data as data;

/// Update kernels (`tessera-update`).
///
/// Per-block kernels at the top level, partition-wide versions in
/// [`update::pack`].
pub use tessera_update as update;

/// Common imports for typical Tessera usage.
///
/// ```rust
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use tessera_core::{BlockId, Metadata, MetadataFlag, MetadataSet, PackageError, Real};

    // Storage
    pub use tessera_arena::{Array6, ArrayHandle, SharedArray};

    // Geometry
    pub use tessera_mesh::{Coordinates, IndexDomain, IndexShape, UniformCartesian};

    // Field data
    pub use tessera_data::{
        Container, ContainerIterator, DataCollection, DataError, FieldDecl, Mesh, MeshConfig,
        MeshData, Package, Packages, Variable, VariableKind, BASE_STAGE,
    };

    // Kernels
    pub use tessera_update::{
        average_containers, estimate_timestep, flux_divergence, update_container,
        FillDerivedRegistry, UpdateError,
    };
}
