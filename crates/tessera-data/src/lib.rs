//! Field-data management for Tessera: variables, containers, and staged
//! collections.
//!
//! # Layers
//!
//! ```text
//! Mesh
//! ├── BlockList (versioned) ── MeshBlock ── RwLock<DataCollection<Container>>
//! └── DataCollection<MeshData>   "base", derived stages, "{label}_part-{k}"
//!                                   └── MeshData ── Arc<Container> per block
//! Container ── label → Variable (Owned | Alias) ── ArrayHandle ── ArrayArena
//! ```
//!
//! - A [`Variable`] is a label, [`Metadata`](tessera_core::Metadata), a
//!   shape, and handles into the shared [`ArrayArena`](tessera_arena::ArrayArena).
//! - A [`Container`] is one block's variables. It either owns a variable's
//!   arrays or aliases arrays owned by another container.
//! - A [`ContainerIterator`] is a metadata-filtered, label-ordered view of a
//!   container; kernels pair input and output variables by position.
//! - A [`DataCollection`] names the stages of a block (or of the mesh) and
//!   derives new stages by aliasing or copying variables.
//!
//! # Aliasing
//!
//! A shallow stage shares arrays with its source: a write through either
//! is seen by both. A deep stage owns copies and is isolated. Each array
//! lives as long as its one owning container; an alias that outlives it
//! reports [`ArenaError::StaleHandle`](tessera_arena::ArenaError::StaleHandle)
//! instead of reading freed memory.
//!
//! # Concurrency
//!
//! Collections are mutated through `&mut self` and are not meant to be
//! shared between threads while they change. Array data is behind
//! per-array locks, so kernels may process different blocks in parallel.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod block;
pub mod collection;
pub mod comms;
pub mod config;
pub mod container;
pub mod error;
pub mod iterator;
pub mod mesh;
pub mod mesh_data;
pub mod package;
pub mod variable;

pub use block::{BlockInfo, BlockList, MeshBlock};
pub use collection::{partition_key, DataCollection, StageData, BASE_STAGE};
pub use comms::BoundaryComms;
pub use config::MeshConfig;
pub use container::{Binding, Container};
pub use error::{ConfigError, DataError, VariableError};
pub use iterator::ContainerIterator;
pub use mesh::Mesh;
pub use mesh_data::MeshData;
pub use package::{FieldDecl, Package, Packages};
pub use variable::{Variable, VariableKind};
