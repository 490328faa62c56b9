//! Block geometry collaborators for Tessera.
//!
//! This crate defines the interfaces the field-data layer needs from the
//! spatial mesh: per-axis [`IndexRange`]s of a block ([`IndexShape`]), the
//! [`Coordinates`] trait that supplies face areas and cell volumes row by
//! row, and the [`partition`] helpers that group a block list into
//! fixed-size packs.
//!
//! # Backends
//!
//! - [`UniformCartesian`]: constant cell widths along each axis.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod coordinates;
pub mod error;
pub mod index;
pub mod partition;

pub use coordinates::{Coordinates, UniformCartesian};
pub use error::MeshError;
pub use index::{Axis, IndexDomain, IndexRange, IndexShape};
