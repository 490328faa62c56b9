//! Core types and metadata for the Tessera block-structured field framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! scalar type, block identifiers, the [`Metadata`] flag set attached to
//! every variable, and the error type shared with physics packages.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod metadata;

pub use error::PackageError;
pub use id::{BlockId, BlockListGeneration};
pub use metadata::{Metadata, MetadataFlag, MetadataSet, MetadataSetIter};

/// Scalar element type of every field array.
pub type Real = f64;
