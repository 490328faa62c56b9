//! Kernels that consume Tessera's field data.
//!
//! Per-block kernels in [`kernels`] pair the independent cell variables of
//! two containers by position and sweep interior cells:
//!
//! - [`flux_divergence`]: face-area weighted flux differences over cell
//!   volume, negated.
//! - [`update_container`]: `out = in + dt * rate`.
//! - [`average_containers`]: `c1 = w * c1 + (1 - w) * c2`.
//! - [`estimate_timestep`]: minimum over the packages' estimates.
//!
//! [`FillDerivedRegistry`] runs derived-field callbacks in the order pre
//! hook, packages, post hook. [`pack`] applies all of the above to every
//! block of a partition in parallel.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod fill;
pub mod kernels;
pub mod pack;

pub use error::UpdateError;
pub use fill::{FillDerivedRegistry, FillHook};
pub use kernels::{average_containers, estimate_timestep, flux_divergence, update_container};
