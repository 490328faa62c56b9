//! Arena-of-arrays storage for Tessera variables.
//!
//! Every field array (cell data, flux buffers, face components) lives in an
//! [`ArrayArena`] slot and is addressed through a generational
//! [`ArrayHandle`]. Containers never hold array storage directly; they hold
//! handles, tagged as owning or aliasing, which makes the difference between
//! a deep copy and a shallow alias explicit.
//!
//! # Ownership
//!
//! ```text
//! Arc<ArrayArena>
//! └── Mutex<SlotTable>
//!     └── Slot { generation, Arc<RwLock<Array6>> }
//! ```
//!
//! - `allocate`/`insert` fill a free slot.
//! - `release` frees the slot and bumps its generation. Exactly one
//!   container owns each array and releases it; aliases never do.
//! - Resolving an alias after its owner released the array yields
//!   [`ArenaError::StaleHandle`] instead of touching freed data.
//!
//! The arena is shared via `Arc`, so it outlives every container that holds
//! one of its handles.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod array;
pub mod config;
pub mod error;
pub mod handle;

pub use arena::{ArrayArena, SharedArray, SharedArena};
pub use array::{Array6, Shape};
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use handle::ArrayHandle;
