//! The shared array arena.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::array::{Array6, Shape};
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::handle::ArrayHandle;

/// A resolved array. Lock it for reading or writing.
pub type SharedArray = Arc<RwLock<Array6>>;

/// Shared handle to an arena, held by every container that stores handles.
pub type SharedArena = Arc<ArrayArena>;

struct Slot {
    generation: u32,
    array: Option<SharedArray>,
}

struct SlotTable {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

/// Slot table of field arrays addressed by generational handles.
///
/// The arena is internally synchronised so that containers can release
/// their arrays from `Drop` and kernels on different blocks can resolve
/// handles concurrently. Each array carries its own `RwLock`; the slot
/// table lock is held only for the duration of a lookup.
pub struct ArrayArena {
    config: ArenaConfig,
    table: Mutex<SlotTable>,
}

impl ArrayArena {
    /// Create an empty arena.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let table = SlotTable {
            slots: Vec::with_capacity(config.initial_slots),
            free: Vec::new(),
            live: 0,
        };
        Ok(Self {
            config,
            table: Mutex::new(table),
        })
    }

    /// Wrap this arena in an `Arc` for sharing between containers.
    pub fn into_shared(self) -> SharedArena {
        Arc::new(self)
    }

    /// The configuration this arena was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Allocate a zero-filled array.
    pub fn allocate(&self, dims: Shape) -> Result<ArrayHandle, ArenaError> {
        self.insert(Array6::zeros(dims))
    }

    /// Move an array into the arena.
    pub fn insert(&self, array: Array6) -> Result<ArrayHandle, ArenaError> {
        let array = Arc::new(RwLock::new(array));
        let mut table = self.table.lock();
        if table.live >= self.config.max_slots as usize {
            return Err(ArenaError::CapacityExceeded {
                max_slots: self.config.max_slots,
            });
        }
        table.live += 1;
        if let Some(index) = table.free.pop() {
            let slot = &mut table.slots[index as usize];
            slot.array = Some(array);
            return Ok(ArrayHandle::new(index, slot.generation));
        }
        let index = table.slots.len() as u32;
        table.slots.push(Slot {
            generation: 0,
            array: Some(array),
        });
        Ok(ArrayHandle::new(index, 0))
    }

    /// Look up the array behind a handle.
    pub fn resolve(&self, handle: ArrayHandle) -> Result<SharedArray, ArenaError> {
        let table = self.table.lock();
        let slot = live_slot(&table, handle)?;
        match &slot.array {
            Some(array) => Ok(Arc::clone(array)),
            None => Err(ArenaError::StaleHandle {
                handle,
                current_generation: slot.generation,
            }),
        }
    }

    /// Free the array. Its slot's generation is bumped, so every copy of
    /// `handle` becomes stale.
    pub fn release(&self, handle: ArrayHandle) -> Result<(), ArenaError> {
        let mut table = self.table.lock();
        live_slot(&table, handle)?;
        let slot = &mut table.slots[handle.index as usize];
        slot.array = None;
        slot.generation = slot.generation.wrapping_add(1);
        table.free.push(handle.index);
        table.live -= 1;
        tracing::trace!(slot = handle.index, "array freed");
        Ok(())
    }

    /// Copy the array behind `handle`, a handle of `src`, into a new slot of
    /// this arena.
    pub fn copy_from(
        &self,
        src: &ArrayArena,
        handle: ArrayHandle,
    ) -> Result<ArrayHandle, ArenaError> {
        let copy = src.resolve(handle)?.read().clone();
        self.insert(copy)
    }

    /// Number of live arrays.
    pub fn live_count(&self) -> usize {
        self.table.lock().live
    }

    /// Bytes held by live arrays.
    pub fn memory_bytes(&self) -> usize {
        let arrays: Vec<SharedArray> = {
            let table = self.table.lock();
            table.slots.iter().filter_map(|s| s.array.clone()).collect()
        };
        arrays
            .iter()
            .map(|a| a.read().len() * std::mem::size_of::<tessera_core::Real>())
            .sum()
    }
}

fn live_slot(table: &SlotTable, handle: ArrayHandle) -> Result<&Slot, ArenaError> {
    let slot = table
        .slots
        .get(handle.index as usize)
        .ok_or(ArenaError::InvalidHandle { handle })?;
    if slot.generation != handle.generation || slot.array.is_none() {
        return Err(ArenaError::StaleHandle {
            handle,
            current_generation: slot.generation,
        });
    }
    Ok(slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> ArrayArena {
        ArrayArena::new(ArenaConfig::default()).unwrap()
    }

    #[test]
    fn allocate_is_zeroed() {
        let a = arena();
        let h = a.allocate([4, 1, 1, 1, 1, 1]).unwrap();
        let arr = a.resolve(h).unwrap();
        assert!(arr.read().as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(a.live_count(), 1);
    }

    #[test]
    fn writes_visible_through_every_resolve() {
        let a = arena();
        let h = a.allocate([3, 1, 1, 1, 1, 1]).unwrap();
        a.resolve(h).unwrap().write()[(0, 0, 0, 2)] = 5.0;
        assert_eq!(a.resolve(h).unwrap().read()[(0, 0, 0, 2)], 5.0);
    }

    #[test]
    fn release_frees_slot_once() {
        let a = arena();
        let h = a.allocate([2, 1, 1, 1, 1, 1]).unwrap();
        a.release(h).unwrap();
        assert!(matches!(
            a.resolve(h),
            Err(ArenaError::StaleHandle { .. })
        ));
        assert!(matches!(
            a.release(h),
            Err(ArenaError::StaleHandle { .. })
        ));
        assert_eq!(a.live_count(), 0);
    }

    #[test]
    fn reused_slot_does_not_revive_old_handle() {
        let a = arena();
        let old = a.allocate([1, 1, 1, 1, 1, 1]).unwrap();
        a.release(old).unwrap();
        let new = a.allocate([1, 1, 1, 1, 1, 1]).unwrap();
        assert_eq!(old.index(), new.index());
        assert_ne!(old.generation(), new.generation());
        assert!(a.resolve(old).is_err());
        assert!(a.resolve(new).is_ok());
    }

    #[test]
    fn copy_within_arena_is_independent() {
        let a = arena();
        let h = a.allocate([2, 1, 1, 1, 1, 1]).unwrap();
        a.resolve(h).unwrap().write().fill(1.0);
        let c = a.copy_from(&a, h).unwrap();
        a.resolve(h).unwrap().write().fill(2.0);
        assert!(a.resolve(c).unwrap().read().as_slice().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn copy_from_reads_the_source_arena() {
        let src = arena();
        let dst = arena();
        let h = src.allocate([2, 1, 1, 1, 1, 1]).unwrap();
        src.resolve(h).unwrap().write().fill(3.0);
        let other = dst.allocate([2, 1, 1, 1, 1, 1]).unwrap();
        assert_eq!(other, h);

        let c = dst.copy_from(&src, h).unwrap();
        assert!(dst.resolve(c).unwrap().read().as_slice().iter().all(|&v| v == 3.0));
        assert!(dst.resolve(other).unwrap().read().as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(src.live_count(), 1);
    }

    #[test]
    fn capacity_limit_enforced() {
        let a = ArrayArena::new(ArenaConfig {
            initial_slots: 1,
            max_slots: 1,
        })
        .unwrap();
        let _h = a.allocate([1, 1, 1, 1, 1, 1]).unwrap();
        assert_eq!(
            a.allocate([1, 1, 1, 1, 1, 1]).err(),
            Some(ArenaError::CapacityExceeded { max_slots: 1 })
        );
    }

    #[test]
    fn unknown_index_is_invalid() {
        let a = arena();
        let bogus = ArrayHandle::new(99, 0);
        assert_eq!(
            a.resolve(bogus).err(),
            Some(ArenaError::InvalidHandle { handle: bogus })
        );
    }

    #[test]
    fn memory_bytes_counts_live_arrays() {
        let a = arena();
        let h = a.allocate([10, 1, 1, 1, 1, 1]).unwrap();
        let _g = a.allocate([5, 1, 1, 1, 1, 1]).unwrap();
        assert_eq!(a.memory_bytes(), 15 * 8);
        a.release(h).unwrap();
        assert_eq!(a.memory_bytes(), 5 * 8);
    }
}
