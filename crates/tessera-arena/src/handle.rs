//! Generational array handles.
//!
//! An [`ArrayHandle`] names one arena slot at one generation. When the slot
//! is freed its generation moves on, so a handle kept past the lifetime of
//! its array is detected in O(1) on the next resolve.

use std::fmt;

/// Location of an array within the arena.
///
/// Handles are plain `Copy` values: copying one never copies the array,
/// which is what makes a shallow alias cheap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[must_use]
pub struct ArrayHandle {
    /// Slot index in the arena table.
    pub(crate) index: u32,
    /// Slot generation at allocation time.
    pub(crate) generation: u32,
}

impl ArrayHandle {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The generation this handle belongs to.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ArrayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArrayHandle(slot={}, gen={})", self.index, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_round_trip() {
        let h = ArrayHandle::new(3, 42);
        assert_eq!(h.index(), 3);
        assert_eq!(h.generation(), 42);
    }

    #[test]
    fn handles_differ_by_generation() {
        assert_ne!(ArrayHandle::new(1, 0), ArrayHandle::new(1, 1));
    }
}
