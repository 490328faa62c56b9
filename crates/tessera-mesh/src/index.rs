//! Per-axis index ranges of a block.

use crate::error::MeshError;

/// Identifier for a Cartesian axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Innermost axis (`i`, dimension 1).
    I,
    /// Middle axis (`j`, dimension 2).
    J,
    /// Outermost spatial axis (`k`, dimension 3).
    K,
}

impl Axis {
    fn position(self) -> usize {
        match self {
            Self::I => 0,
            Self::J => 1,
            Self::K => 2,
        }
    }
}

/// Which part of a block's index space to address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexDomain {
    /// Cells owned by the block, excluding ghost zones.
    Interior,
    /// Interior plus ghost zones.
    Entire,
}

/// Inclusive index range `s..=e`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexRange {
    /// First index.
    pub s: usize,
    /// Last index (inclusive).
    pub e: usize,
}

impl IndexRange {
    /// Number of indices in the range.
    pub fn len(&self) -> usize {
        self.e + 1 - self.s
    }

    /// Ranges are never empty; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over the indices in the range.
    pub fn iter(&self) -> std::ops::RangeInclusive<usize> {
        self.s..=self.e
    }

    /// Whether `index` lies in the range.
    pub fn contains(&self, index: usize) -> bool {
        (self.s..=self.e).contains(&index)
    }
}

/// The cell index layout of a block: interior cell counts, ghost width and
/// active dimensionality.
///
/// Inactive axes (beyond `ndim`) have one cell and no ghost zones, so their
/// interior and entire ranges are both `0..=0`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexShape {
    cells: [usize; 3],
    num_ghost: usize,
    ndim: usize,
}

impl IndexShape {
    /// Build the shape of a block with `cells` interior cells per axis.
    pub fn new(cells: [usize; 3], num_ghost: usize, ndim: usize) -> Result<Self, MeshError> {
        if !(1..=3).contains(&ndim) {
            return Err(MeshError::InvalidDimensionality { ndim });
        }
        for (axis, &n) in cells.iter().enumerate() {
            if axis < ndim && n == 0 {
                return Err(MeshError::EmptyAxis { axis });
            }
            if axis >= ndim && n != 1 {
                return Err(MeshError::InactiveAxisExtent { axis, cells: n });
            }
        }
        Ok(Self {
            cells,
            num_ghost,
            ndim,
        })
    }

    /// Active spatial dimensionality (1, 2 or 3).
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Ghost zone width on active axes.
    pub fn num_ghost(&self) -> usize {
        self.num_ghost
    }

    fn ghost(&self, axis: Axis) -> usize {
        if axis.position() < self.ndim {
            self.num_ghost
        } else {
            0
        }
    }

    /// Index range along `axis` for the given domain.
    pub fn bounds(&self, axis: Axis, domain: IndexDomain) -> IndexRange {
        let n = self.cells[axis.position()];
        let g = self.ghost(axis);
        match domain {
            IndexDomain::Interior => IndexRange { s: g, e: g + n - 1 },
            IndexDomain::Entire => IndexRange {
                s: 0,
                e: n + 2 * g - 1,
            },
        }
    }

    /// Range along `i`.
    pub fn bounds_i(&self, domain: IndexDomain) -> IndexRange {
        self.bounds(Axis::I, domain)
    }

    /// Range along `j`.
    pub fn bounds_j(&self, domain: IndexDomain) -> IndexRange {
        self.bounds(Axis::J, domain)
    }

    /// Range along `k`.
    pub fn bounds_k(&self, domain: IndexDomain) -> IndexRange {
        self.bounds(Axis::K, domain)
    }

    /// Number of cells along `axis` for the given domain.
    pub fn ncells(&self, axis: Axis, domain: IndexDomain) -> usize {
        self.bounds(axis, domain).len()
    }

    /// Entire-domain extents `[ni, nj, nk]`, innermost first.
    pub fn entire_extents(&self) -> [usize; 3] {
        [
            self.ncells(Axis::I, IndexDomain::Entire),
            self.ncells(Axis::J, IndexDomain::Entire),
            self.ncells(Axis::K, IndexDomain::Entire),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_skips_ghosts_on_active_axes() {
        let shape = IndexShape::new([8, 4, 1], 2, 2).unwrap();
        assert_eq!(shape.bounds_i(IndexDomain::Interior), IndexRange { s: 2, e: 9 });
        assert_eq!(shape.bounds_j(IndexDomain::Interior), IndexRange { s: 2, e: 5 });
        assert_eq!(shape.bounds_k(IndexDomain::Interior), IndexRange { s: 0, e: 0 });
        assert_eq!(shape.entire_extents(), [12, 8, 1]);
    }

    #[test]
    fn one_dimensional_block() {
        let shape = IndexShape::new([5, 1, 1], 1, 1).unwrap();
        assert_eq!(shape.ncells(Axis::I, IndexDomain::Interior), 5);
        assert_eq!(shape.ncells(Axis::I, IndexDomain::Entire), 7);
        assert_eq!(shape.ncells(Axis::J, IndexDomain::Entire), 1);
    }

    #[test]
    fn rejects_bad_dimensionality() {
        assert_eq!(
            IndexShape::new([4, 1, 1], 1, 4),
            Err(MeshError::InvalidDimensionality { ndim: 4 })
        );
    }

    #[test]
    fn rejects_extent_on_inactive_axis() {
        assert_eq!(
            IndexShape::new([4, 4, 1], 1, 1),
            Err(MeshError::InactiveAxisExtent { axis: 1, cells: 4 })
        );
    }

    #[test]
    fn rejects_empty_active_axis() {
        assert_eq!(
            IndexShape::new([4, 0, 1], 1, 2),
            Err(MeshError::EmptyAxis { axis: 1 })
        );
    }

    #[test]
    fn range_iterates_inclusive() {
        let r = IndexRange { s: 2, e: 4 };
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(r.len(), 3);
        assert!(r.contains(4));
        assert!(!r.contains(5));
    }
}
