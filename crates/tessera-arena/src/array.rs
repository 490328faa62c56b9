//! Dense six-dimensional arrays.
//!
//! # Dimension convention
//!
//! `dims[0]` is dimension 1, the innermost and fastest-varying index `i`;
//! `dims[5]` is dimension 6, the outermost. [`Array6::dim`] is 1-indexed.
//! The element `(n6, n5, l, k, j, i)` is stored at
//!
//! ```text
//! ((((n6 * d5 + n5) * d4 + l) * d3 + k) * d2 + j) * d1 + i
//! ```
//!
//! where `dN = dims[N - 1]`. The 4-index form `(l, k, j, i)` fixes
//! `n6 = n5 = 0`, which is how kernels address component `l` of cell
//! `(k, j, i)`.

use std::ops::{Index, IndexMut};

use tessera_core::Real;

/// Extent of each of the six dimensions, innermost first.
pub type Shape = [usize; 6];

/// A dense row-major array of [`Real`] with six fixed dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct Array6 {
    dims: Shape,
    data: Vec<Real>,
}

impl Array6 {
    /// A zero-filled array with the given extents.
    pub fn zeros(dims: Shape) -> Self {
        let len = dims.iter().product();
        Self {
            dims,
            data: vec![0.0; len],
        }
    }

    /// All six extents, innermost first.
    pub fn dims(&self) -> Shape {
        self.dims
    }

    /// Extent of dimension `n` (1-indexed), or `None` outside `1..=6`.
    pub fn dim(&self, n: usize) -> Option<usize> {
        if (1..=6).contains(&n) {
            Some(self.dims[n - 1])
        } else {
            None
        }
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat offset of a full six-index position (outermost first).
    pub fn offset(&self, index: [usize; 6]) -> usize {
        let [n6, n5, l, k, j, i] = index;
        let d = &self.dims;
        debug_assert!(
            i < d[0] && j < d[1] && k < d[2] && l < d[3] && n5 < d[4] && n6 < d[5],
            "index {index:?} out of range for shape {d:?}"
        );
        ((((n6 * d[4] + n5) * d[3] + l) * d[2] + k) * d[1] + j) * d[0] + i
    }

    /// Read element `(l, k, j, i)`.
    pub fn get(&self, l: usize, k: usize, j: usize, i: usize) -> Real {
        self.data[self.offset([0, 0, l, k, j, i])]
    }

    /// Write element `(l, k, j, i)`.
    pub fn set(&mut self, l: usize, k: usize, j: usize, i: usize, value: Real) {
        let off = self.offset([0, 0, l, k, j, i]);
        self.data[off] = value;
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: Real) {
        self.data.fill(value);
    }

    /// Flat view of the storage.
    pub fn as_slice(&self) -> &[Real] {
        &self.data
    }

    /// Mutable flat view of the storage.
    pub fn as_mut_slice(&mut self) -> &mut [Real] {
        &mut self.data
    }
}

impl Index<(usize, usize, usize, usize)> for Array6 {
    type Output = Real;

    fn index(&self, (l, k, j, i): (usize, usize, usize, usize)) -> &Real {
        &self.data[self.offset([0, 0, l, k, j, i])]
    }
}

impl IndexMut<(usize, usize, usize, usize)> for Array6 {
    fn index_mut(&mut self, (l, k, j, i): (usize, usize, usize, usize)) -> &mut Real {
        let off = self.offset([0, 0, l, k, j, i]);
        &mut self.data[off]
    }
}

impl Index<[usize; 6]> for Array6 {
    type Output = Real;

    fn index(&self, index: [usize; 6]) -> &Real {
        &self.data[self.offset(index)]
    }
}

impl IndexMut<[usize; 6]> for Array6 {
    fn index_mut(&mut self, index: [usize; 6]) -> &mut Real {
        let off = self.offset(index);
        &mut self.data[off]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i_is_fastest_varying() {
        let a = Array6::zeros([4, 3, 2, 1, 1, 1]);
        assert_eq!(a.offset([0, 0, 0, 0, 0, 1]), 1);
        assert_eq!(a.offset([0, 0, 0, 0, 1, 0]), 4);
        assert_eq!(a.offset([0, 0, 0, 1, 0, 0]), 12);
    }

    #[test]
    fn component_index_is_dimension_four() {
        let a = Array6::zeros([5, 1, 1, 3, 1, 1]);
        assert_eq!(a.dim(4), Some(3));
        assert_eq!(a.offset([0, 0, 2, 0, 0, 0]), 10);
    }

    #[test]
    fn dim_is_one_indexed() {
        let a = Array6::zeros([2, 3, 4, 5, 6, 7]);
        assert_eq!(a.dim(1), Some(2));
        assert_eq!(a.dim(6), Some(7));
        assert_eq!(a.dim(0), None);
        assert_eq!(a.dim(7), None);
        assert_eq!(a.len(), 2 * 3 * 4 * 5 * 6 * 7);
    }

    #[test]
    fn tuple_and_six_index_agree() {
        let mut a = Array6::zeros([3, 3, 1, 2, 1, 1]);
        a[(1, 0, 2, 1)] = 7.5;
        assert_eq!(a[[0, 0, 1, 0, 2, 1]], 7.5);
        assert_eq!(a.get(1, 0, 2, 1), 7.5);
    }
}
