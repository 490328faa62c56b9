//! The [`Coordinates`] geometry trait and the uniform Cartesian backend.

use tessera_core::Real;

use crate::error::MeshError;

/// Geometry of a block, queried one `(k, j)` row at a time.
///
/// Every method fills `out[i]` for `i` in `il..=iu`; `out` must be at least
/// `iu + 1` long and entries outside the range are left untouched. Face
/// areas are for the lower face of cell `(k, j, i)` along the named
/// direction, so the upper `x1` face of cell `i` is `face1_area(.., i + 1)`.
///
/// # Thread Safety
///
/// `Sync` is required because per-partition kernels read geometry from
/// several blocks concurrently.
pub trait Coordinates: Send + Sync + 'static {
    /// Areas of the `x1` faces along a row.
    fn face1_area(&self, k: usize, j: usize, il: usize, iu: usize, out: &mut [Real]);

    /// Areas of the `x2` faces along a row.
    fn face2_area(&self, k: usize, j: usize, il: usize, iu: usize, out: &mut [Real]);

    /// Areas of the `x3` faces along a row.
    fn face3_area(&self, k: usize, j: usize, il: usize, iu: usize, out: &mut [Real]);

    /// Cell volumes along a row.
    fn cell_volume(&self, k: usize, j: usize, il: usize, iu: usize, out: &mut [Real]);
}

/// Cartesian coordinates with a constant cell width per axis.
#[derive(Clone, Debug, PartialEq)]
pub struct UniformCartesian {
    dx: [Real; 3],
}

impl UniformCartesian {
    /// Create coordinates with widths `[dx1, dx2, dx3]`.
    pub fn new(dx: [Real; 3]) -> Result<Self, MeshError> {
        for (axis, &width) in dx.iter().enumerate() {
            if !width.is_finite() || width <= 0.0 {
                return Err(MeshError::InvalidCellWidth { axis, width });
            }
        }
        Ok(Self { dx })
    }

    /// Unit cube cells.
    pub fn unit() -> Self {
        Self { dx: [1.0; 3] }
    }

    /// Cell widths.
    pub fn cell_width(&self) -> [Real; 3] {
        self.dx
    }
}

impl Coordinates for UniformCartesian {
    fn face1_area(&self, _k: usize, _j: usize, il: usize, iu: usize, out: &mut [Real]) {
        out[il..=iu].fill(self.dx[1] * self.dx[2]);
    }

    fn face2_area(&self, _k: usize, _j: usize, il: usize, iu: usize, out: &mut [Real]) {
        out[il..=iu].fill(self.dx[0] * self.dx[2]);
    }

    fn face3_area(&self, _k: usize, _j: usize, il: usize, iu: usize, out: &mut [Real]) {
        out[il..=iu].fill(self.dx[0] * self.dx[1]);
    }

    fn cell_volume(&self, _k: usize, _j: usize, il: usize, iu: usize, out: &mut [Real]) {
        out[il..=iu].fill(self.dx[0] * self.dx[1] * self.dx[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn areas_and_volume_from_widths() {
        let c = UniformCartesian::new([2.0, 3.0, 5.0]).unwrap();
        let mut out = [0.0; 4];
        c.face1_area(0, 0, 1, 2, &mut out);
        assert_eq!(out, [0.0, 15.0, 15.0, 0.0]);
        c.face2_area(0, 0, 0, 3, &mut out);
        assert_eq!(out, [10.0; 4]);
        c.face3_area(0, 0, 0, 3, &mut out);
        assert_eq!(out, [6.0; 4]);
        c.cell_volume(0, 0, 0, 3, &mut out);
        assert_eq!(out, [30.0; 4]);
    }

    #[test]
    fn rejects_non_positive_width() {
        assert!(matches!(
            UniformCartesian::new([1.0, 0.0, 1.0]),
            Err(MeshError::InvalidCellWidth { axis: 1, .. })
        ));
        assert!(UniformCartesian::new([1.0, 1.0, Real::NAN]).is_err());
    }
}
