//! Error types for block geometry construction.

use std::fmt;

/// Errors arising from block shape or coordinate construction.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// Dimensionality outside `1..=3`.
    InvalidDimensionality {
        /// The rejected value.
        ndim: usize,
    },
    /// An active axis has zero interior cells.
    EmptyAxis {
        /// Index of the axis (0 = i, 1 = j, 2 = k).
        axis: usize,
    },
    /// An inactive axis was given more than one cell.
    InactiveAxisExtent {
        /// Index of the axis.
        axis: usize,
        /// The rejected cell count.
        cells: usize,
    },
    /// A cell width is not finite and positive.
    InvalidCellWidth {
        /// Index of the axis.
        axis: usize,
        /// The rejected width.
        width: f64,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensionality { ndim } => {
                write!(f, "dimensionality must be 1, 2 or 3, got {ndim}")
            }
            Self::EmptyAxis { axis } => write!(f, "axis {axis} has zero cells"),
            Self::InactiveAxisExtent { axis, cells } => {
                write!(f, "inactive axis {axis} must have 1 cell, got {cells}")
            }
            Self::InvalidCellWidth { axis, width } => {
                write!(f, "cell width along axis {axis} must be finite and positive, got {width}")
            }
        }
    }
}

impl std::error::Error for MeshError {}
