//! The [`Variable`] model: one named field and the handles of its arrays.
//!
//! A variable is cell-centered, face-centered or edge-centered
//! ([`VariableKind`]). All three share the label, metadata and shape
//! queries; they differ only in which arrays they hold:
//!
//! | Kind | Arrays |
//! |------|--------|
//! | Cell | `data`, optional `flux[1..=3]`, optional coarse buffer |
//! | Face | one component per direction, `+1` along that direction |
//! | Edge | one component per direction, `+1` along the other two |
//!
//! Variables never own storage by themselves. The arrays live in an
//! [`ArrayArena`] and whether a given variable owns them is recorded by the
//! [`Container`](crate::Container) that holds it.

use std::fmt;

use smallvec::SmallVec;
use tessera_arena::{ArenaError, ArrayArena, ArrayHandle, Shape};
use tessera_core::{BlockId, Metadata, MetadataFlag};

use crate::comms::BoundaryComms;
use crate::error::{DataError, VariableError};

/// Handles of every array of one variable.
pub(crate) type HandleList = SmallVec<[ArrayHandle; 5]>;

/// Where on the cell a variable lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// Cell centers.
    Cell,
    /// Cell faces.
    Face,
    /// Cell edges.
    Edge,
}

impl VariableKind {
    fn topology(self) -> MetadataFlag {
        match self {
            Self::Cell => MetadataFlag::Cell,
            Self::Face => MetadataFlag::Face,
            Self::Edge => MetadataFlag::Edge,
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Cell => "cell",
            Self::Face => "face",
            Self::Edge => "edge",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Storage {
    Unallocated,
    Cell {
        data: ArrayHandle,
        flux: Option<[ArrayHandle; 3]>,
        coarse: Option<ArrayHandle>,
    },
    Directional([ArrayHandle; 3]),
}

impl Storage {
    fn handles(&self) -> HandleList {
        let mut out = HandleList::new();
        match self {
            Self::Unallocated => {}
            Self::Cell { data, flux, coarse } => {
                out.push(*data);
                if let Some(flux) = flux {
                    out.extend_from_slice(flux);
                }
                out.extend(*coarse);
            }
            Self::Directional(components) => out.extend_from_slice(components),
        }
        out
    }

    fn try_map<F>(&self, mut f: F) -> Result<Self, ArenaError>
    where
        F: FnMut(ArrayHandle) -> Result<ArrayHandle, ArenaError>,
    {
        Ok(match self {
            Self::Unallocated => Self::Unallocated,
            Self::Cell { data, flux, coarse } => {
                let data = f(*data)?;
                let flux = match flux {
                    Some([a, b, c]) => Some([f(*a)?, f(*b)?, f(*c)?]),
                    None => None,
                };
                let coarse = match coarse {
                    Some(h) => Some(f(*h)?),
                    None => None,
                };
                Self::Cell { data, flux, coarse }
            }
            Self::Directional([a, b, c]) => Self::Directional([f(*a)?, f(*b)?, f(*c)?]),
        })
    }
}

/// A named field: label, metadata, shape and the handles of its arrays.
///
/// Shapes follow the arena convention: `shape[0]` is dimension 1 (the
/// innermost index `i`) and `shape[5]` is dimension 6. For face and edge
/// variables the shape is the cell-centered shape the components are
/// derived from.
#[derive(Debug, PartialEq)]
pub struct Variable {
    label: String,
    kind: VariableKind,
    metadata: Metadata,
    shape: Shape,
    storage: Storage,
    comms: Option<BoundaryComms>,
    mpi_status: bool,
}

impl Variable {
    /// A cell variable without storage, to be finalized once its shape is
    /// known.
    pub fn blank(label: impl Into<String>, metadata: Metadata) -> Result<Self, VariableError> {
        let label = label.into();
        let metadata = prepare_metadata(&label, VariableKind::Cell, metadata)?;
        Ok(Self {
            label,
            kind: VariableKind::Cell,
            metadata,
            shape: [0; 6],
            storage: Storage::Unallocated,
            comms: None,
            mpi_status: true,
        })
    }

    /// Allocate a variable's arrays in `arena`. The caller owns every
    /// returned handle.
    pub(crate) fn allocate(
        arena: &ArrayArena,
        label: String,
        kind: VariableKind,
        shape: Shape,
        metadata: Metadata,
    ) -> Result<Self, DataError> {
        let metadata = prepare_metadata(&label, kind, metadata)?;
        let storage = allocate_storage(arena, kind, shape, &metadata)?;
        Ok(Self {
            label,
            kind,
            metadata,
            shape,
            storage,
            comms: None,
            mpi_status: true,
        })
    }

    /// Give storage of `shape` to a blank variable.
    pub(crate) fn finalize(&mut self, arena: &ArrayArena, shape: Shape) -> Result<(), DataError> {
        if self.is_allocated() {
            return Err(VariableError::AlreadyAllocated {
                label: self.label.clone(),
            }
            .into());
        }
        self.storage = allocate_storage(arena, self.kind, shape, &self.metadata)?;
        self.shape = shape;
        self.reset_boundary();
        Ok(())
    }

    /// A second view of the same arrays. Nothing is copied.
    pub(crate) fn alias(&self) -> Self {
        Self {
            label: self.label.clone(),
            kind: self.kind,
            metadata: self.metadata.clone(),
            shape: self.shape,
            storage: self.storage.clone(),
            comms: self.comms,
            mpi_status: self.mpi_status,
        }
    }

    /// Copy every array, resolved in `from`, into fresh slots of `to`
    /// owned by the caller.
    ///
    /// The copy has no communication resource; it must be allocated again
    /// for the new owner.
    pub(crate) fn deep_copy(
        &self,
        from: &ArrayArena,
        to: &ArrayArena,
    ) -> Result<Self, ArenaError> {
        let mut copied = HandleList::new();
        let storage = self.storage.try_map(|h| {
            let c = to.copy_from(from, h)?;
            copied.push(c);
            Ok(c)
        });
        let storage = match storage {
            Ok(s) => s,
            Err(e) => {
                release_all(to, &copied);
                return Err(e);
            }
        };
        Ok(Self {
            label: self.label.clone(),
            kind: self.kind,
            metadata: self.metadata.clone(),
            shape: self.shape,
            storage,
            comms: None,
            mpi_status: self.mpi_status,
        })
    }

    /// The variable's label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Rename the variable. Only possible before it joins a container.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Cell, face or edge.
    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    /// The variable's metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Whether `flag` is set in the metadata.
    pub fn is_set(&self, flag: MetadataFlag) -> bool {
        self.metadata.is_set(flag)
    }

    /// Label of the associated variable, if any.
    pub fn associated(&self) -> Option<&str> {
        self.metadata.associated()
    }

    /// All six extents, dimension 1 first.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Extent of dimension `n`, 1-indexed (dimension 6 is outermost).
    pub fn dim(&self, n: usize) -> Result<usize, VariableError> {
        if (1..=6).contains(&n) {
            Ok(self.shape[n - 1])
        } else {
            Err(VariableError::DimensionOutOfRange {
                label: self.label.clone(),
                dim: n,
            })
        }
    }

    /// Whether the variable has storage.
    pub fn is_allocated(&self) -> bool {
        self.storage != Storage::Unallocated
    }

    /// Handle of a cell variable's data array.
    pub fn data_handle(&self) -> Result<ArrayHandle, VariableError> {
        self.expect_kind(VariableKind::Cell)?;
        match self.storage {
            Storage::Cell { data, .. } => Ok(data),
            _ => Err(self.not_allocated()),
        }
    }

    /// Handle of a cell variable's flux buffer along `dir` (1, 2 or 3).
    pub fn flux_handle(&self, dir: usize) -> Result<ArrayHandle, VariableError> {
        let d = self.check_dir(dir)?;
        self.expect_kind(VariableKind::Cell)?;
        match &self.storage {
            Storage::Cell {
                flux: Some(flux), ..
            } => Ok(flux[d]),
            Storage::Cell { flux: None, .. } => Err(VariableError::NoFluxes {
                label: self.label.clone(),
            }),
            _ => Err(self.not_allocated()),
        }
    }

    /// Whether a cell variable carries flux buffers.
    pub fn has_fluxes(&self) -> bool {
        matches!(self.storage, Storage::Cell { flux: Some(_), .. })
    }

    /// Handle of the coarse-representation buffer, if allocated.
    pub fn coarse_handle(&self) -> Option<ArrayHandle> {
        match self.storage {
            Storage::Cell { coarse, .. } => coarse,
            _ => None,
        }
    }

    /// Handle of a face or edge variable's component along `dir` (1, 2 or 3).
    pub fn component_handle(&self, dir: usize) -> Result<ArrayHandle, VariableError> {
        let d = self.check_dir(dir)?;
        if self.kind == VariableKind::Cell {
            return Err(VariableError::KindMismatch {
                label: self.label.clone(),
                expected: VariableKind::Face,
                found: self.kind,
            });
        }
        match &self.storage {
            Storage::Directional(components) => Ok(components[d]),
            _ => Err(self.not_allocated()),
        }
    }

    /// Every array handle of the variable.
    pub(crate) fn handles(&self) -> HandleList {
        self.storage.handles()
    }

    pub(crate) fn allocate_coarse(
        &mut self,
        arena: &ArrayArena,
        shape: Shape,
    ) -> Result<(), DataError> {
        self.expect_kind(VariableKind::Cell)?;
        let not_allocated = self.not_allocated();
        let already = VariableError::AlreadyAllocated {
            label: format!("{}.coarse", self.label),
        };
        match &mut self.storage {
            Storage::Cell { coarse: Some(_), .. } => Err(already.into()),
            Storage::Cell { coarse, .. } => {
                *coarse = Some(arena.allocate(shape)?);
                Ok(())
            }
            _ => Err(not_allocated.into()),
        }
    }

    /// The communication resource, if allocated.
    pub fn comms(&self) -> Option<&BoundaryComms> {
        self.comms.as_ref()
    }

    /// Create the communication resource, bound to `block`.
    ///
    /// Only cell variables communicate. A variable's resource is created
    /// exactly once; a second call is an error.
    pub fn allocate_comms(&mut self, block: BlockId) -> Result<(), VariableError> {
        self.expect_kind(VariableKind::Cell)?;
        if self.comms.is_some() {
            return Err(VariableError::CommsAlreadyAllocated {
                label: self.label.clone(),
            });
        }
        let buffer = self.data_handle().ok();
        self.comms = Some(BoundaryComms::new(block, buffer));
        Ok(())
    }

    /// Point the communication buffer at the current data array.
    ///
    /// A no-op when no resource is allocated.
    pub fn reset_boundary(&mut self) {
        let buffer = self.data_handle().ok();
        if let Some(comms) = &mut self.comms {
            comms.repoint(buffer);
        }
    }

    /// Whether the variable takes part in boundary exchange this cycle.
    pub fn mpi_status(&self) -> bool {
        self.mpi_status
    }

    /// Enable or disable boundary exchange for this variable.
    pub fn set_mpi_status(&mut self, status: bool) {
        self.mpi_status = status;
    }

    /// Check that `other` has the same kind, shape and metadata.
    pub fn check_compatible(&self, other: &Variable) -> Result<(), String> {
        if self.kind != other.kind {
            return Err(format!("kind {} != {}", self.kind, other.kind));
        }
        if self.shape != other.shape {
            return Err(format!("shape {:?} != {:?}", self.shape, other.shape));
        }
        if self.metadata != other.metadata {
            return Err(format!("metadata [{}] != [{}]", self.metadata, other.metadata));
        }
        Ok(())
    }

    /// One-line description: label, kind, shape and flags.
    pub fn info(&self) -> String {
        let dims: Vec<String> = self.shape.iter().rev().map(|d| d.to_string()).collect();
        format!(
            "{:<20} {} <{}> [{}]",
            self.label,
            self.kind,
            dims.join("x"),
            self.metadata
        )
    }

    fn check_dir(&self, dir: usize) -> Result<usize, VariableError> {
        if (1..=3).contains(&dir) {
            Ok(dir - 1)
        } else {
            Err(VariableError::InvalidDirection {
                label: self.label.clone(),
                dir,
            })
        }
    }

    fn expect_kind(&self, expected: VariableKind) -> Result<(), VariableError> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(VariableError::KindMismatch {
                label: self.label.clone(),
                expected,
                found: self.kind,
            })
        }
    }

    fn not_allocated(&self) -> VariableError {
        VariableError::NotAllocated {
            label: self.label.clone(),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.info())
    }
}

fn prepare_metadata(
    label: &str,
    kind: VariableKind,
    metadata: Metadata,
) -> Result<Metadata, VariableError> {
    metadata
        .validate()
        .map_err(|reason| VariableError::InvalidMetadata {
            label: label.to_string(),
            reason,
        })?;
    if kind != VariableKind::Cell && metadata.is_set(MetadataFlag::Sparse) {
        return Err(VariableError::SparseUnsupported {
            label: label.to_string(),
            kind,
        });
    }
    let topology = kind.topology();
    let other = [
        MetadataFlag::Cell,
        MetadataFlag::Face,
        MetadataFlag::Edge,
        MetadataFlag::Node,
    ]
    .into_iter()
    .find(|&f| f != topology && metadata.is_set(f));
    if let Some(flag) = other {
        return Err(VariableError::InvalidMetadata {
            label: label.to_string(),
            reason: format!("flag {flag} on a {kind} variable"),
        });
    }
    Ok(metadata.with_flag(topology))
}

fn component_shapes(kind: VariableKind, shape: Shape) -> [Shape; 3] {
    let mut out = [shape; 3];
    for (d, s) in out.iter_mut().enumerate() {
        match kind {
            VariableKind::Face | VariableKind::Cell => s[d] += 1,
            VariableKind::Edge => {
                for (e, extent) in s.iter_mut().take(3).enumerate() {
                    if e != d {
                        *extent += 1;
                    }
                }
            }
        }
    }
    out
}

fn allocate_storage(
    arena: &ArrayArena,
    kind: VariableKind,
    shape: Shape,
    metadata: &Metadata,
) -> Result<Storage, ArenaError> {
    match kind {
        VariableKind::Cell => {
            let data = arena.allocate(shape)?;
            let flux = if metadata.is_set(MetadataFlag::Independent) {
                match allocate_three(arena, component_shapes(kind, shape)) {
                    Ok(f) => Some(f),
                    Err(e) => {
                        release_all(arena, &[data]);
                        return Err(e);
                    }
                }
            } else {
                None
            };
            Ok(Storage::Cell {
                data,
                flux,
                coarse: None,
            })
        }
        VariableKind::Face | VariableKind::Edge => Ok(Storage::Directional(allocate_three(
            arena,
            component_shapes(kind, shape),
        )?)),
    }
}

fn allocate_three(
    arena: &ArrayArena,
    shapes: [Shape; 3],
) -> Result<[ArrayHandle; 3], ArenaError> {
    let mut done = HandleList::new();
    for dims in shapes {
        match arena.allocate(dims) {
            Ok(h) => done.push(h),
            Err(e) => {
                release_all(arena, &done);
                return Err(e);
            }
        }
    }
    Ok([done[0], done[1], done[2]])
}

/// Release each handle, logging failures.
pub(crate) fn release_all(arena: &ArrayArena, handles: &[ArrayHandle]) {
    for &h in handles {
        if let Err(e) = arena.release(h) {
            tracing::warn!(handle = %h, error = %e, "failed to release array");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_arena::ArenaConfig;

    fn arena() -> ArrayArena {
        ArrayArena::new(ArenaConfig::default()).unwrap()
    }

    fn cell(arena: &ArrayArena, flags: &[MetadataFlag]) -> Variable {
        Variable::allocate(
            arena,
            "u".into(),
            VariableKind::Cell,
            [4, 3, 2, 1, 1, 1],
            Metadata::new(flags.iter().copied()),
        )
        .unwrap()
    }

    #[test]
    fn dim_is_one_indexed_innermost_first() {
        let a = arena();
        let v = cell(&a, &[]);
        assert_eq!(v.dim(1).unwrap(), 4);
        assert_eq!(v.dim(3).unwrap(), 2);
        assert_eq!(v.dim(6).unwrap(), 1);
        assert!(matches!(
            v.dim(0),
            Err(VariableError::DimensionOutOfRange { dim: 0, .. })
        ));
        assert!(v.dim(7).is_err());
    }

    #[test]
    fn independent_cell_gets_fluxes_extended_along_direction() {
        let a = arena();
        let v = cell(&a, &[MetadataFlag::Independent]);
        assert!(v.has_fluxes());
        let f1 = a.resolve(v.flux_handle(1).unwrap()).unwrap();
        let f3 = a.resolve(v.flux_handle(3).unwrap()).unwrap();
        assert_eq!(f1.read().dims(), [5, 3, 2, 1, 1, 1]);
        assert_eq!(f3.read().dims(), [4, 3, 3, 1, 1, 1]);
        assert_eq!(a.live_count(), 4);
    }

    #[test]
    fn derived_cell_has_no_fluxes() {
        let a = arena();
        let v = cell(&a, &[MetadataFlag::Derived]);
        assert!(!v.has_fluxes());
        assert!(matches!(
            v.flux_handle(1),
            Err(VariableError::NoFluxes { .. })
        ));
    }

    #[test]
    fn cell_flag_added_automatically() {
        let a = arena();
        let v = cell(&a, &[MetadataFlag::Independent]);
        assert!(v.is_set(MetadataFlag::Cell));
    }

    #[test]
    fn sparse_face_rejected() {
        let a = arena();
        let err = Variable::allocate(
            &a,
            "b".into(),
            VariableKind::Face,
            [4, 4, 1, 1, 1, 1],
            Metadata::new([MetadataFlag::Sparse]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataError::Variable(VariableError::SparseUnsupported {
                kind: VariableKind::Face,
                ..
            })
        ));
        assert_eq!(a.live_count(), 0);
    }

    #[test]
    fn face_components_and_direction_check() {
        let a = arena();
        let v = Variable::allocate(
            &a,
            "b".into(),
            VariableKind::Face,
            [4, 3, 2, 1, 1, 1],
            Metadata::default(),
        )
        .unwrap();
        let x2f = a.resolve(v.component_handle(2).unwrap()).unwrap();
        assert_eq!(x2f.read().dims(), [4, 4, 2, 1, 1, 1]);
        assert!(matches!(
            v.component_handle(0),
            Err(VariableError::InvalidDirection { dir: 0, .. })
        ));
        assert!(v.component_handle(4).is_err());
        assert!(v.data_handle().is_err());
    }

    #[test]
    fn edge_components_extend_transverse_dims() {
        let a = arena();
        let v = Variable::allocate(
            &a,
            "e".into(),
            VariableKind::Edge,
            [4, 3, 2, 1, 1, 1],
            Metadata::default(),
        )
        .unwrap();
        let x1e = a.resolve(v.component_handle(1).unwrap()).unwrap();
        assert_eq!(x1e.read().dims(), [4, 4, 3, 1, 1, 1]);
    }

    #[test]
    fn comms_bind_once_and_follow_data() {
        let a = arena();
        let mut v = Variable::blank("u", Metadata::default()).unwrap();
        v.allocate_comms(BlockId(3)).unwrap();
        assert_eq!(v.comms().unwrap().buffer(), None);
        assert!(matches!(
            v.allocate_comms(BlockId(3)),
            Err(VariableError::CommsAlreadyAllocated { .. })
        ));
        v.finalize(&a, [2, 1, 1, 1, 1, 1]).unwrap();
        assert_eq!(v.comms().unwrap().buffer(), Some(v.data_handle().unwrap()));
        assert_eq!(v.comms().unwrap().block(), BlockId(3));
    }

    #[test]
    fn deep_copy_gets_new_handles_and_no_comms() {
        let a = arena();
        let mut v = cell(&a, &[MetadataFlag::Independent]);
        v.allocate_comms(BlockId(0)).unwrap();
        let c = v.deep_copy(&a, &a).unwrap();
        assert_ne!(c.data_handle().unwrap(), v.data_handle().unwrap());
        assert_eq!(c.handles().len(), 4);
        assert!(c.comms().is_none());
        assert!(v.check_compatible(&c).is_ok());
    }

    #[test]
    fn info_lists_outermost_first() {
        let a = arena();
        let v = cell(&a, &[MetadataFlag::Independent]);
        let info = v.info();
        assert!(info.starts_with("u "));
        assert!(info.contains("cell <1x1x1x2x3x4>"));
        assert!(info.contains("Independent"));
    }
}
