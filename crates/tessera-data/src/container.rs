//! [`Container`]: the field set of one block.
//!
//! A container maps labels to [`Variable`]s and records, per variable,
//! whether it owns the arrays ([`Binding::Owned`]) or merely aliases arrays
//! owned by another container ([`Binding::Alias`]). Owned arrays are
//! released when the container is dropped; aliased arrays are not.
//!
//! Variables are kept in ascending label order, so two containers holding
//! the same labels iterate in the same order.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tessera_arena::{ArrayHandle, Shape, SharedArena, SharedArray};
use tessera_core::Metadata;

use crate::block::BlockInfo;
use crate::error::{DataError, VariableError};
use crate::variable::{release_all, Variable, VariableKind};

/// How a container holds a variable's arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Binding {
    /// The container owns the arrays and releases them on drop.
    Owned,
    /// The container shares arrays owned elsewhere.
    Alias,
}

struct Entry {
    var: Variable,
    binding: Binding,
}

/// The labeled variables of one block.
pub struct Container {
    arena: SharedArena,
    block: Option<Arc<BlockInfo>>,
    entries: IndexMap<String, Entry>,
}

impl Container {
    /// An empty container not bound to any block.
    pub fn new(arena: SharedArena) -> Self {
        Self {
            arena,
            block: None,
            entries: IndexMap::new(),
        }
    }

    /// An empty container bound to `block`.
    pub fn with_block(arena: SharedArena, block: Arc<BlockInfo>) -> Self {
        Self {
            arena,
            block: Some(block),
            entries: IndexMap::new(),
        }
    }

    /// The arena holding this container's arrays.
    pub fn arena(&self) -> &SharedArena {
        &self.arena
    }

    /// The block this container belongs to.
    pub fn block(&self) -> Option<&Arc<BlockInfo>> {
        self.block.as_ref()
    }

    /// Bind the container to `block`.
    pub fn set_block(&mut self, block: Arc<BlockInfo>) {
        self.block = Some(block);
    }

    /// Allocate and add a cell variable.
    ///
    /// Independent variables also get one flux buffer per direction.
    pub fn add(
        &mut self,
        label: impl Into<String>,
        shape: Shape,
        metadata: Metadata,
    ) -> Result<(), DataError> {
        self.add_kind(label.into(), VariableKind::Cell, shape, metadata)
    }

    /// Allocate and add a face variable. `shape` is the cell-centered shape.
    pub fn add_face(
        &mut self,
        label: impl Into<String>,
        shape: Shape,
        metadata: Metadata,
    ) -> Result<(), DataError> {
        self.add_kind(label.into(), VariableKind::Face, shape, metadata)
    }

    /// Allocate and add an edge variable. `shape` is the cell-centered shape.
    pub fn add_edge(
        &mut self,
        label: impl Into<String>,
        shape: Shape,
        metadata: Metadata,
    ) -> Result<(), DataError> {
        self.add_kind(label.into(), VariableKind::Edge, shape, metadata)
    }

    /// Add a blank variable, to be given storage later with
    /// [`finalize`](Self::finalize).
    pub fn add_blank(&mut self, var: Variable) -> Result<(), DataError> {
        if var.is_allocated() {
            return Err(VariableError::AlreadyAllocated {
                label: var.label().to_string(),
            }
            .into());
        }
        self.insert(var, Binding::Owned)
    }

    fn add_kind(
        &mut self,
        label: String,
        kind: VariableKind,
        shape: Shape,
        metadata: Metadata,
    ) -> Result<(), DataError> {
        if self.entries.contains_key(&label) {
            return Err(DataError::DuplicateVariable { label });
        }
        let var = Variable::allocate(&self.arena, label, kind, shape, metadata)?;
        self.insert(var, Binding::Owned)
    }

    /// Insert a variable. On failure an owned variable's arrays are
    /// released.
    fn insert(&mut self, var: Variable, binding: Binding) -> Result<(), DataError> {
        if let Some(existing) = self.entries.get(var.label()) {
            let err = match existing.var.check_compatible(&var) {
                Ok(()) => DataError::DuplicateVariable {
                    label: var.label().to_string(),
                },
                Err(reason) => DataError::VariableConflict {
                    label: var.label().to_string(),
                    reason,
                },
            };
            if binding == Binding::Owned {
                release_all(&self.arena, &var.handles());
            }
            return Err(err);
        }
        self.entries
            .insert(var.label().to_string(), Entry { var, binding });
        self.entries.sort_unstable_keys();
        Ok(())
    }

    fn entry(&self, label: &str) -> Result<&Entry, DataError> {
        self.entries
            .get(label)
            .ok_or_else(|| DataError::VariableNotFound {
                label: label.to_string(),
            })
    }

    fn owned_entry_mut(&mut self, label: &str) -> Result<&mut Variable, DataError> {
        let entry = self
            .entries
            .get_mut(label)
            .ok_or_else(|| DataError::VariableNotFound {
                label: label.to_string(),
            })?;
        if entry.binding == Binding::Alias {
            return Err(DataError::AliasedVariable {
                label: label.to_string(),
            });
        }
        Ok(&mut entry.var)
    }

    fn entry_mut(&mut self, label: &str) -> Result<&mut Variable, DataError> {
        self.entries
            .get_mut(label)
            .map(|e| &mut e.var)
            .ok_or_else(|| DataError::VariableNotFound {
                label: label.to_string(),
            })
    }

    /// Give storage to a blank variable and repoint its communication
    /// buffer.
    pub fn finalize(&mut self, label: &str, shape: Shape) -> Result<(), DataError> {
        let arena = Arc::clone(&self.arena);
        self.owned_entry_mut(label)?.finalize(&arena, shape)
    }

    /// Allocate the coarse-representation buffer of a cell variable.
    pub fn allocate_coarse(&mut self, label: &str, shape: Shape) -> Result<(), DataError> {
        let arena = Arc::clone(&self.arena);
        self.owned_entry_mut(label)?.allocate_coarse(&arena, shape)
    }

    /// Create the communication resource of a cell variable, bound to this
    /// container's block.
    pub fn allocate_comms(&mut self, label: &str) -> Result<(), DataError> {
        let block = match &self.block {
            Some(b) => b.id(),
            None => {
                return Err(VariableError::NoBlock {
                    label: label.to_string(),
                }
                .into())
            }
        };
        Ok(self.entry_mut(label)?.allocate_comms(block)?)
    }

    /// Repoint the communication buffer of every variable with comms at its
    /// current data array.
    pub fn reset_boundaries(&mut self) {
        for entry in self.entries.values_mut() {
            entry.var.reset_boundary();
        }
    }

    /// Repoint the communication buffer of one variable.
    pub fn reset_boundary(&mut self, label: &str) -> Result<(), DataError> {
        self.entry_mut(label)?.reset_boundary();
        Ok(())
    }

    /// Enable or disable boundary exchange for one variable.
    pub fn set_mpi_status(&mut self, label: &str, status: bool) -> Result<(), DataError> {
        self.entry_mut(label)?.set_mpi_status(status);
        Ok(())
    }

    /// Look up a variable.
    pub fn get(&self, label: &str) -> Result<&Variable, DataError> {
        Ok(&self.entry(label)?.var)
    }

    /// Whether this container shares `label`'s arrays with another.
    pub fn is_alias(&self, label: &str) -> Result<bool, DataError> {
        Ok(self.entry(label)?.binding == Binding::Alias)
    }

    /// How `label`'s arrays are held.
    pub fn binding(&self, label: &str) -> Result<Binding, DataError> {
        Ok(self.entry(label)?.binding)
    }

    /// Whether a variable named `label` is present.
    pub fn has(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    /// Whether every label in `labels` is present. An empty list is always
    /// contained.
    pub fn contains(&self, labels: &[&str]) -> bool {
        labels.iter().all(|l| self.has(l))
    }

    /// Labels from `labels` that are absent.
    pub fn missing(&self, labels: &[&str]) -> Vec<String> {
        labels
            .iter()
            .filter(|l| !self.has(l))
            .map(|l| l.to_string())
            .collect()
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the container holds no variables.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels in ascending order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Variables in ascending label order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.entries.values().map(|e| &e.var)
    }

    /// Resolve any handle held by this container.
    pub fn resolve(&self, handle: ArrayHandle) -> Result<SharedArray, DataError> {
        Ok(self.arena.resolve(handle)?)
    }

    /// The data array of a cell variable.
    pub fn data(&self, label: &str) -> Result<SharedArray, DataError> {
        self.resolve(self.get(label)?.data_handle()?)
    }

    /// The flux buffer of a cell variable along `dir` (1, 2 or 3).
    pub fn flux(&self, label: &str, dir: usize) -> Result<SharedArray, DataError> {
        self.resolve(self.get(label)?.flux_handle(dir)?)
    }

    /// The component of a face or edge variable along `dir` (1, 2 or 3).
    pub fn component(&self, label: &str, dir: usize) -> Result<SharedArray, DataError> {
        self.resolve(self.get(label)?.component_handle(dir)?)
    }

    /// The coarse buffer of a cell variable, if allocated.
    pub fn coarse(&self, label: &str) -> Result<Option<SharedArray>, DataError> {
        match self.get(label)?.coarse_handle() {
            Some(h) => Ok(Some(self.resolve(h)?)),
            None => Ok(None),
        }
    }

    /// Add `labels` from `src` (every variable when empty).
    ///
    /// Shallow initialization aliases `src`'s arrays, so writes through
    /// either container are visible in both, and needs both containers on
    /// the same arena. Deep initialization copies every array, including
    /// fluxes and coarse buffers, into storage owned by this container.
    pub fn initialize(
        &mut self,
        src: &Container,
        labels: &[&str],
        shallow: bool,
    ) -> Result<(), DataError> {
        let missing = src.missing(labels);
        if let Some(label) = missing.into_iter().next() {
            return Err(DataError::VariableNotFound { label });
        }
        let selected: Vec<&Variable> = if labels.is_empty() {
            src.variables().collect()
        } else {
            src.variables()
                .filter(|v| labels.contains(&v.label()))
                .collect()
        };
        if shallow && !Arc::ptr_eq(&self.arena, &src.arena) {
            if let Some(var) = selected.first() {
                return Err(DataError::ForeignArena {
                    label: var.label().to_string(),
                });
            }
        }
        if self.block.is_none() {
            self.block = src.block.clone();
        }
        for var in selected {
            if shallow {
                self.insert(var.alias(), Binding::Alias)?;
            } else {
                let copy = var.deep_copy(&src.arena, &self.arena)?;
                self.insert(copy, Binding::Owned)?;
            }
        }
        Ok(())
    }

    /// A new container on the same block holding `labels` of this one.
    pub fn derive(&self, labels: &[&str], shallow: bool) -> Result<Container, DataError> {
        let mut out = Container {
            arena: Arc::clone(&self.arena),
            block: self.block.clone(),
            entries: IndexMap::new(),
        };
        out.initialize(self, labels, shallow)?;
        Ok(out)
    }

    /// One line per variable, in label order.
    pub fn info(&self) -> String {
        self.variables()
            .map(Variable::info)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        for entry in self.entries.values() {
            if entry.binding == Binding::Owned {
                release_all(&self.arena, &entry.var.handles());
            }
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("block", &self.block.as_ref().map(|b| b.id()))
            .field("variables", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
