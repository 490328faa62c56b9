//! [`DataCollection`]: named stages of a block or of the whole mesh.
//!
//! A collection maps stage names to shared containers and always holds a
//! `"base"` stage. New stages are derived from an existing one by selecting
//! a subset of its variables, either aliasing their arrays (shallow) or
//! copying them (deep).
//!
//! # Partition cache
//!
//! The mesh-level collection can group the block list into packs and keep
//! one [`MeshData`] per pack under `"{label}_part-{k}"`. All packs of a
//! label are built together on first request. Each set of packs records the
//! [`BlockListGeneration`] it was built from; a request against a newer
//! block list drops the old packs and rebuilds them.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tessera_core::BlockListGeneration;
use tessera_mesh::partition;

use crate::block::BlockList;
use crate::container::Container;
use crate::error::DataError;
use crate::mesh_data::MeshData;

/// Name of the stage every collection holds.
pub const BASE_STAGE: &str = "base";

/// What a [`DataCollection`] can store.
pub trait StageData: Send + Sync + Sized + 'static {
    /// Labels from `labels` this stage does not hold.
    fn missing_fields(&self, labels: &[&str]) -> Vec<String>;

    /// A new stage holding `labels` (all when empty) of this one.
    fn derive(&self, labels: &[&str], shallow: bool) -> Result<Self, DataError>;

    /// Called once when a derived stage is registered under `name` by
    /// [`DataCollection::add`].
    fn on_registered(&self, _name: &str) {}
}

impl StageData for Container {
    fn missing_fields(&self, labels: &[&str]) -> Vec<String> {
        self.missing(labels)
    }

    fn derive(&self, labels: &[&str], shallow: bool) -> Result<Self, DataError> {
        Container::derive(self, labels, shallow)
    }
}

#[derive(Clone, Copy, Debug)]
struct PartitionRecord {
    generation: BlockListGeneration,
    count: usize,
}

/// A name → stage registry that always contains [`BASE_STAGE`].
///
/// Not internally synchronised: mutation takes `&mut self`. A block's
/// collection lives behind the block's own lock.
pub struct DataCollection<T> {
    stages: IndexMap<String, Arc<T>>,
    partitions: IndexMap<String, PartitionRecord>,
}

impl<T: StageData> DataCollection<T> {
    /// A collection whose base stage is `base`.
    pub fn new(base: T) -> Self {
        Self::with_shared_base(Arc::new(base))
    }

    /// A collection whose base stage is an already shared `base`.
    pub fn with_shared_base(base: Arc<T>) -> Self {
        let mut stages = IndexMap::new();
        stages.insert(BASE_STAGE.to_string(), base);
        Self {
            stages,
            partitions: IndexMap::new(),
        }
    }

    /// Register stage `name` derived from `src`.
    ///
    /// If `name` exists and holds every label of `labels` (an empty list
    /// always qualifies), the existing stage is returned unchanged.
    /// If it exists without some of them, this fails with
    /// [`DataError::NameCollision`]. Otherwise a new stage holding `labels`
    /// of `src` (all when empty) is created, aliasing `src`'s arrays when
    /// `shallow` and copying them otherwise.
    pub fn add(
        &mut self,
        name: &str,
        src: &Arc<T>,
        labels: &[&str],
        shallow: bool,
    ) -> Result<Arc<T>, DataError> {
        if let Some(existing) = self.stages.get(name) {
            let missing = existing.missing_fields(labels);
            if !missing.is_empty() {
                return Err(DataError::NameCollision {
                    name: name.to_string(),
                    missing,
                });
            }
            return Ok(Arc::clone(existing));
        }
        let stage = Arc::new(src.derive(labels, shallow)?);
        stage.on_registered(name);
        self.stages.insert(name.to_string(), Arc::clone(&stage));
        tracing::debug!(stage = name, fields = labels.len(), shallow, "stage added");
        Ok(stage)
    }

    /// [`add`](Self::add) with deep copies.
    pub fn add_deep(
        &mut self,
        name: &str,
        src: &Arc<T>,
        labels: &[&str],
    ) -> Result<Arc<T>, DataError> {
        self.add(name, src, labels, false)
    }

    /// [`add`](Self::add) with aliases.
    pub fn add_shallow(
        &mut self,
        name: &str,
        src: &Arc<T>,
        labels: &[&str],
    ) -> Result<Arc<T>, DataError> {
        self.add(name, src, labels, true)
    }

    /// [`add`](Self::add) from the stage named `src_name`.
    pub fn add_by_name(
        &mut self,
        name: &str,
        src_name: &str,
        labels: &[&str],
        shallow: bool,
    ) -> Result<Arc<T>, DataError> {
        let src = Arc::clone(self.get(src_name)?);
        self.add(name, &src, labels, shallow)
    }

    /// [`add_by_name`](Self::add_by_name) with deep copies.
    pub fn add_deep_by_name(
        &mut self,
        name: &str,
        src_name: &str,
        labels: &[&str],
    ) -> Result<Arc<T>, DataError> {
        self.add_by_name(name, src_name, labels, false)
    }

    /// [`add_by_name`](Self::add_by_name) with aliases.
    pub fn add_shallow_by_name(
        &mut self,
        name: &str,
        src_name: &str,
        labels: &[&str],
    ) -> Result<Arc<T>, DataError> {
        self.add_by_name(name, src_name, labels, true)
    }

    /// [`add`](Self::add) from the base stage.
    pub fn add_from_base(
        &mut self,
        name: &str,
        labels: &[&str],
        shallow: bool,
    ) -> Result<Arc<T>, DataError> {
        self.add_by_name(name, BASE_STAGE, labels, shallow)
    }

    /// [`add_from_base`](Self::add_from_base) with deep copies.
    pub fn add_deep_from_base(
        &mut self,
        name: &str,
        labels: &[&str],
    ) -> Result<Arc<T>, DataError> {
        self.add_from_base(name, labels, false)
    }

    /// [`add_from_base`](Self::add_from_base) with aliases.
    pub fn add_shallow_from_base(
        &mut self,
        name: &str,
        labels: &[&str],
    ) -> Result<Arc<T>, DataError> {
        self.add_from_base(name, labels, true)
    }

    /// Register `stage` under `name`, replacing any previous stage.
    pub fn set(&mut self, name: &str, stage: Arc<T>) {
        self.stages.insert(name.to_string(), stage);
    }

    /// The stage named `name`.
    pub fn get(&self, name: &str) -> Result<&Arc<T>, DataError> {
        self.stages.get(name).ok_or_else(|| DataError::StageNotFound {
            name: name.to_string(),
        })
    }

    /// The base stage.
    pub fn get_base(&self) -> &Arc<T> {
        &self.stages[BASE_STAGE]
    }

    /// Whether a stage named `name` exists.
    pub fn contains_stage(&self, name: &str) -> bool {
        self.stages.contains_key(name)
    }

    /// Stage names in registration order.
    pub fn stages(&self) -> impl Iterator<Item = &str> {
        self.stages.keys().map(String::as_str)
    }

    /// Number of stages, base included.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always `false`: the base stage cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Drop every stage except the base, partitions included.
    pub fn purge_non_base(&mut self) {
        let before = self.stages.len();
        self.stages.retain(|name, _| name == BASE_STAGE);
        self.partitions.clear();
        tracing::debug!(dropped = before - self.stages.len(), "purged non-base stages");
    }
}

/// Cache key of partition `id` of stage `label`.
pub fn partition_key(label: &str, id: usize) -> String {
    format!("{label}_part-{id}")
}

impl DataCollection<MeshData> {
    /// Partition `id` of stage `label` for the current `blocks`.
    ///
    /// On the first request for `label`, or when `blocks` has moved to a new
    /// generation since the partitions were built, the block list is split
    /// into packs of `blocks.pack_size()` and one [`MeshData`] per pack is
    /// registered, each bound to its blocks' own `label` stage. Later
    /// requests return the cached entry.
    pub fn get_or_add_by_partition(
        &mut self,
        blocks: &BlockList,
        label: &str,
        id: usize,
    ) -> Result<Arc<MeshData>, DataError> {
        let current = blocks.generation();
        let record = match self.partitions.get(label).copied() {
            Some(r) if r.generation == current => r,
            stale => {
                if let Some(old) = stale {
                    tracing::warn!(
                        label,
                        built = %old.generation,
                        current = %current,
                        "partition cache stale, rebuilding"
                    );
                    for k in 0..old.count {
                        self.stages.shift_remove(&partition_key(label, k));
                    }
                }
                self.build_partitions(blocks, label)?
            }
        };
        if id >= record.count {
            return Err(DataError::PartitionOutOfRange {
                label: label.to_string(),
                id,
                count: record.count,
            });
        }
        self.get(&partition_key(label, id)).map(Arc::clone)
    }

    /// Number of partitions currently cached for `label`.
    pub fn partition_count(&self, label: &str) -> Option<usize> {
        self.partitions.get(label).map(|r| r.count)
    }

    fn build_partitions(
        &mut self,
        blocks: &BlockList,
        label: &str,
    ) -> Result<PartitionRecord, DataError> {
        let pack_size = blocks.pack_size().unwrap_or(0);
        let packs = partition::to_size_n(blocks.as_slice(), pack_size);
        let built = packs
            .iter()
            .map(|pack| MeshData::set(pack, label))
            .collect::<Result<Vec<_>, _>>()?;
        let record = PartitionRecord {
            generation: blocks.generation(),
            count: built.len(),
        };
        for (k, md) in built.into_iter().enumerate() {
            self.stages.insert(partition_key(label, k), Arc::new(md));
        }
        self.partitions.insert(label.to_string(), record);
        tracing::debug!(
            label,
            partitions = record.count,
            pack_size = ?blocks.pack_size(),
            generation = %record.generation,
            "partitions materialized"
        );
        Ok(record)
    }
}

impl<T> fmt::Debug for DataCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataCollection")
            .field("stages", &self.stages.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_arena::{ArenaConfig, ArrayArena};
    use tessera_core::{Metadata, MetadataFlag};

    fn collection() -> DataCollection<Container> {
        let arena = ArrayArena::new(ArenaConfig::default()).unwrap().into_shared();
        let mut base = Container::new(arena);
        let m = Metadata::new([MetadataFlag::Independent]);
        base.add("a", [3, 1, 1, 1, 1, 1], m.clone()).unwrap();
        base.add("b", [3, 1, 1, 1, 1, 1], m).unwrap();
        DataCollection::new(base)
    }

    #[test]
    fn base_always_present() {
        let c = collection();
        assert_eq!(c.stages().collect::<Vec<_>>(), vec![BASE_STAGE]);
        assert_eq!(c.get_base().len(), 2);
        assert!(!c.is_empty());
    }

    #[test]
    fn add_existing_with_empty_labels_is_idempotent() {
        let mut c = collection();
        let s1 = c.add_deep_from_base("s1", &["a"]).unwrap();
        let again = c.add_deep_from_base("s1", &[]).unwrap();
        assert!(Arc::ptr_eq(&s1, &again));
    }

    #[test]
    fn missing_source_is_lookup_error() {
        let mut c = collection();
        assert_eq!(
            c.add_shallow_by_name("s1", "nope", &[]).err(),
            Some(DataError::StageNotFound {
                name: "nope".to_string()
            })
        );
        assert!(!c.contains_stage("s1"));
    }

    #[test]
    fn shallow_overload_aliases() {
        let mut c = collection();
        let s = c.add_shallow_by_name("s", BASE_STAGE, &["a"]).unwrap();
        assert!(s.is_alias("a").unwrap());
        let d = c.add_deep_by_name("d", BASE_STAGE, &["a"]).unwrap();
        assert!(!d.is_alias("a").unwrap());
    }

    #[test]
    fn set_replaces_and_get_finds() {
        let mut c = collection();
        let base = Arc::clone(c.get_base());
        c.set("copy", Arc::clone(&base));
        assert!(Arc::ptr_eq(c.get("copy").unwrap(), &base));
    }

    #[test]
    fn partition_key_format() {
        assert_eq!(partition_key("base", 3), "base_part-3");
    }
}
