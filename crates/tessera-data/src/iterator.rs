//! Metadata-filtered views over a [`Container`].

use smallvec::SmallVec;
use tessera_core::MetadataSet;

use crate::container::Container;
use crate::variable::{Variable, VariableKind};

/// An ordered, read-only selection of a container's variables.
///
/// The selection holds references, not copies: array data resolved through
/// a selected variable is the container's own. Variables appear in
/// ascending label order, so iterators built with the same filter over two
/// containers holding the same labels line up position by position. Kernels
/// rely on this to pair an input variable with its output counterpart
/// without comparing labels.
///
/// A variable is selected when its metadata has at least one flag of the
/// filter. An empty filter selects every variable.
#[derive(Debug)]
pub struct ContainerIterator<'a> {
    container: &'a Container,
    vars: SmallVec<[&'a Variable; 8]>,
}

impl<'a> ContainerIterator<'a> {
    /// Select variables of any kind matching `filter`.
    pub fn new(container: &'a Container, filter: impl Into<MetadataSet>) -> Self {
        Self::select(container, filter.into(), None)
    }

    /// Select cell variables matching `filter`.
    pub fn cells(container: &'a Container, filter: impl Into<MetadataSet>) -> Self {
        Self::select(container, filter.into(), Some(VariableKind::Cell))
    }

    fn select(container: &'a Container, filter: MetadataSet, kind: Option<VariableKind>) -> Self {
        let vars = container
            .variables()
            .filter(|v| kind.is_none_or(|k| v.kind() == k))
            .filter(|v| filter.is_empty() || v.metadata().any_set(&filter))
            .collect();
        Self { container, vars }
    }

    /// The container this view selects from.
    pub fn container(&self) -> &'a Container {
        self.container
    }

    /// Number of selected variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// The `n`-th selected variable.
    pub fn get(&self, n: usize) -> Option<&'a Variable> {
        self.vars.get(n).copied()
    }

    /// Selected variables in order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Variable> + '_ {
        self.vars.iter().copied()
    }

    /// Labels of the selected variables in order.
    pub fn labels(&self) -> Vec<&'a str> {
        self.vars.iter().map(|v| v.label()).collect()
    }
}

impl<'a, 'b> IntoIterator for &'b ContainerIterator<'a> {
    type Item = &'a Variable;
    type IntoIter = std::iter::Copied<std::slice::Iter<'b, &'a Variable>>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_arena::{ArenaConfig, ArrayArena};
    use tessera_core::{Metadata, MetadataFlag};

    const SHAPE: [usize; 6] = [2, 1, 1, 1, 1, 1];

    fn container() -> Container {
        let arena = ArrayArena::new(ArenaConfig::default()).unwrap().into_shared();
        let mut c = Container::new(arena);
        c.add("rho", SHAPE, Metadata::new([MetadataFlag::Independent]))
            .unwrap();
        c.add("pressure", SHAPE, Metadata::new([MetadataFlag::Derived]))
            .unwrap();
        c.add("energy", SHAPE, Metadata::new([MetadataFlag::Independent]))
            .unwrap();
        c.add_face("bfield", SHAPE, Metadata::new([MetadataFlag::Independent]))
            .unwrap();
        c
    }

    #[test]
    fn filter_selects_matching_in_label_order() {
        let c = container();
        let it = ContainerIterator::new(&c, [MetadataFlag::Independent]);
        assert_eq!(it.labels(), vec!["bfield", "energy", "rho"]);
        let cells = ContainerIterator::cells(&c, [MetadataFlag::Independent]);
        assert_eq!(cells.labels(), vec!["energy", "rho"]);
    }

    #[test]
    fn any_flag_matches() {
        let c = container();
        let it = ContainerIterator::cells(&c, [MetadataFlag::Derived, MetadataFlag::Independent]);
        assert_eq!(it.len(), 3);
    }

    #[test]
    fn empty_filter_selects_all() {
        let c = container();
        assert_eq!(ContainerIterator::new(&c, MetadataSet::empty()).len(), 4);
    }

    #[test]
    fn matching_containers_align_by_position() {
        let a = container();
        let b = a.derive(&[], false).unwrap();
        let ia = ContainerIterator::cells(&a, [MetadataFlag::Independent]);
        let ib = ContainerIterator::cells(&b, [MetadataFlag::Independent]);
        for (va, vb) in ia.iter().zip(&ib) {
            assert_eq!(va.label(), vb.label());
            assert_ne!(va.data_handle().unwrap(), vb.data_handle().unwrap());
        }
    }

    #[test]
    fn writes_through_view_reach_container() {
        let c = container();
        let it = ContainerIterator::cells(&c, [MetadataFlag::Derived]);
        let var = it.get(0).unwrap();
        it.container()
            .resolve(var.data_handle().unwrap())
            .unwrap()
            .write()
            .fill(3.0);
        assert_eq!(c.data("pressure").unwrap().read().get(0, 0, 0, 1), 3.0);
    }
}
