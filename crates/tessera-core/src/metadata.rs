//! Variable metadata: the [`MetadataFlag`] tags and the [`MetadataSet`] bitset.

use std::fmt;

/// A tag classifying a variable's role.
///
/// Flags are declared by physics packages when they register variables and
/// are used by kernels to select which variables they operate on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum MetadataFlag {
    /// Lives at cell centers.
    Cell = 0,
    /// Lives on cell faces.
    Face = 1,
    /// Lives on cell edges.
    Edge = 2,
    /// Lives on cell corners.
    Node = 3,
    /// Components transform as a vector.
    Vector = 4,
    /// Components transform as a tensor.
    Tensor = 5,
    /// Evolved by the time integrator.
    Independent = 6,
    /// Computed from independent variables each stage.
    Derived = 7,
    /// A single copy is shared by every stage.
    OneCopy = 8,
    /// Allocated only on blocks where it is non-zero.
    Sparse = 9,
    /// Ghost zones are filled by boundary exchange.
    FillGhost = 10,
    /// Transported by the flow.
    Advected = 11,
    /// A conserved quantity.
    Conserved = 12,
    /// An intensive quantity (averaged, not summed, on restriction).
    Intensive = 13,
    /// Written to restart files.
    Restart = 14,
    /// Written to graphics output.
    Graphics = 15,
}

impl MetadataFlag {
    /// Every flag, in declaration order.
    pub const ALL: [MetadataFlag; 16] = [
        Self::Cell,
        Self::Face,
        Self::Edge,
        Self::Node,
        Self::Vector,
        Self::Tensor,
        Self::Independent,
        Self::Derived,
        Self::OneCopy,
        Self::Sparse,
        Self::FillGhost,
        Self::Advected,
        Self::Conserved,
        Self::Intensive,
        Self::Restart,
        Self::Graphics,
    ];

    fn bit(self) -> u32 {
        1u32 << (self as u8)
    }

    fn is_topology(self) -> bool {
        matches!(self, Self::Cell | Self::Face | Self::Edge | Self::Node)
    }
}

impl fmt::Display for MetadataFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A set of [`MetadataFlag`]s implemented as a fixed-width bitset.
///
/// Used both as the flag payload of [`Metadata`] and as the filter a
/// container iterator matches against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MetadataSet {
    bits: u32,
}

impl MetadataSet {
    /// Create an empty set.
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Insert a flag into the set.
    pub fn insert(&mut self, flag: MetadataFlag) {
        self.bits |= flag.bit();
    }

    /// Remove a flag from the set.
    pub fn remove(&mut self, flag: MetadataFlag) {
        self.bits &= !flag.bit();
    }

    /// Check whether the set contains a flag.
    pub fn contains(&self, flag: MetadataFlag) -> bool {
        self.bits & flag.bit() != 0
    }

    /// Return the union of two sets (`self | other`).
    pub fn union(&self, other: &Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Return the intersection of two sets (`self & other`).
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            bits: self.bits & other.bits,
        }
    }

    /// Return the set difference (`self - other`).
    pub fn difference(&self, other: &Self) -> Self {
        Self {
            bits: self.bits & !other.bits,
        }
    }

    /// Whether the two sets share at least one flag.
    pub fn intersects(&self, other: &Self) -> bool {
        self.bits & other.bits != 0
    }

    /// Check whether `self` is a subset of `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.bits & !other.bits == 0
    }

    /// Returns `true` if the set contains no flags.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Number of flags in the set.
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Iterate over the flags in the set, in declaration order.
    pub fn iter(&self) -> MetadataSetIter {
        MetadataSetIter {
            bits: self.bits,
            next: 0,
        }
    }
}

impl FromIterator<MetadataFlag> for MetadataSet {
    fn from_iter<I: IntoIterator<Item = MetadataFlag>>(iter: I) -> Self {
        let mut set = Self::empty();
        for flag in iter {
            set.insert(flag);
        }
        set
    }
}

impl<const N: usize> From<[MetadataFlag; N]> for MetadataSet {
    fn from(flags: [MetadataFlag; N]) -> Self {
        flags.into_iter().collect()
    }
}

impl From<&[MetadataFlag]> for MetadataSet {
    fn from(flags: &[MetadataFlag]) -> Self {
        flags.iter().copied().collect()
    }
}

impl IntoIterator for &MetadataSet {
    type Item = MetadataFlag;
    type IntoIter = MetadataSetIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the flags of a [`MetadataSet`], in declaration order.
pub struct MetadataSetIter {
    bits: u32,
    next: usize,
}

impl Iterator for MetadataSetIter {
    type Item = MetadataFlag;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < MetadataFlag::ALL.len() {
            let flag = MetadataFlag::ALL[self.next];
            self.next += 1;
            if self.bits & flag.bit() != 0 {
                return Some(flag);
            }
        }
        None
    }
}

/// Classification attached to a variable at construction.
///
/// Immutable once the variable exists. Besides its flags a variable may name
/// an associated variable (e.g. the independent field a derived quantity is
/// computed from).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    flags: MetadataSet,
    associated: Option<String>,
}

impl Metadata {
    /// Build metadata from a list of flags.
    pub fn new(flags: impl IntoIterator<Item = MetadataFlag>) -> Self {
        Self {
            flags: flags.into_iter().collect(),
            associated: None,
        }
    }

    /// Attach an associated variable label.
    pub fn with_associated(mut self, label: impl Into<String>) -> Self {
        self.associated = Some(label.into());
        self
    }

    /// Add one flag.
    pub fn with_flag(mut self, flag: MetadataFlag) -> Self {
        self.flags.insert(flag);
        self
    }

    /// The flag set.
    pub fn flags(&self) -> MetadataSet {
        self.flags
    }

    /// Whether a single flag is set.
    pub fn is_set(&self, flag: MetadataFlag) -> bool {
        self.flags.contains(flag)
    }

    /// Whether any flag of `filter` is set.
    pub fn any_set(&self, filter: &MetadataSet) -> bool {
        self.flags.intersects(filter)
    }

    /// Whether every flag of `filter` is set.
    pub fn all_set(&self, filter: &MetadataSet) -> bool {
        filter.is_subset(&self.flags)
    }

    /// Label of the associated variable, if any.
    pub fn associated(&self) -> Option<&str> {
        self.associated.as_deref()
    }

    /// Check structural consistency of the flag combination.
    ///
    /// A variable is either independent or derived, never both, and has at
    /// most one topology (cell, face, edge or node).
    pub fn validate(&self) -> Result<(), String> {
        if self.is_set(MetadataFlag::Independent) && self.is_set(MetadataFlag::Derived) {
            return Err("flags Independent and Derived are mutually exclusive".to_string());
        }
        let topologies = self.flags.iter().filter(|f| f.is_topology()).count();
        if topologies > 1 {
            return Err(format!(
                "at most one topology flag may be set, found {topologies}"
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for flag in self.flags.iter() {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{flag}")?;
            first = false;
        }
        if let Some(assoc) = &self.associated {
            write!(f, " (associated: {assoc})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_set() -> impl Strategy<Value = MetadataSet> {
        prop::collection::vec(0usize..MetadataFlag::ALL.len(), 0..8)
            .prop_map(|ix| ix.into_iter().map(|i| MetadataFlag::ALL[i]).collect())
    }

    #[test]
    fn any_set_matches_single_shared_flag() {
        let m = Metadata::new([MetadataFlag::Cell, MetadataFlag::Independent]);
        let filter = MetadataSet::from([MetadataFlag::Independent, MetadataFlag::Derived]);
        assert!(m.any_set(&filter));
        assert!(!m.all_set(&filter));
    }

    #[test]
    fn validate_rejects_independent_and_derived() {
        let m = Metadata::new([MetadataFlag::Independent, MetadataFlag::Derived]);
        assert!(m.validate().is_err());
    }

    #[test]
    fn validate_rejects_two_topologies() {
        let m = Metadata::new([MetadataFlag::Cell, MetadataFlag::Face]);
        assert!(m.validate().is_err());
        assert!(Metadata::new([MetadataFlag::Face]).validate().is_ok());
    }

    #[test]
    fn associated_label_round_trips() {
        let m = Metadata::new([MetadataFlag::Derived]).with_associated("density");
        assert_eq!(m.associated(), Some("density"));
        assert_eq!(m.to_string(), "Derived (associated: density)");
    }

    #[test]
    fn with_flag_keeps_associated_label() {
        let m = Metadata::new([MetadataFlag::Derived])
            .with_associated("density")
            .with_flag(MetadataFlag::Cell);
        assert!(m.is_set(MetadataFlag::Cell));
        assert_eq!(m.associated(), Some("density"));
    }

    #[test]
    fn iter_yields_declaration_order() {
        let s = MetadataSet::from([MetadataFlag::Sparse, MetadataFlag::Cell]);
        let flags: Vec<_> = s.iter().collect();
        assert_eq!(flags, vec![MetadataFlag::Cell, MetadataFlag::Sparse]);
    }

    proptest! {
        #[test]
        fn union_commutative(a in arb_set(), b in arb_set()) {
            prop_assert_eq!(a.union(&b), b.union(&a));
        }

        #[test]
        fn intersection_subset_of_both(a in arb_set(), b in arb_set()) {
            let i = a.intersection(&b);
            prop_assert!(i.is_subset(&a));
            prop_assert!(i.is_subset(&b));
        }

        #[test]
        fn intersects_iff_intersection_nonempty(a in arb_set(), b in arb_set()) {
            prop_assert_eq!(a.intersects(&b), !a.intersection(&b).is_empty());
        }

        #[test]
        fn difference_removes_common(a in arb_set(), b in arb_set()) {
            let diff = a.difference(&b);
            for flag in diff.iter() {
                prop_assert!(a.contains(flag));
                prop_assert!(!b.contains(flag));
            }
        }

        #[test]
        fn len_matches_iter_count(a in arb_set()) {
            prop_assert_eq!(a.len(), a.iter().count());
        }
    }
}
