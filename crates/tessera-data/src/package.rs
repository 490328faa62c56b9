//! The [`Package`] trait and the ordered [`Packages`] registry.
//!
//! Physics packages live outside this crate. They describe the variables
//! they need ([`FieldDecl`]) and may provide two optional callbacks: a
//! derived-field fill and a timestep estimate.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tessera_core::{Metadata, PackageError, Real};

use crate::container::Container;
use crate::error::DataError;

/// A variable a package asks every block to carry.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDecl {
    /// Variable label.
    pub label: String,
    /// Metadata; the topology flag selects cell, face or edge storage.
    pub metadata: Metadata,
    /// Extent of the component dimension (dimension 4).
    pub components: usize,
}

impl FieldDecl {
    /// A scalar field.
    pub fn new(label: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            label: label.into(),
            metadata,
            components: 1,
        }
    }

    /// Set the number of components.
    pub fn with_components(mut self, components: usize) -> Self {
        self.components = components;
        self
    }
}

/// A physics package.
///
/// # Contract
///
/// - `fields()` is read once, when blocks are created.
/// - Both callbacks are optional. The defaults mean "not provided": a
///   package without `estimate_timestep` imposes no constraint and one
///   without `fill_derived` is skipped.
///
/// # Object safety
///
/// This trait is object-safe; packages are stored as `Arc<dyn Package>`.
///
/// # Examples
///
/// ```
/// use tessera_core::{Metadata, MetadataFlag, Real};
/// use tessera_data::{Container, FieldDecl, Package};
///
/// struct Advection {
///     speed: Real,
///     dx: Real,
/// }
///
/// impl Package for Advection {
///     fn name(&self) -> &str { "advection" }
///
///     fn fields(&self) -> Vec<FieldDecl> {
///         vec![FieldDecl::new("q", Metadata::new([MetadataFlag::Independent]))]
///     }
///
///     fn estimate_timestep(&self, _c: &Container) -> Option<Real> {
///         Some(self.dx / self.speed)
///     }
/// }
///
/// let pkg = Advection { speed: 2.0, dx: 0.5 };
/// assert_eq!(pkg.name(), "advection");
/// assert_eq!(pkg.fields().len(), 1);
/// ```
pub trait Package: Send + Sync + 'static {
    /// Name used as the registry key and in error messages.
    fn name(&self) -> &str;

    /// Variables this package needs on every block.
    ///
    /// Default: none.
    fn fields(&self) -> Vec<FieldDecl> {
        Vec::new()
    }

    /// Largest stable timestep for `container`, or `None` for no constraint.
    fn estimate_timestep(&self, _container: &Container) -> Option<Real> {
        None
    }

    /// Compute this package's derived variables in `container`.
    ///
    /// Default: nothing to do.
    fn fill_derived(&self, _container: &Container) -> Result<(), PackageError> {
        Ok(())
    }
}

/// Registered packages in registration order.
#[derive(Clone, Default)]
pub struct Packages {
    entries: IndexMap<String, Arc<dyn Package>>,
}

impl Packages {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package. Names must be unique.
    pub fn add(&mut self, package: impl Package) -> Result<(), DataError> {
        self.add_shared(Arc::new(package))
    }

    /// Register an already shared package.
    pub fn add_shared(&mut self, package: Arc<dyn Package>) -> Result<(), DataError> {
        let name = package.name().to_string();
        if self.entries.contains_key(&name) {
            return Err(DataError::DuplicatePackage { name });
        }
        self.entries.insert(name, package);
        Ok(())
    }

    /// Look up a package by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Package>> {
        self.entries.get(name)
    }

    /// Packages in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Package>> {
        self.entries.values()
    }

    /// Package names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of packages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no package is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Packages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Package for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn registration_order_preserved() {
        let mut p = Packages::new();
        p.add(Named("hydro")).unwrap();
        p.add(Named("advection")).unwrap();
        p.add(Named("chemistry")).unwrap();
        assert_eq!(
            p.names().collect::<Vec<_>>(),
            vec!["hydro", "advection", "chemistry"]
        );
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut p = Packages::new();
        p.add(Named("hydro")).unwrap();
        assert_eq!(
            p.add(Named("hydro")),
            Err(DataError::DuplicatePackage {
                name: "hydro".to_string()
            })
        );
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn defaults_are_absent_callbacks() {
        let arena = tessera_arena::ArrayArena::new(Default::default())
            .unwrap()
            .into_shared();
        let c = Container::new(arena);
        let pkg = Named("empty");
        assert!(pkg.fields().is_empty());
        assert_eq!(pkg.estimate_timestep(&c), None);
        assert_eq!(pkg.fill_derived(&c), Ok(()));
    }
}
