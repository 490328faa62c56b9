//! Reusable package fixtures.
//!
//! - [`ConservedFields`] declares independent cell variables.
//! - [`FixedTimestep`] returns a scripted timestep estimate.
//! - [`RecordingFill`] logs each derived-field call into a shared journal.
//! - [`FailingFill`] fails every derived-field call.

use std::sync::Arc;

use parking_lot::Mutex;
use tessera_core::{Metadata, MetadataFlag, PackageError, Real};
use tessera_data::{Container, FieldDecl, Package};

/// Shared, ordered record of callback invocations.
pub type Journal = Arc<Mutex<Vec<String>>>;

/// A fresh, empty journal.
pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// Declares independent, ghost-filled cell variables with `components`
/// components each.
pub struct ConservedFields {
    pub name: String,
    pub labels: Vec<String>,
    pub components: usize,
}

impl ConservedFields {
    pub fn new(name: impl Into<String>, labels: &[&str], components: usize) -> Self {
        Self {
            name: name.into(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            components,
        }
    }
}

impl Package for ConservedFields {
    fn name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> Vec<FieldDecl> {
        self.labels
            .iter()
            .map(|label| {
                FieldDecl::new(
                    label.clone(),
                    Metadata::new([MetadataFlag::Independent, MetadataFlag::FillGhost]),
                )
                .with_components(self.components)
            })
            .collect()
    }
}

/// Returns the same timestep estimate, or none, for every container.
pub struct FixedTimestep {
    pub name: String,
    pub dt: Option<Real>,
}

impl FixedTimestep {
    pub fn new(name: impl Into<String>, dt: Option<Real>) -> Self {
        Self {
            name: name.into(),
            dt,
        }
    }
}

impl Package for FixedTimestep {
    fn name(&self) -> &str {
        &self.name
    }

    fn estimate_timestep(&self, _container: &Container) -> Option<Real> {
        self.dt
    }
}

/// Appends its name to a [`Journal`] on every derived-field call.
pub struct RecordingFill {
    pub name: String,
    pub journal: Journal,
}

impl RecordingFill {
    pub fn new(name: impl Into<String>, journal: &Journal) -> Self {
        Self {
            name: name.into(),
            journal: Arc::clone(journal),
        }
    }
}

impl Package for RecordingFill {
    fn name(&self) -> &str {
        &self.name
    }

    fn fill_derived(&self, _container: &Container) -> Result<(), PackageError> {
        self.journal.lock().push(self.name.clone());
        Ok(())
    }
}

/// Fails every derived-field call.
pub struct FailingFill {
    pub name: String,
}

impl FailingFill {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Package for FailingFill {
    fn name(&self) -> &str {
        &self.name
    }

    fn fill_derived(&self, _container: &Container) -> Result<(), PackageError> {
        Err(PackageError::ExecutionFailed {
            reason: format!("{} always fails", self.name),
        })
    }
}
