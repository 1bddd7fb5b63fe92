//! Interfaces between the host build system and this crate.
//!
//! The host owns the project/task model and the scheduling of callbacks.
//! It describes each unit of work with a [`WorkUnit`], reports outcomes to a
//! [`UnitListener`], and asks a [`ResolutionHook`] before resolving each
//! plugin or dependency.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

use crate::resolver::errors::ResolveError;

/// A unit of work (task) executed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    /// Short name, e.g. `compileKotlin`
    name: String,
    /// Fully qualified path, e.g. `:app:compileKotlin`
    path: String,
    /// Name of the root project
    root_project_name: String,
    /// Root project directory
    root_dir: PathBuf,
    /// Declared input properties, stringified
    inputs: BTreeMap<String, String>,
}

impl WorkUnit {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        root_project_name: impl Into<String>,
        root_dir: impl Into<PathBuf>,
    ) -> Self {
        WorkUnit {
            name: name.into(),
            path: path.into(),
            root_project_name: root_project_name.into(),
            root_dir: root_dir.into(),
            inputs: BTreeMap::new(),
        }
    }

    /// Add a declared input property.
    pub fn with_input(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.inputs.insert(key.into(), value.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn root_project_name(&self) -> &str {
        &self.root_project_name
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn inputs(&self) -> &BTreeMap<String, String> {
        &self.inputs
    }
}

/// A failed unit of work.
///
/// Hosts typically wrap the real failure; `cause` holds it.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct UnitFailure {
    message: String,
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl UnitFailure {
    pub fn new(message: impl Into<String>) -> Self {
        UnitFailure {
            message: message.into(),
            cause: None,
        }
    }

    /// Attach the underlying cause.
    pub fn with_cause(
        mut self,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

/// The outcome of a unit of work.
#[derive(Debug)]
pub enum UnitOutcome {
    Success,
    Failed(UnitFailure),
}

impl UnitOutcome {
    pub fn failure(&self) -> Option<&UnitFailure> {
        match self {
            UnitOutcome::Success => None,
            UnitOutcome::Failed(failure) => Some(failure),
        }
    }
}

/// Observer of unit-of-work execution.
pub trait UnitListener {
    /// Called before the unit runs.
    fn on_unit_start(&self, unit: &WorkUnit);

    /// Called with each chunk the unit writes to standard error.
    fn on_unit_output(&self, unit: &WorkUnit, chunk: &str);

    /// Called after the unit finishes.
    fn on_unit_complete(&self, unit: &WorkUnit, outcome: &UnitOutcome);
}

/// A version override for a plugin or dependency request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// Version to use instead of the requested one
    pub version: String,
    /// Human-readable reason, shown by the host
    pub reason: String,
}

/// Hook consulted by the host during plugin and dependency resolution.
pub trait ResolutionHook {
    /// Called once per plugin request; may override its version.
    fn on_plugin_resolve(
        &self,
        plugin_id: &str,
        requested: Option<&str>,
    ) -> Result<Option<Substitution>, ResolveError>;

    /// Called once per dependency request; may override its version.
    fn on_dependency_resolve(
        &self,
        group: &str,
        name: &str,
        requested: Option<&str>,
    ) -> Result<Option<Substitution>, ResolveError>;

    /// Extra repositories to add to plugin and dependency resolution.
    fn repositories(&self) -> Vec<Url>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_failure_cause_chain() {
        let failure = UnitFailure::new("Execution failed for task ':compileKotlin'.")
            .with_cause("Internal compiler error in IR lowering");

        let source = failure.source().unwrap();
        assert_eq!(source.to_string(), "Internal compiler error in IR lowering");
        assert!(failure.cause().is_some());
    }

    #[test]
    fn test_work_unit_inputs() {
        let unit = WorkUnit::new("compileKotlin", ":app:compileKotlin", "demo", "/tmp/demo")
            .with_input("jvmTarget", "11")
            .with_input("incremental", true);

        assert_eq!(unit.inputs().get("incremental").unwrap(), "true");
        assert_eq!(unit.inputs().len(), 2);
    }
}
