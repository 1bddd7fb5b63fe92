//! Per-build context.
//!
//! Gathers everything one build needs (root directory, build properties,
//! merged configuration) and wires the resolver, ICE listener and
//! substitution hook from it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::ice::listener::IceListener;
use crate::ice::store::{IceReportStore, ICE_REPORT_DIR};
use crate::ops::substitute::DependencySubstitutor;
use crate::ops::workflow::WorkflowGenerator;
use crate::resolver::VersionResolver;
use crate::sources::VersionFeed;
use crate::util::config::{global_config_path, load_config, project_config_path, Config};
use crate::util::properties::{Properties, REPORT_ICE_PROPERTY};

/// Context for one build rooted at a project directory.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Root project directory
    root_dir: PathBuf,

    /// Root project name, defaults to the directory name
    root_project_name: String,

    /// Build properties (gradle.properties, environment, overrides)
    properties: Properties,

    /// Merged global and project configuration
    config: Config,
}

impl BuildContext {
    /// Load properties and configuration for `root_dir`.
    ///
    /// `overrides` are `name=value` assignments that take precedence over
    /// every other property source.
    pub fn load(root_dir: &Path, overrides: &[String]) -> Result<Self> {
        let root_dir = root_dir
            .canonicalize()
            .with_context(|| format!("failed to access project root: {}", root_dir.display()))?;

        let properties = Properties::discover(&root_dir, std::env::vars(), overrides)?;
        let global = global_config_path();
        let config = load_config(global.as_deref(), &project_config_path(&root_dir));

        Ok(Self::new(root_dir, properties, config))
    }

    pub fn new(root_dir: impl Into<PathBuf>, properties: Properties, config: Config) -> Self {
        let root_dir = root_dir.into();
        let root_project_name = root_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "root".to_string());

        BuildContext {
            root_dir,
            root_project_name,
            properties,
            config,
        }
    }

    /// Override the root project name.
    pub fn with_root_project_name(mut self, name: impl Into<String>) -> Self {
        self.root_project_name = name.into();
        self
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn root_project_name(&self) -> &str {
        &self.root_project_name
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Directory ICE reports are written to.
    pub fn report_dir(&self) -> PathBuf {
        self.root_dir.join(ICE_REPORT_DIR)
    }

    /// The version resolver for this build.
    pub fn resolver(&self, feed: Arc<dyn VersionFeed>) -> Result<Arc<VersionResolver>> {
        let settings = self
            .config
            .to_settings()
            .context("invalid [future] or [filters] configuration")?;
        Ok(Arc::new(VersionResolver::new(settings, &self.properties, feed)))
    }

    /// The ICE listener, installed only when a future version is requested.
    pub fn ice_listener(&self, resolver: Arc<VersionResolver>) -> Option<IceListener> {
        if !resolver.is_future() {
            return None;
        }
        let mode = resolver.settings().report_ices;
        let store = IceReportStore::new(self.report_dir(), resolver);
        Some(IceListener::new(
            store,
            mode,
            self.properties.get(REPORT_ICE_PROPERTY),
        ))
    }

    /// The plugin and dependency substitution hook.
    pub fn substitutor(&self, resolver: Arc<VersionResolver>) -> DependencySubstitutor {
        DependencySubstitutor::new(resolver)
    }

    /// A workflow generator configured from `[workflow]`.
    pub fn workflow_generator(&self) -> Result<WorkflowGenerator> {
        let report_ices = self
            .config
            .to_settings()
            .map(|s| s.report_ices.enabled(Some("true")))
            .context("invalid [future] configuration")?;
        WorkflowGenerator::from_config(&self.root_dir, &self.config.workflow, report_ices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::ReportIces;
    use crate::test_support::{bootstrap_props, MockFeed};
    use tempfile::TempDir;

    #[test]
    fn test_load_reads_project_files() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("gradle.properties"), "kotlinEap=latest\n").unwrap();
        let config_path = project_config_path(tmp.path());
        std::fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        std::fs::write(&config_path, "[future]\nrequire_same = \"feature\"\n").unwrap();

        let ctx = BuildContext::load(tmp.path(), &["kotlinBootstrap=1.6.0-dev-1".to_string()])
            .unwrap();

        assert_eq!(ctx.properties().get("kotlinEap"), Some("latest"));
        assert_eq!(ctx.properties().get("kotlinBootstrap"), Some("1.6.0-dev-1"));
        assert_eq!(ctx.config().future.require_same.as_deref(), Some("feature"));
        assert!(ctx.report_dir().ends_with("build/kotlin-future-testing-ICE-report"));
    }

    #[test]
    fn test_listener_only_in_future_mode() {
        let tmp = TempDir::new().unwrap();
        let feed = MockFeed::new(&[], &[]);

        let normal = BuildContext::new(tmp.path(), Properties::new(), Config::default());
        let resolver = normal.resolver(feed.clone()).unwrap();
        assert!(normal.ice_listener(resolver).is_none());

        let future = BuildContext::new(tmp.path(), bootstrap_props("latest"), Config::default());
        let resolver = future.resolver(feed.clone()).unwrap();
        let listener = future.ice_listener(resolver).unwrap();
        assert!(listener.is_enabled());
        assert_eq!(feed.calls(), 0);
    }

    #[test]
    fn test_report_property_gate() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.future.report_ices = Some(ReportIces::IfProperty.to_string());
        let props = bootstrap_props("latest").with(REPORT_ICE_PROPERTY, "false");

        let ctx = BuildContext::new(tmp.path(), props, config);
        let resolver = ctx.resolver(MockFeed::new(&[], &[])).unwrap();
        assert!(!ctx.ice_listener(resolver).unwrap().is_enabled());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.filters.all = vec!["[".to_string()];

        let ctx = BuildContext::new(tmp.path(), Properties::new(), config);
        assert!(ctx.resolver(MockFeed::new(&[], &[])).is_err());
    }
}
