//! Plugin and dependency substitution for future toolchain builds.

use std::sync::Arc;

use url::Url;

use crate::core::host::{ResolutionHook, Substitution};
use crate::resolver::{ResolveError, VersionResolver};

/// Group (and plugin id prefix) of toolchain artifacts.
pub const KOTLIN_GROUP: &str = "org.jetbrains.kotlin";

/// Repository serving bootstrap toolchain artifacts.
pub const BOOTSTRAP_REPOSITORY: &str = "https://maven.pkg.jetbrains.space/kotlin/p/kotlin/bootstrap";

/// Whether a plugin id belongs to the toolchain.
pub fn is_kotlin_plugin(plugin_id: &str) -> bool {
    plugin_id
        .strip_prefix(KOTLIN_GROUP)
        .is_some_and(|rest| rest.starts_with('.'))
}

/// Whether a dependency group belongs to the toolchain.
pub fn is_kotlin_group(group: &str) -> bool {
    group == KOTLIN_GROUP || is_kotlin_plugin(group)
}

/// Rewrites toolchain plugin and dependency versions to the resolved future
/// version, and records the versions plugins declare as the original.
pub struct DependencySubstitutor {
    resolver: Arc<VersionResolver>,
}

impl DependencySubstitutor {
    pub fn new(resolver: Arc<VersionResolver>) -> Self {
        DependencySubstitutor { resolver }
    }

    fn substitution(&self, target: &str) -> Result<Substitution, ResolveError> {
        let version = self.resolver.resolve()?;
        tracing::info!("Using future version {} for {}", version.version(), target);
        Ok(Substitution {
            version: version.version().to_string(),
            reason: format!("Using Kotlin future version {}", version.version()),
        })
    }
}

impl ResolutionHook for DependencySubstitutor {
    fn on_plugin_resolve(
        &self,
        plugin_id: &str,
        requested: Option<&str>,
    ) -> Result<Option<Substitution>, ResolveError> {
        if !is_kotlin_plugin(plugin_id) {
            return Ok(None);
        }

        if let Some(version) = requested {
            self.resolver.observe_original_version(version);
        }

        if !self.resolver.is_future() {
            return Ok(None);
        }
        self.substitution(plugin_id).map(Some)
    }

    fn on_dependency_resolve(
        &self,
        group: &str,
        name: &str,
        _requested: Option<&str>,
    ) -> Result<Option<Substitution>, ResolveError> {
        if !self.resolver.settings().substitute_dependencies
            || !self.resolver.is_future()
            || !is_kotlin_group(group)
        {
            return Ok(None);
        }
        self.substitution(&format!("{}:{}", group, name)).map(Some)
    }

    fn repositories(&self) -> Vec<Url> {
        if !self.resolver.is_bootstrap() {
            return Vec::new();
        }
        match Url::parse(BOOTSTRAP_REPOSITORY) {
            Ok(url) => {
                tracing::info!("Using bootstrap version, adding bootstrap repository");
                vec![url]
            }
            Err(e) => {
                tracing::warn!("Invalid bootstrap repository URL: {}", e);
                Vec::new()
            }
        }
    }
}
