//! Build properties (`gradle.properties`, environment, `-P` flags).
//!
//! Order of precedence (highest to lowest):
//! 1. Command-line `-P name=value`
//! 2. `ORG_GRADLE_PROJECT_<name>` environment variables
//! 3. `<root>/gradle.properties`

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Requests a bootstrap version (literal, `latest` or `auto`).
pub const BOOTSTRAP_PROPERTY: &str = "kotlinBootstrap";

/// Requests an EAP version (literal, `latest` or `auto`).
pub const EAP_PROPERTY: &str = "kotlinEap";

/// Enables ICE reports in [`ReportIces::IfProperty`](crate::core::settings::ReportIces) mode.
pub const REPORT_ICE_PROPERTY: &str = "reportICEs";

/// Environment prefix for project properties.
pub const ENV_PREFIX: &str = "ORG_GRADLE_PROJECT_";

/// Properties file read from the project root.
pub const PROPERTIES_FILE: &str = "gradle.properties";

/// A set of named build properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    values: BTreeMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Properties::default()
    }

    /// Set a property, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Get a property, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Merge another set into this one (other takes precedence).
    pub fn merge(&mut self, other: Properties) {
        self.values.extend(other.values);
    }

    /// Parse `key=value` lines. Blank lines and `#`/`!` comments are skipped.
    pub fn parse(contents: &str) -> Self {
        let mut props = Properties::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let (key, value) = match line.find(['=', ':']) {
                Some(idx) => (&line[..idx], &line[idx + 1..]),
                None => (line, ""),
            };
            props.set(key.trim(), value.trim());
        }
        props
    }

    /// Load a properties file, or nothing if it doesn't exist.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Properties::new());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read properties: {}", path.display()))?;
        Ok(Properties::parse(&contents))
    }

    /// Collect `ORG_GRADLE_PROJECT_<name>` variables.
    pub fn from_env<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut props = Properties::new();
        for (key, value) in vars {
            if let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) {
                if !name.is_empty() {
                    props.set(name, value);
                }
            }
        }
        props
    }

    /// Parse a `name=value` command-line assignment.
    pub fn parse_assignment(arg: &str) -> Result<(String, String)> {
        let (name, value) = match arg.split_once('=') {
            Some((name, value)) => (name.trim(), value),
            None => (arg.trim(), ""),
        };
        if name.is_empty() {
            bail!("invalid property `{}` (expected name=value)", arg);
        }
        Ok((name.to_string(), value.to_string()))
    }

    /// Load the project's properties with precedence applied.
    pub fn discover<I, K, V>(root: &Path, env: I, overrides: &[String]) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut props = Properties::load_file(&root.join(PROPERTIES_FILE))?;
        props.merge(Properties::from_env(env));
        for arg in overrides {
            let (name, value) = Properties::parse_assignment(arg)?;
            props.set(name, value);
        }
        Ok(props)
    }
}
