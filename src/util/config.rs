//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.toolchain-future/config.toml` - User-wide defaults
//! - Project: `.toolchain-future/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::clamp::ClampPolicy;
use crate::core::filter::regex_filter;
use crate::core::settings::{FutureSettings, ReportIces};
use crate::util::diagnostic::ConfigParseError;

/// Name of the configuration directory, globally and per project.
pub const CONFIG_DIR: &str = ".toolchain-future";

/// Errors turning configuration values into settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid filter regex `{pattern}` in [filters].{section}")]
    InvalidFilter {
        section: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid value for `{key}`: {message}")]
    InvalidValue { key: &'static str, message: String },

    #[error("`force_bootstrap` and `force_eap` cannot both be set")]
    ConflictingForce,
}

/// Tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Future version settings
    pub future: FutureConfig,

    /// Version filters
    pub filters: FiltersConfig,

    /// Workflow generation defaults
    pub workflow: WorkflowConfig,
}

/// `[future]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FutureConfig {
    /// Never use future versions
    pub disabled: Option<bool>,

    /// `always`, `if-property` or `never`
    pub report_ices: Option<String>,

    /// Substitute toolchain dependencies as well as plugins
    pub substitute_dependencies: Option<bool>,

    /// Required clamp: `none`, `feature` or `incremental`
    pub require_same: Option<String>,

    /// Preferred clamp: `none`, `feature` or `incremental`
    pub prefer_same: Option<String>,

    /// Force a bootstrap version (`latest` or a literal)
    pub force_bootstrap: Option<String>,

    /// Force an EAP version (`latest` or a literal)
    pub force_eap: Option<String>,
}

/// `[filters]` section. Each entry is a regex every candidate must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FiltersConfig {
    /// Applied to both kinds
    pub all: Vec<String>,

    pub bootstrap: Vec<String>,

    pub eap: Vec<String>,
}

/// `[workflow]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub jdk: Option<String>,

    /// Runner OS labels
    pub runners: Vec<String>,

    /// Branch for scheduled runs
    pub branch: Option<String>,

    /// Overwrite existing workflow files
    pub force: Option<bool>,

    /// `daily`, `weekly[:day]`, `monthly[:day]` or `none`
    pub schedule: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .map_err(|e| ConfigParseError::new(path, contents.clone(), &e).into())
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let future = other.future;
        merge_option(&mut self.future.disabled, future.disabled);
        merge_option(&mut self.future.report_ices, future.report_ices);
        merge_option(
            &mut self.future.substitute_dependencies,
            future.substitute_dependencies,
        );
        merge_option(&mut self.future.require_same, future.require_same);
        merge_option(&mut self.future.prefer_same, future.prefer_same);
        if future.force_bootstrap.is_some() || future.force_eap.is_some() {
            self.future.force_bootstrap = future.force_bootstrap;
            self.future.force_eap = future.force_eap;
        }

        // Filter lists are replaced, not appended
        let filters = other.filters;
        merge_vec(&mut self.filters.all, filters.all);
        merge_vec(&mut self.filters.bootstrap, filters.bootstrap);
        merge_vec(&mut self.filters.eap, filters.eap);

        let workflow = other.workflow;
        merge_option(&mut self.workflow.jdk, workflow.jdk);
        merge_vec(&mut self.workflow.runners, workflow.runners);
        merge_option(&mut self.workflow.branch, workflow.branch);
        merge_option(&mut self.workflow.force, workflow.force);
        merge_option(&mut self.workflow.schedule, workflow.schedule);
    }

    /// Build the per-build settings this configuration describes.
    pub fn to_settings(&self) -> Result<FutureSettings, ConfigError> {
        let mut settings = FutureSettings::new();
        let future = &self.future;

        if let Some(disabled) = future.disabled {
            settings.disabled = disabled;
        }
        if let Some(mode) = &future.report_ices {
            settings.report_ices = mode
                .parse::<ReportIces>()
                .map_err(|message| ConfigError::InvalidValue {
                    key: "report_ices",
                    message,
                })?;
        }
        if let Some(substitute) = future.substitute_dependencies {
            settings.substitute_dependencies = substitute;
        }
        if let Some(clamp) = &future.require_same {
            settings.clamping = parse_clamp("require_same", clamp)?;
        }
        if let Some(clamp) = &future.prefer_same {
            settings.preferred_clamping = Some(parse_clamp("prefer_same", clamp)?);
        }

        match (&future.force_bootstrap, &future.force_eap) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingForce),
            (Some(version), None) => {
                settings.force_bootstrap(version.as_str());
            }
            (None, Some(version)) => {
                settings.force_eap(version.as_str());
            }
            (None, None) => {}
        }

        for regex in compile_filters("all", &self.filters.all)? {
            settings.filter(regex_filter(regex));
        }
        for regex in compile_filters("bootstrap", &self.filters.bootstrap)? {
            settings.filter_bootstrap(regex_filter(regex));
        }
        for regex in compile_filters("eap", &self.filters.eap)? {
            settings.filter_eap(regex_filter(regex));
        }

        Ok(settings)
    }
}

fn merge_option<T>(base: &mut Option<T>, other: Option<T>) {
    if other.is_some() {
        *base = other;
    }
}

fn merge_vec<T>(base: &mut Vec<T>, other: Vec<T>) {
    if !other.is_empty() {
        *base = other;
    }
}

fn parse_clamp(key: &'static str, value: &str) -> Result<ClampPolicy, ConfigError> {
    value
        .parse()
        .map_err(|message| ConfigError::InvalidValue { key, message })
}

fn compile_filters(section: &'static str, patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidFilter {
                section,
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.toolchain-future/config.toml)
/// 2. Global config (~/.toolchain-future/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global config directory (~/.toolchain-future).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the global config path (~/.toolchain-future/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.toolchain-future/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join("config.toml")
}
