//! Per-build settings for future toolchain testing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::clamp::ClampPolicy;
use crate::core::filter::{FilterContext, FilterSet};
use crate::core::request::FutureVersionRequest;

/// Value of `force_*` when no version is given.
pub const DEFAULT_FORCED_VERSION: &str = "latest";

/// When to write internal compiler error reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportIces {
    #[default]
    Always,
    /// Report if the `reportICEs` property is present and not `false`.
    IfProperty,
    Never,
}

impl ReportIces {
    /// Whether reports are enabled, given the value of the `reportICEs` property.
    pub fn enabled(&self, property: Option<&str>) -> bool {
        match self {
            ReportIces::Always => true,
            ReportIces::IfProperty => property.is_some_and(|p| !p.eq_ignore_ascii_case("false")),
            ReportIces::Never => false,
        }
    }
}

impl fmt::Display for ReportIces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportIces::Always => write!(f, "always"),
            ReportIces::IfProperty => write!(f, "if-property"),
            ReportIces::Never => write!(f, "never"),
        }
    }
}

impl FromStr for ReportIces {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" => Ok(ReportIces::Always),
            "if-property" | "ifproperty" => Ok(ReportIces::IfProperty),
            "never" => Ok(ReportIces::Never),
            other => Err(format!(
                "unknown report mode `{}` (expected always, if-property or never)",
                other
            )),
        }
    }
}

/// Settings for one build, assembled from config files and build scripts.
#[derive(Debug, Clone)]
pub struct FutureSettings {
    /// Disables future versions even when properties are set
    pub disabled: bool,

    /// When to write ICE reports
    pub report_ices: ReportIces,

    /// Substitute `org.jetbrains.kotlin` dependencies, not just plugins
    pub substitute_dependencies: bool,

    /// Hard clamp; resolution fails if unsatisfied
    pub clamping: ClampPolicy,

    /// Soft clamp; falls back to `clamping` if unsatisfied
    pub preferred_clamping: Option<ClampPolicy>,

    filters: FilterSet,
    forced: Option<FutureVersionRequest>,
}

impl Default for FutureSettings {
    fn default() -> Self {
        FutureSettings {
            disabled: false,
            report_ices: ReportIces::Always,
            substitute_dependencies: true,
            clamping: ClampPolicy::None,
            preferred_clamping: None,
            filters: FilterSet::new(),
            forced: None,
        }
    }
}

impl FutureSettings {
    pub fn new() -> Self {
        FutureSettings::default()
    }

    /// Filter both bootstrap and EAP candidates.
    pub fn filter<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(&FilterContext, &str) -> bool + Send + Sync + 'static,
    {
        self.filters.filter(filter);
        self
    }

    /// Filter bootstrap candidates.
    pub fn filter_bootstrap<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(&FilterContext, &str) -> bool + Send + Sync + 'static,
    {
        self.filters.filter_bootstrap(filter);
        self
    }

    /// Filter EAP candidates.
    pub fn filter_eap<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(&FilterContext, &str) -> bool + Send + Sync + 'static,
    {
        self.filters.filter_eap(filter);
        self
    }

    /// Require the same feature version (e.g. `1.5`) as the original.
    pub fn require_same_feature_version(&mut self) -> &mut Self {
        self.clamping = ClampPolicy::Feature;
        self
    }

    /// Require the same incremental version (e.g. `1.5.2`) as the original.
    pub fn require_same_incremental_version(&mut self) -> &mut Self {
        self.clamping = ClampPolicy::Incremental;
        self
    }

    /// Prefer the same feature version as the original.
    pub fn prefer_same_feature_version(&mut self) -> &mut Self {
        self.preferred_clamping = Some(ClampPolicy::Feature);
        self
    }

    /// Prefer the same incremental version as the original.
    pub fn prefer_same_incremental_version(&mut self) -> &mut Self {
        self.preferred_clamping = Some(ClampPolicy::Incremental);
        self
    }

    /// Use a bootstrap version regardless of properties. Does not override
    /// [`disabled`](Self::disabled).
    pub fn force_bootstrap(&mut self, version: impl Into<String>) -> &mut Self {
        self.forced = Some(FutureVersionRequest::Bootstrap(version.into()));
        self
    }

    /// Use an EAP version regardless of properties. Does not override
    /// [`disabled`](Self::disabled).
    pub fn force_eap(&mut self, version: impl Into<String>) -> &mut Self {
        self.forced = Some(FutureVersionRequest::Eap(version.into()));
        self
    }

    pub fn forced(&self) -> Option<&FutureVersionRequest> {
        self.forced.as_ref()
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_gate() {
        assert!(ReportIces::Always.enabled(None));
        assert!(!ReportIces::Never.enabled(Some("true")));
        assert!(!ReportIces::IfProperty.enabled(None));
        assert!(!ReportIces::IfProperty.enabled(Some("FALSE")));
        assert!(ReportIces::IfProperty.enabled(Some("")));
        assert!(ReportIces::IfProperty.enabled(Some("true")));
    }

    #[test]
    fn test_builder_methods() {
        let mut settings = FutureSettings::new();
        settings
            .require_same_feature_version()
            .prefer_same_incremental_version()
            .force_eap(DEFAULT_FORCED_VERSION)
            .filter(|_, v| !v.contains("-M"));

        assert_eq!(settings.clamping, ClampPolicy::Feature);
        assert_eq!(settings.preferred_clamping, Some(ClampPolicy::Incremental));
        assert_eq!(
            settings.forced(),
            Some(&FutureVersionRequest::Eap("latest".to_string()))
        );
        assert_eq!(settings.filters().bootstrap().len(), 1);
        assert_eq!(settings.filters().eap().len(), 1);
    }

    #[test]
    fn test_parse_report_mode() {
        assert_eq!(
            "if-property".parse::<ReportIces>().unwrap(),
            ReportIces::IfProperty
        );
        assert!("sometimes".parse::<ReportIces>().is_err());
    }
}
