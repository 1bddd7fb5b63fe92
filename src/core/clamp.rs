//! Version clamping: keep candidates that share a numeric prefix with the
//! configured version.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::version::VersionKind;
use crate::resolver::errors::ResolveError;

static FEATURE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+)").expect("feature prefix regex"));

static INCREMENTAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+\.\d)").expect("incremental prefix regex"));

/// How strictly a future version must match the original version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClampPolicy {
    /// Take the newest candidate.
    #[default]
    None,
    /// Same `major.minor` (e.g. `1.5`).
    Feature,
    /// Same `major.minor.patch` (e.g. `1.5.2` for `1.5.20`).
    Incremental,
}

impl ClampPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClampPolicy::None => "none",
            ClampPolicy::Feature => "feature",
            ClampPolicy::Incremental => "incremental",
        }
    }

    /// The prefix candidates must start with, or `None` for no clamping.
    pub fn prefix(&self, original: &str) -> Result<Option<String>, ResolveError> {
        let (regex, err) = match self {
            ClampPolicy::None => return Ok(None),
            ClampPolicy::Feature => (
                &*FEATURE_PREFIX,
                ResolveError::NoFeaturePrefix {
                    original: original.to_string(),
                },
            ),
            ClampPolicy::Incremental => (
                &*INCREMENTAL_PREFIX,
                ResolveError::NoIncrementalPrefix {
                    original: original.to_string(),
                },
            ),
        };

        regex
            .captures(original)
            .and_then(|caps| caps.get(1))
            .map(|m| Some(m.as_str().to_string()))
            .ok_or(err)
    }

    /// The first candidate matching this policy, or `None` if nothing matches.
    ///
    /// Still fails when the original version has no extractable prefix, or
    /// when the policy is [`ClampPolicy::None`] and there are no candidates.
    pub fn matching_or_none(
        &self,
        original: &str,
        kind: VersionKind,
        versions: &[String],
    ) -> Result<Option<String>, ResolveError> {
        match self.prefix(original)? {
            None => versions
                .first()
                .cloned()
                .map(Some)
                .ok_or(ResolveError::NoCandidates { kind }),
            Some(prefix) => Ok(versions.iter().find(|v| v.starts_with(&prefix)).cloned()),
        }
    }

    /// The first candidate matching this policy.
    pub fn matching(
        &self,
        original: &str,
        kind: VersionKind,
        versions: &[String],
    ) -> Result<String, ResolveError> {
        if let Some(found) = self.matching_or_none(original, kind, versions)? {
            return Ok(found);
        }

        Err(ResolveError::NoMatchingClampedVersion {
            kind,
            clamp: *self,
            original: original.to_string(),
            prefix: self.prefix(original)?.unwrap_or_default(),
            available: versions.to_vec(),
        })
    }
}

impl fmt::Display for ClampPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClampPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(ClampPolicy::None),
            "feature" => Ok(ClampPolicy::Feature),
            "incremental" => Ok(ClampPolicy::Incremental),
            other => Err(format!(
                "unknown clamp policy `{}` (expected none, feature or incremental)",
                other
            )),
        }
    }
}
