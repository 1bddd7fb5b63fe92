//! Resolution error types and diagnostics.

use thiserror::Error;

use crate::core::clamp::ClampPolicy;
use crate::core::version::VersionKind;
use crate::sources::FeedError;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error while resolving the future toolchain version.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no Kotlin version found, did you apply any Kotlin plugins?")]
    NoOriginalVersionFound,

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("no Kotlin {} versions to choose from", .kind.as_str())]
    NoCandidates { kind: VersionKind },

    #[error("no Kotlin {} version matches the configured filters", .kind.as_str())]
    NoVersionMatchingFilters {
        kind: VersionKind,
        available: Vec<String>,
    },

    #[error("can't find feature version of `{original}`")]
    NoFeaturePrefix { original: String },

    #[error("can't find incremental version of `{original}`")]
    NoIncrementalPrefix { original: String },

    #[error(
        "no Kotlin {} versions found with the same {clamp} version as {original} ({prefix})",
        .kind.as_str()
    )]
    NoMatchingClampedVersion {
        kind: VersionKind,
        clamp: ClampPolicy,
        original: String,
        prefix: String,
        available: Vec<String>,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::NoOriginalVersionFound => Diagnostic::error(self.to_string())
                .with_context("no `org.jetbrains.kotlin.*` plugin declared a version")
                .with_suggestion(suggestions::NO_ORIGINAL_VERSION),

            ResolveError::Feed(err) => err.to_diagnostic(),

            ResolveError::NoCandidates { .. } => Diagnostic::error(self.to_string()),

            ResolveError::NoVersionMatchingFilters { available, .. } => {
                let mut diag = Diagnostic::error(self.to_string());
                if !available.is_empty() {
                    diag = diag.with_context(format!("versions: {}", available.join(", ")));
                }
                diag.with_suggestion("Loosen the `[filters]` section of your config")
                    .with_suggestion(suggestions::CHECK_CONFIG)
            }

            ResolveError::NoFeaturePrefix { original }
            | ResolveError::NoIncrementalPrefix { original } => {
                Diagnostic::error(self.to_string())
                    .with_context(format!("original version `{}` is not numeric", original))
                    .with_suggestion("Remove the `require_same`/`prefer_same` setting")
            }

            ResolveError::NoMatchingClampedVersion {
                clamp, available, ..
            } => {
                let mut diag = Diagnostic::error(self.to_string());
                if !available.is_empty() {
                    diag = diag.with_context(format!("versions: {}", available.join(", ")));
                }
                diag.with_suggestion(format!(
                    "Use `prefer_same = \"{}\"` to fall back to the newest version",
                    clamp
                ))
                .with_suggestion("Request an exact version instead of `latest`")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_error_lists_candidates() {
        let err = ResolveError::NoMatchingClampedVersion {
            kind: VersionKind::Bootstrap,
            clamp: ClampPolicy::Incremental,
            original: "1.5.10".to_string(),
            prefix: "1.5.1".to_string(),
            available: vec!["1.6.0".to_string(), "1.5.21".to_string()],
        };

        assert_eq!(
            err.to_string(),
            "no Kotlin bootstrap versions found with the same incremental version as 1.5.10 (1.5.1)"
        );

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("versions: 1.6.0, 1.5.21"));
        assert!(output.contains("prefer_same = \"incremental\""));
    }

    #[test]
    fn test_missing_original_diagnostic() {
        let output = ResolveError::NoOriginalVersionFound
            .to_diagnostic()
            .format(false);
        assert!(output.contains("did you apply any Kotlin plugins"));
        assert!(output.contains("  help: Pass `--original <version>`"));
    }
}
