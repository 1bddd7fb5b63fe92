//! Version feeds - lists of available future toolchain versions.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::core::version::VersionKind;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Maximum number of bootstrap builds taken from the feed.
pub const MAX_BOOTSTRAP_VERSIONS: usize = 100;

static BUILD_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"number="([^"]+)""#).expect("build number regex"));

static RELEASE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""tag_name"\s*:\s*"v([^"]+)""#).expect("release tag regex"));

/// Error fetching or parsing a version feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to fetch {url}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("no Kotlin {} versions found", .kind.as_str())]
    NoVersionsFound { kind: VersionKind },
}

impl FeedError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            FeedError::Http { url, source } => Diagnostic::error(self.to_string())
                .with_context(format!("{}: {}", url, source))
                .with_suggestion(suggestions::FETCH_FAILED),
            FeedError::Status { .. } => {
                Diagnostic::error(self.to_string()).with_suggestion(suggestions::FETCH_FAILED)
            }
            FeedError::NoVersionsFound { .. } => Diagnostic::error(self.to_string())
                .with_suggestion("Request an exact version instead of `latest`"),
        }
    }
}

/// A source of future toolchain versions, newest first.
pub trait VersionFeed: Send + Sync {
    /// Recent successful bootstrap builds.
    fn fetch_bootstrap_versions(&self) -> Result<Vec<String>, FeedError>;

    /// Recent published EAP releases.
    fn fetch_eap_versions(&self) -> Result<Vec<String>, FeedError>;

    /// Fetch the feed for `kind`. Unchanged has no feed.
    fn fetch(&self, kind: VersionKind) -> Result<Vec<String>, FeedError> {
        match kind {
            VersionKind::Bootstrap => self.fetch_bootstrap_versions(),
            VersionKind::Eap => self.fetch_eap_versions(),
            VersionKind::Unchanged => Ok(Vec::new()),
        }
    }
}

/// Extract build numbers (`number="..."`) from a build-server response.
pub fn parse_bootstrap_versions(text: &str) -> Result<Vec<String>, FeedError> {
    let versions: Vec<String> = BUILD_NUMBER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .take(MAX_BOOTSTRAP_VERSIONS)
        .collect();

    if versions.is_empty() {
        return Err(FeedError::NoVersionsFound {
            kind: VersionKind::Bootstrap,
        });
    }
    Ok(versions)
}

/// Extract release tags (`"tag_name": "v..."`) from a releases listing,
/// without the leading `v`.
pub fn parse_eap_versions(text: &str) -> Result<Vec<String>, FeedError> {
    let versions: Vec<String> = RELEASE_TAG
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();

    if versions.is_empty() {
        return Err(FeedError::NoVersionsFound {
            kind: VersionKind::Eap,
        });
    }
    Ok(versions)
}
