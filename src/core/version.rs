//! Resolved toolchain versions and their provenance.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Property name under which the resolved version is exposed to build logic.
pub const FUTURE_VERSION_PROPERTY: &str = "kotlinFutureVersion";

/// Where a resolved toolchain version came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VersionKind {
    /// An unreleased bootstrap build, used to compile the compiler itself.
    Bootstrap,
    /// A published early-access release.
    Eap,
    /// The version the project configured manually.
    Unchanged,
}

impl VersionKind {
    /// Lowercase name used in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionKind::Bootstrap => "bootstrap",
            VersionKind::Eap => "eap",
            VersionKind::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for VersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionKind::Bootstrap => write!(f, "Bootstrap"),
            VersionKind::Eap => write!(f, "Eap"),
            VersionKind::Unchanged => write!(f, "Unchanged"),
        }
    }
}

/// The toolchain version a build should use, with its kind.
///
/// Always available once resolved, even when no future version is in use:
/// in that case the kind is [`VersionKind::Unchanged`] and `version` equals
/// `original_version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedVersion {
    kind: VersionKind,
    version: String,
    original_version: String,
}

impl ResolvedVersion {
    /// A future version of the given kind.
    pub fn new(
        kind: VersionKind,
        version: impl Into<String>,
        original_version: impl Into<String>,
    ) -> Self {
        ResolvedVersion {
            kind,
            version: version.into(),
            original_version: original_version.into(),
        }
    }

    /// The configured version, unchanged.
    pub fn unchanged(original_version: impl Into<String>) -> Self {
        let original_version = original_version.into();
        ResolvedVersion {
            kind: VersionKind::Unchanged,
            version: original_version.clone(),
            original_version,
        }
    }

    pub fn kind(&self) -> VersionKind {
        self.kind
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn original_version(&self) -> &str {
        &self.original_version
    }

    /// Whether we are using a future bootstrap version.
    pub fn is_bootstrap(&self) -> bool {
        self.kind == VersionKind::Bootstrap
    }

    /// Whether we are using a future EAP version.
    pub fn is_eap(&self) -> bool {
        self.kind == VersionKind::Eap
    }

    /// Whether we are using any future version.
    pub fn is_future(&self) -> bool {
        self.kind != VersionKind::Unchanged
    }

    /// Whether we are using the configured version.
    pub fn is_unchanged(&self) -> bool {
        self.kind == VersionKind::Unchanged
    }

    /// Pick `future` when a future version is in use, otherwise `normal`.
    pub fn select<T>(&self, normal: T, future: T) -> T {
        if self.is_future() {
            future
        } else {
            normal
        }
    }

    /// Like [`select`](Self::select), but computes the future value from the
    /// resolved version.
    pub fn select_with<T>(&self, normal: T, future: impl FnOnce(&str) -> T) -> T {
        if self.is_future() {
            future(&self.version)
        } else {
            normal
        }
    }

    /// `future` when a future version is in use, else the resolved version.
    pub fn if_future(&self, future: impl Into<String>) -> String {
        self.select(self.version.clone(), future.into())
    }

    /// Render as build properties (`kotlinFutureVersion=...` lines).
    pub fn to_properties(&self) -> String {
        format!(
            "{prop}={}\n{prop}Kind={}\n",
            self.version,
            self.kind,
            prop = FUTURE_VERSION_PROPERTY
        )
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.version, self.kind.as_str())
    }
}
