//! Future version requests, as configured by properties or overrides.

use std::fmt;

use crate::core::version::VersionKind;

/// Values that mean "look up the newest version" rather than a literal.
pub const LATEST_VALUES: &[&str] = &["auto", "latest"];

/// Which future version was asked for, before any lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FutureVersionRequest {
    None,
    Eap(String),
    Bootstrap(String),
}

impl FutureVersionRequest {
    /// The kind of version this request resolves to.
    pub fn kind(&self) -> VersionKind {
        match self {
            FutureVersionRequest::None => VersionKind::Unchanged,
            FutureVersionRequest::Eap(_) => VersionKind::Eap,
            FutureVersionRequest::Bootstrap(_) => VersionKind::Bootstrap,
        }
    }

    /// The raw requested value (literal, blank, or sentinel).
    pub fn raw(&self) -> Option<&str> {
        match self {
            FutureVersionRequest::None => None,
            FutureVersionRequest::Eap(raw) | FutureVersionRequest::Bootstrap(raw) => Some(raw),
        }
    }

    pub fn is_future(&self) -> bool {
        !matches!(self, FutureVersionRequest::None)
    }

    pub fn is_bootstrap(&self) -> bool {
        matches!(self, FutureVersionRequest::Bootstrap(_))
    }

    pub fn is_eap(&self) -> bool {
        matches!(self, FutureVersionRequest::Eap(_))
    }

    /// The exact version asked for, if the request is a literal.
    ///
    /// Blank values and the `auto`/`latest` sentinels return `None`.
    /// Surrounding whitespace is not part of the version.
    pub fn literal(&self) -> Option<&str> {
        self.raw().map(str::trim).filter(|raw| !is_latest(raw))
    }
}

impl fmt::Display for FutureVersionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FutureVersionRequest::None => write!(f, "None"),
            FutureVersionRequest::Eap(raw) => write!(f, "Eap({})", raw),
            FutureVersionRequest::Bootstrap(raw) => write!(f, "Bootstrap({})", raw),
        }
    }
}

/// Whether a raw request value asks for the newest available version.
pub fn is_latest(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || LATEST_VALUES.iter().any(|v| raw.eq_ignore_ascii_case(v))
}
