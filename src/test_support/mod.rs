//! Test utilities and mocks for unit tests.
//!
//! Provides a counting in-memory [`VersionFeed`] so resolver tests can
//! assert how often the network would have been hit, plus property helpers.
//!
//! # Example
//!
//! ```rust,ignore
//! use toolchain_future::test_support::{bootstrap_props, MockFeed};
//!
//! #[test]
//! fn test_example() {
//!     let feed = MockFeed::new(&["1.6.0-dev-1"], &[]);
//!     let resolver = VersionResolver::new(FutureSettings::new(), &bootstrap_props("latest"), feed.clone());
//!     // ...
//!     assert_eq!(feed.calls(), 1);
//! }
//! ```

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::core::version::VersionKind;
use crate::sources::{FeedError, VersionFeed};
use crate::util::properties::{Properties, BOOTSTRAP_PROPERTY, EAP_PROPERTY};

// Re-export fixtures for convenience
pub use fixtures::*;

/// In-memory version feed that counts fetches.
///
/// An empty list behaves like an empty remote feed and fails with
/// [`FeedError::NoVersionsFound`].
#[derive(Debug, Default)]
pub struct MockFeed {
    bootstrap: Vec<String>,
    eap: Vec<String>,
    bootstrap_calls: AtomicUsize,
    eap_calls: AtomicUsize,
}

impl MockFeed {
    /// Create a shared mock feed.
    pub fn new(bootstrap: &[&str], eap: &[&str]) -> Arc<Self> {
        Arc::new(MockFeed {
            bootstrap: bootstrap.iter().map(|s| s.to_string()).collect(),
            eap: eap.iter().map(|s| s.to_string()).collect(),
            bootstrap_calls: AtomicUsize::new(0),
            eap_calls: AtomicUsize::new(0),
        })
    }

    /// Number of bootstrap fetches.
    pub fn bootstrap_calls(&self) -> usize {
        self.bootstrap_calls.load(Ordering::SeqCst)
    }

    /// Number of EAP fetches.
    pub fn eap_calls(&self) -> usize {
        self.eap_calls.load(Ordering::SeqCst)
    }

    /// Total fetches of either feed.
    pub fn calls(&self) -> usize {
        self.bootstrap_calls() + self.eap_calls()
    }

    fn serve(list: &[String], kind: VersionKind) -> Result<Vec<String>, FeedError> {
        if list.is_empty() {
            return Err(FeedError::NoVersionsFound { kind });
        }
        Ok(list.to_vec())
    }
}

impl VersionFeed for MockFeed {
    fn fetch_bootstrap_versions(&self) -> Result<Vec<String>, FeedError> {
        self.bootstrap_calls.fetch_add(1, Ordering::SeqCst);
        Self::serve(&self.bootstrap, VersionKind::Bootstrap)
    }

    fn fetch_eap_versions(&self) -> Result<Vec<String>, FeedError> {
        self.eap_calls.fetch_add(1, Ordering::SeqCst);
        Self::serve(&self.eap, VersionKind::Eap)
    }
}

/// Properties requesting a bootstrap version.
pub fn bootstrap_props(value: &str) -> Properties {
    Properties::new().with(BOOTSTRAP_PROPERTY, value)
}

/// Properties requesting an EAP version.
pub fn eap_props(value: &str) -> Properties {
    Properties::new().with(EAP_PROPERTY, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_feed_counts() {
        let feed = MockFeed::new(&["1.6.0-dev-1"], &[]);
        assert_eq!(feed.fetch(VersionKind::Bootstrap).unwrap().len(), 1);
        assert!(feed.fetch(VersionKind::Eap).is_err());
        assert!(feed.fetch(VersionKind::Unchanged).unwrap().is_empty());
        assert_eq!(feed.bootstrap_calls(), 1);
        assert_eq!(feed.eap_calls(), 1);
    }
}
