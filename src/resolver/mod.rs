//! Future version resolution.
//!
//! The resolver decides once per build whether a future toolchain is in use,
//! which kind, and which concrete version:
//!
//! 1. Disabled, or no request configured: the original version, unchanged.
//! 2. Request priority: forced override > bootstrap property > EAP property.
//! 3. A literal request is the only candidate; no feed lookup.
//! 4. `latest`/`auto`/blank: fetch the feed, apply filters, drop candidates
//!    not newer than the original. If nothing is left, degrade to the
//!    original version.
//! 5. Clamp: preferred policy first, then the required policy.
//! 6. If the choice equals the original version, the result is unchanged.

pub mod errors;
pub mod original;

use std::sync::{Arc, Mutex, PoisonError};

use crate::core::filter::FilterContext;
use crate::core::request::FutureVersionRequest;
use crate::core::settings::FutureSettings;
use crate::core::version::ResolvedVersion;
use crate::sources::VersionFeed;
use crate::util::properties::{Properties, BOOTSTRAP_PROPERTY, EAP_PROPERTY};

pub use errors::ResolveError;
pub use original::OriginalVersion;

/// Resolves and memoizes the toolchain version for one build.
pub struct VersionResolver {
    settings: FutureSettings,
    bootstrap_prop: Option<String>,
    eap_prop: Option<String>,
    feed: Arc<dyn VersionFeed>,
    original: OriginalVersion,
    resolved: Mutex<Option<ResolvedVersion>>,
}

impl VersionResolver {
    /// Create a resolver reading the request properties from `properties`.
    pub fn new(settings: FutureSettings, properties: &Properties, feed: Arc<dyn VersionFeed>) -> Self {
        VersionResolver {
            settings,
            bootstrap_prop: properties.get(BOOTSTRAP_PROPERTY).map(str::to_string),
            eap_prop: properties.get(EAP_PROPERTY).map(str::to_string),
            feed,
            original: OriginalVersion::new(),
            resolved: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &FutureSettings {
        &self.settings
    }

    /// Record a toolchain version declared by a plugin request.
    pub fn observe_original_version(&self, version: &str) -> bool {
        self.original.observe(version)
    }

    /// The greatest declared toolchain version so far.
    pub fn original_version(&self) -> Option<String> {
        self.original.get()
    }

    /// The configured request. Never touches the network.
    pub fn request(&self) -> FutureVersionRequest {
        if self.settings.disabled {
            return FutureVersionRequest::None;
        }

        if let Some(forced) = self.settings.forced() {
            return forced.clone();
        }

        if let Some(bootstrap) = &self.bootstrap_prop {
            return FutureVersionRequest::Bootstrap(bootstrap.clone());
        }

        if let Some(eap) = &self.eap_prop {
            return FutureVersionRequest::Eap(eap.clone());
        }

        FutureVersionRequest::None
    }

    pub fn is_future(&self) -> bool {
        self.request().is_future()
    }

    pub fn is_bootstrap(&self) -> bool {
        self.request().is_bootstrap()
    }

    pub fn is_eap(&self) -> bool {
        self.request().is_eap()
    }

    /// The resolved version, computed on first call and reused afterwards.
    ///
    /// Errors are not memoized; they abort configuration.
    pub fn resolve(&self) -> Result<ResolvedVersion, ResolveError> {
        let mut resolved = self.resolved.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(version) = resolved.as_ref() {
            return Ok(version.clone());
        }

        let version = self.compute()?;
        *resolved = Some(version.clone());
        Ok(version)
    }

    fn compute(&self) -> Result<ResolvedVersion, ResolveError> {
        let request = self.request();
        let original = self
            .original_version()
            .ok_or(ResolveError::NoOriginalVersionFound)?;

        if !request.is_future() {
            return Ok(ResolvedVersion::unchanged(original));
        }

        let kind = request.kind();
        let candidates = self.candidates(&request, &original)?;

        let preferred = match self.settings.preferred_clamping {
            Some(policy) => policy.matching_or_none(&original, kind, &candidates)?,
            None => None,
        };
        let version = match preferred {
            Some(version) => version,
            None => self.settings.clamping.matching(&original, kind, &candidates)?,
        };

        if version == original {
            tracing::info!(
                "Using configured Kotlin version of {}, no future versions found",
                original
            );
            return Ok(ResolvedVersion::unchanged(original));
        }

        tracing::info!("Using future version of Kotlin: {}, type is {}", version, kind);
        Ok(ResolvedVersion::new(kind, version, original))
    }

    fn candidates(
        &self,
        request: &FutureVersionRequest,
        original: &str,
    ) -> Result<Vec<String>, ResolveError> {
        if self.bootstrap_prop.is_some() && self.eap_prop.is_some() {
            tracing::warn!("Both Kotlin EAP and bootstrap versions are configured, using bootstrap");
        }

        tracing::debug!("Looking up Kotlin future versions for {}", request);

        if let Some(literal) = request.literal() {
            tracing::info!("Kotlin future version is exact, using {}", request);
            return Ok(vec![literal.to_string()]);
        }

        let kind = request.kind();
        let fetched = self.feed.fetch(kind)?;

        let chain = match request {
            FutureVersionRequest::Bootstrap(_) => self.settings.filters().bootstrap(),
            FutureVersionRequest::Eap(_) | FutureVersionRequest::None => {
                self.settings.filters().eap()
            }
        };
        let context = FilterContext::new(original);
        let filtered = chain.apply(&context, &fetched);
        if filtered.is_empty() {
            return Err(ResolveError::NoVersionMatchingFilters {
                kind,
                available: fetched,
            });
        }

        let newer: Vec<String> = filtered
            .into_iter()
            .filter(|v| v.as_str() > original && !v.starts_with(original))
            .collect();

        if newer.is_empty() {
            tracing::warn!(
                "No future versions found for kind {}, using current version {}",
                kind,
                original
            );
            return Ok(vec![original.to_string()]);
        }

        tracing::info!("Found Kotlin future versions {:?}", newer);
        Ok(newer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clamp::ClampPolicy;
    use crate::core::version::VersionKind;
    use crate::test_support::{bootstrap_props, eap_props, MockFeed};

    fn resolver(settings: FutureSettings, props: &Properties, feed: &Arc<MockFeed>) -> VersionResolver {
        let resolver = VersionResolver::new(settings, props, feed.clone());
        resolver.observe_original_version("1.5.10");
        resolver
    }

    #[test]
    fn test_no_request_is_unchanged() {
        let feed = MockFeed::new(&["1.6.0"], &["1.6.0-RC"]);
        let r = resolver(FutureSettings::new(), &Properties::new(), &feed);

        let v = r.resolve().unwrap();
        assert_eq!(v, ResolvedVersion::unchanged("1.5.10"));
        assert_eq!(feed.calls(), 0);
    }

    #[test]
    fn test_disabled_skips_feed() {
        let feed = MockFeed::new(&["1.6.0"], &[]);
        let mut settings = FutureSettings::new();
        settings.disabled = true;
        settings.force_bootstrap("latest");
        let r = resolver(settings, &bootstrap_props("latest"), &feed);

        assert!(!r.is_future());
        let v = r.resolve().unwrap();
        assert!(v.is_unchanged());
        assert_eq!(v.version(), "1.5.10");
        assert_eq!(feed.calls(), 0);
    }

    #[test]
    fn test_literal_request_skips_feed() {
        let feed = MockFeed::new(&["1.6.0"], &["1.6.0-RC"]);
        let r = resolver(FutureSettings::new(), &eap_props("1.5.30-M1"), &feed);

        let v = r.resolve().unwrap();
        assert_eq!(v.kind(), VersionKind::Eap);
        assert_eq!(v.version(), "1.5.30-M1");
        assert_eq!(v.original_version(), "1.5.10");
        assert_eq!(feed.calls(), 0);
    }

    #[test]
    fn test_literal_equal_to_original_is_unchanged() {
        let feed = MockFeed::new(&[], &[]);
        let r = resolver(FutureSettings::new(), &bootstrap_props("1.5.10"), &feed);

        let v = r.resolve().unwrap();
        assert!(v.is_unchanged());
        assert_eq!(v.version(), "1.5.10");
    }

    #[test]
    fn test_padded_literal_is_trimmed() {
        let feed = MockFeed::new(&["1.7.0"], &[]);
        let r = resolver(FutureSettings::new(), &bootstrap_props(" 1.6.0-dev-7 "), &feed);

        let v = r.resolve().unwrap();
        assert_eq!(v.version(), "1.6.0-dev-7");
        assert_eq!(feed.calls(), 0);
    }

    #[test]
    fn test_latest_takes_newest() {
        let feed = MockFeed::new(&["1.6.0-dev-2", "1.6.0-dev-1"], &[]);
        let r = resolver(FutureSettings::new(), &bootstrap_props("latest"), &feed);

        let v = r.resolve().unwrap();
        assert_eq!(v.kind(), VersionKind::Bootstrap);
        assert_eq!(v.version(), "1.6.0-dev-2");
    }

    #[test]
    fn test_blank_means_latest() {
        let feed = MockFeed::new(&[], &["1.6.0-RC", "1.5.31"]);
        let r = resolver(FutureSettings::new(), &eap_props(""), &feed);

        assert_eq!(r.resolve().unwrap().version(), "1.6.0-RC");
        assert_eq!(feed.eap_calls(), 1);
    }

    #[test]
    fn test_bootstrap_wins_over_eap() {
        let feed = MockFeed::new(&["1.6.0-dev-5"], &["1.6.0-RC"]);
        let props = bootstrap_props("latest").with(EAP_PROPERTY, "latest");
        let r = resolver(FutureSettings::new(), &props, &feed);

        assert!(r.is_bootstrap());
        assert_eq!(r.resolve().unwrap().version(), "1.6.0-dev-5");
        assert_eq!(feed.eap_calls(), 0);
    }

    #[test]
    fn test_forced_overrides_properties() {
        let feed = MockFeed::new(&["1.6.0-dev-5"], &["1.6.0-RC"]);
        let mut settings = FutureSettings::new();
        settings.force_eap("latest");
        let r = resolver(settings, &bootstrap_props("latest"), &feed);

        let v = r.resolve().unwrap();
        assert_eq!(v.kind(), VersionKind::Eap);
        assert_eq!(v.version(), "1.6.0-RC");
    }

    #[test]
    fn test_resolution_is_memoized() {
        let feed = MockFeed::new(&["1.6.0-dev-2"], &[]);
        let r = resolver(FutureSettings::new(), &bootstrap_props("auto"), &feed);

        let first = r.resolve().unwrap();
        let second = r.resolve().unwrap();
        assert_eq!(first, second);
        assert_eq!(feed.calls(), 1);
    }

    #[test]
    fn test_memoization_across_threads() {
        let feed = MockFeed::new(&["1.6.0-dev-2"], &[]);
        let r = Arc::new(resolver(FutureSettings::new(), &bootstrap_props("latest"), &feed));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let r = Arc::clone(&r);
                std::thread::spawn(move || r.resolve().unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().version(), "1.6.0-dev-2");
        }
        assert_eq!(feed.calls(), 1);
    }

    #[test]
    fn test_missing_original_only_fails_on_resolve() {
        let feed = MockFeed::new(&["1.6.0"], &[]);
        let r = VersionResolver::new(FutureSettings::new(), &bootstrap_props("latest"), feed.clone());

        assert!(r.is_future());
        assert!(matches!(
            r.resolve(),
            Err(ResolveError::NoOriginalVersionFound)
        ));
        assert_eq!(feed.calls(), 0);
    }

    #[test]
    fn test_stale_candidates_are_excluded() {
        let feed = MockFeed::new(&["1.5.10-dev-3", "1.5.0", "1.4.32"], &[]);
        let r = resolver(FutureSettings::new(), &bootstrap_props("latest"), &feed);

        let v = r.resolve().unwrap();
        assert!(v.is_unchanged());
        assert_eq!(v.version(), "1.5.10");
    }

    #[test]
    fn test_filters_apply_with_original_context() {
        let feed = MockFeed::new(&["1.7.0-dev-1", "1.6.0-dev-9"], &[]);
        let mut settings = FutureSettings::new();
        settings.filter_bootstrap(|ctx, v| {
            ctx.original_version() == "1.5.10" && !v.starts_with("1.7")
        });
        let r = resolver(settings, &bootstrap_props("latest"), &feed);

        assert_eq!(r.resolve().unwrap().version(), "1.6.0-dev-9");
    }

    #[test]
    fn test_filters_rejecting_everything_fail() {
        let feed = MockFeed::new(&[], &["1.6.0-RC"]);
        let mut settings = FutureSettings::new();
        settings.filter(|_, _| false);
        let r = resolver(settings, &eap_props("latest"), &feed);

        match r.resolve() {
            Err(ResolveError::NoVersionMatchingFilters { available, .. }) => {
                assert_eq!(available, vec!["1.6.0-RC".to_string()]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_empty_feed_is_fatal() {
        let feed = MockFeed::new(&[], &[]);
        let r = resolver(FutureSettings::new(), &bootstrap_props("latest"), &feed);

        assert!(matches!(r.resolve(), Err(ResolveError::Feed(_))));
    }

    #[test]
    fn test_exclusion_happens_before_required_clamp() {
        // 1.5.10 itself is removed as stale, so the incremental clamp
        // (prefix "1.5.1") has nothing left to match.
        let feed = MockFeed::new(&["1.6.0", "1.5.21", "1.5.10"], &[]);
        let mut settings = FutureSettings::new();
        settings.require_same_incremental_version();
        let r = resolver(settings, &bootstrap_props("latest"), &feed);

        match r.resolve() {
            Err(ResolveError::NoMatchingClampedVersion {
                clamp,
                prefix,
                available,
                ..
            }) => {
                assert_eq!(clamp, ClampPolicy::Incremental);
                assert_eq!(prefix, "1.5.1");
                assert_eq!(available, vec!["1.6.0".to_string(), "1.5.21".to_string()]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_required_feature_clamp_fails() {
        let feed = MockFeed::new(&["1.6.0", "1.5.20"], &[]);
        let mut settings = FutureSettings::new();
        settings.require_same_feature_version();
        let r = VersionResolver::new(settings, &bootstrap_props("latest"), feed.clone());
        r.observe_original_version("1.4.32");

        assert!(matches!(
            r.resolve(),
            Err(ResolveError::NoMatchingClampedVersion { .. })
        ));
    }

    #[test]
    fn test_preferred_clamp_degrades_to_newest() {
        let feed = MockFeed::new(&["1.6.0", "1.5.20"], &[]);
        let mut settings = FutureSettings::new();
        settings.prefer_same_feature_version();
        let r = VersionResolver::new(settings, &bootstrap_props("latest"), feed.clone());
        r.observe_original_version("1.4.32");

        assert_eq!(r.resolve().unwrap().version(), "1.6.0");
    }

    #[test]
    fn test_preferred_clamp_wins_when_satisfied() {
        let feed = MockFeed::new(&["1.6.0", "1.5.30", "1.5.20"], &[]);
        let mut settings = FutureSettings::new();
        settings.prefer_same_feature_version();
        let r = resolver(settings, &bootstrap_props("latest"), &feed);

        assert_eq!(r.resolve().unwrap().version(), "1.5.30");
    }

    #[test]
    fn test_literal_is_still_clamped() {
        let feed = MockFeed::new(&[], &[]);
        let mut settings = FutureSettings::new();
        settings.require_same_feature_version();
        let r = resolver(settings, &eap_props("1.6.0-RC"), &feed);

        assert!(matches!(
            r.resolve(),
            Err(ResolveError::NoMatchingClampedVersion { .. })
        ));
    }
}
