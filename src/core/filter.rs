//! User-supplied predicates over candidate future versions.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

/// Context passed to every filter invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterContext {
    original_version: String,
}

impl FilterContext {
    pub fn new(original_version: impl Into<String>) -> Self {
        FilterContext {
            original_version: original_version.into(),
        }
    }

    /// The version the project configured.
    pub fn original_version(&self) -> &str {
        &self.original_version
    }
}

/// A predicate over a candidate version. Must be free of side effects.
pub type VersionFilter = Arc<dyn Fn(&FilterContext, &str) -> bool + Send + Sync>;

/// An ordered list of filters, combined with logical AND.
#[derive(Clone, Default)]
pub struct FilterChain {
    filters: Vec<VersionFilter>,
}

impl FilterChain {
    pub fn new() -> Self {
        FilterChain {
            filters: Vec::new(),
        }
    }

    /// Append a filter.
    pub fn push(&mut self, filter: VersionFilter) {
        self.filters.push(filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Whether `candidate` passes every filter. An empty chain accepts all.
    pub fn all_match(&self, context: &FilterContext, candidate: &str) -> bool {
        self.filters.iter().all(|f| f(context, candidate))
    }

    /// Keep the candidates that pass every filter, preserving order.
    pub fn apply(&self, context: &FilterContext, candidates: &[String]) -> Vec<String> {
        candidates
            .iter()
            .filter(|c| self.all_match(context, c))
            .cloned()
            .collect()
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.filters.len())
            .finish()
    }
}

/// Independent filter chains for bootstrap and EAP candidates.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    bootstrap: FilterChain,
    eap: FilterChain,
}

impl FilterSet {
    pub fn new() -> Self {
        FilterSet::default()
    }

    /// Register a filter on both chains (the same instance).
    pub fn filter<F>(&mut self, filter: F)
    where
        F: Fn(&FilterContext, &str) -> bool + Send + Sync + 'static,
    {
        let filter: VersionFilter = Arc::new(filter);
        self.bootstrap.push(Arc::clone(&filter));
        self.eap.push(filter);
    }

    /// Register a filter on the bootstrap chain only.
    pub fn filter_bootstrap<F>(&mut self, filter: F)
    where
        F: Fn(&FilterContext, &str) -> bool + Send + Sync + 'static,
    {
        self.bootstrap.push(Arc::new(filter));
    }

    /// Register a filter on the EAP chain only.
    pub fn filter_eap<F>(&mut self, filter: F)
    where
        F: Fn(&FilterContext, &str) -> bool + Send + Sync + 'static,
    {
        self.eap.push(Arc::new(filter));
    }

    pub fn bootstrap(&self) -> &FilterChain {
        &self.bootstrap
    }

    pub fn eap(&self) -> &FilterChain {
        &self.eap
    }
}

/// A filter accepting candidates that match `regex`.
pub fn regex_filter(regex: Regex) -> impl Fn(&FilterContext, &str) -> bool + Send + Sync + 'static {
    move |_, candidate| regex.is_match(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_chain_accepts_everything() {
        let chain = FilterChain::new();
        assert!(chain.all_match(&FilterContext::new("1.5.10"), "anything"));
    }

    #[test]
    fn test_chain_is_conjunction() {
        let mut set = FilterSet::new();
        set.filter_bootstrap(|_, v| v.starts_with("1.6"));
        set.filter_bootstrap(|_, v| !v.contains("-dev-1"));

        let ctx = FilterContext::new("1.5.10");
        let chain = set.bootstrap();
        assert!(chain.all_match(&ctx, "1.6.0-dev-2"));
        assert!(!chain.all_match(&ctx, "1.6.0-dev-10"));
        assert!(!chain.all_match(&ctx, "1.7.0"));
        assert!(set.eap().is_empty());
    }

    #[test]
    fn test_combined_filter_shares_instance() {
        let mut set = FilterSet::new();
        set.filter(|ctx, v| v != ctx.original_version());

        assert_eq!(set.bootstrap().len(), 1);
        assert_eq!(set.eap().len(), 1);
        assert!(Arc::ptr_eq(&set.bootstrap().filters[0], &set.eap().filters[0]));
    }

    #[test]
    fn test_filters_see_original_version() {
        let mut set = FilterSet::new();
        set.filter_eap(|ctx, v| v.starts_with(&ctx.original_version()[..3]));

        let ctx = FilterContext::new("1.5.10");
        let kept = set.eap().apply(
            &ctx,
            &["1.6.0".to_string(), "1.5.30".to_string(), "1.5.20".to_string()],
        );
        assert_eq!(kept, vec!["1.5.30".to_string(), "1.5.20".to_string()]);
    }

    #[test]
    fn test_regex_filter() {
        let mut set = FilterSet::new();
        set.filter(regex_filter(Regex::new(r"-RC\d*$").unwrap()));
        let ctx = FilterContext::new("1.5.10");
        assert!(set.eap().all_match(&ctx, "1.6.0-RC2"));
        assert!(!set.bootstrap().all_match(&ctx, "1.6.0-M1"));
    }
}
