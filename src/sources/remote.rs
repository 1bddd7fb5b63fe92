//! HTTP-backed version feeds.

use reqwest::blocking::Client;
use url::Url;

use crate::sources::feed::{parse_bootstrap_versions, parse_eap_versions, FeedError, VersionFeed};

/// Build-server query for the last successful bootstrap builds.
pub const BOOTSTRAP_FEED_URL: &str = "https://teamcity.jetbrains.com/guestAuth/app/rest/builds/multiple/buildType:Kotlin_KotlinPublic_BuildNumber,tag:bootstrap,status:Success,state:finished,count:100?fields=build(number)";

/// The most recent published releases.
pub const EAP_FEED_URL: &str = "https://api.github.com/repos/jetbrains/kotlin/releases?per_page=6";

/// Fetches versions over HTTP. No retries and no caching; the resolver
/// memoizes the result for the rest of the build.
#[derive(Debug, Clone)]
pub struct HttpVersionFeed {
    client: Client,
    bootstrap_url: Url,
    eap_url: Url,
}

impl HttpVersionFeed {
    /// A feed reading the public endpoints.
    pub fn new() -> anyhow::Result<Self> {
        Self::with_urls(Url::parse(BOOTSTRAP_FEED_URL)?, Url::parse(EAP_FEED_URL)?)
    }

    /// A feed reading custom endpoints (mirrors, tests).
    pub fn with_urls(bootstrap_url: Url, eap_url: Url) -> anyhow::Result<Self> {
        // The releases API rejects requests without a user agent.
        let client = Client::builder()
            .user_agent(concat!("toolchain-future/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpVersionFeed {
            client,
            bootstrap_url,
            eap_url,
        })
    }

    fn get_text(&self, url: &Url) -> Result<String, FeedError> {
        tracing::debug!("Fetching versions from {}", url);

        let response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|source| FeedError::Http {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().map_err(|source| FeedError::Http {
            url: url.to_string(),
            source,
        })
    }
}

impl VersionFeed for HttpVersionFeed {
    fn fetch_bootstrap_versions(&self) -> Result<Vec<String>, FeedError> {
        let text = self.get_text(&self.bootstrap_url)?;
        let versions = parse_bootstrap_versions(&text)?;
        tracing::debug!("Bootstrap versions: {:?}", versions);
        Ok(versions)
    }

    fn fetch_eap_versions(&self) -> Result<Vec<String>, FeedError> {
        let text = self.get_text(&self.eap_url)?;
        let versions = parse_eap_versions(&text)?;
        tracing::debug!("EAP versions: {:?}", versions);
        Ok(versions)
    }
}
