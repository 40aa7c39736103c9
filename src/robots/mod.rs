//! Robots.txt handling module
//!
//! Fetches, parses, and caches robots.txt per origin, and answers the one
//! question the crawler asks: "may I fetch this URL, and how fast?".
//!
//! Etiquette is secondary to crawl completion: any failure to fetch or
//! evaluate robots.txt fails open (the URL is allowed). The caller still
//! honors a crawl delay whenever one was parsed.

mod cache;
mod parser;

pub use cache::{Clock, RobotsCache};
pub use parser::{RuleGroup, RuleSet};

use crate::url::origin_of;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Answer to a single "may I crawl this URL" query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotsVerdict {
    /// Whether the URL may be fetched
    pub allowed: bool,

    /// Crawl delay requested by the site, if any
    pub crawl_delay: Option<Duration>,
}

impl RobotsVerdict {
    /// The fail-open verdict: allowed, no delay hint
    pub fn allow() -> Self {
        Self {
            allowed: true,
            crawl_delay: None,
        }
    }
}

/// Robots.txt compliance policy for one crawler identity
///
/// Holds the per-origin rule cache and the HTTP client used to fetch
/// `robots.txt`. The agent token (the configured crawler name) is what gets
/// matched against `User-agent:` blocks; the full User-Agent header is the
/// client's business.
pub struct RobotsPolicy {
    cache: RobotsCache,
    client: Client,
    agent_token: String,
}

impl RobotsPolicy {
    /// Creates a policy with a fresh cache
    pub fn new(client: Client, agent_token: impl Into<String>) -> Self {
        Self::with_cache(client, agent_token, RobotsCache::new())
    }

    /// Creates a policy around an existing cache
    ///
    /// Injecting the cache keeps it out of ambient global state: tests hand
    /// in a cache built on a fake clock, and long-lived processes can share
    /// one cache across crawl runs.
    pub fn with_cache(client: Client, agent_token: impl Into<String>, cache: RobotsCache) -> Self {
        Self {
            cache,
            client,
            agent_token: agent_token.into(),
        }
    }

    /// Decides whether a URL may be fetched
    ///
    /// Fetches and caches `{origin}/robots.txt` on the first query for an
    /// origin (and again once the 24h cache entry expires). A missing,
    /// erroring, or non-2xx robots.txt means "no restrictions".
    ///
    /// Two workers racing on an uncached origin may both fetch it; the
    /// duplicate window is small and the second result simply overwrites
    /// the first.
    pub async fn can_crawl(&self, url: &Url) -> RobotsVerdict {
        let Some(origin) = origin_of(url) else {
            return RobotsVerdict::allow();
        };

        let rules = match self.cache.get(&origin) {
            Some(rules) => rules,
            None => {
                let rules = self.fetch_rules(&origin).await;
                self.cache.insert(&origin, rules.clone());
                rules
            }
        };

        RobotsVerdict {
            allowed: rules.is_allowed(url.path(), &self.agent_token),
            crawl_delay: rules
                .crawl_delay_ms(&self.agent_token)
                .map(Duration::from_millis),
        }
    }

    /// Fetches and parses robots.txt for an origin, failing open
    async fn fetch_rules(&self, origin: &str) -> RuleSet {
        let robots_url = format!("{}/robots.txt", origin);
        tracing::debug!("Fetching robots.txt from {}", robots_url);

        match self.client.get(&robots_url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => RuleSet::parse(&body),
                Err(e) => {
                    tracing::debug!("Failed to read robots.txt body from {}: {}", origin, e);
                    RuleSet::allow_all()
                }
            },
            Ok(response) => {
                tracing::debug!(
                    "robots.txt for {} returned HTTP {}, treating as no restrictions",
                    origin,
                    response.status()
                );
                RuleSet::allow_all()
            }
            Err(e) => {
                tracing::debug!(
                    "robots.txt fetch failed for {}: {}, treating as no restrictions",
                    origin,
                    e
                );
                RuleSet::allow_all()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_disallowed_path_blocked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin"),
            )
            .mount(&server)
            .await;

        let policy = RobotsPolicy::new(test_client(), "solcrawl");
        let url = Url::parse(&format!("{}/admin/users", server.uri())).unwrap();
        let verdict = policy.can_crawl(&url).await;
        assert!(!verdict.allowed);

        let url = Url::parse(&format!("{}/products/panel", server.uri())).unwrap();
        assert!(policy.can_crawl(&url).await.allowed);
    }

    #[tokio::test]
    async fn test_missing_robots_fails_open() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let policy = RobotsPolicy::new(test_client(), "solcrawl");
        let url = Url::parse(&format!("{}/anything", server.uri())).unwrap();
        assert!(policy.can_crawl(&url).await.allowed);
    }

    #[tokio::test]
    async fn test_crawl_delay_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("User-agent: *\nCrawl-delay: 2"),
            )
            .mount(&server)
            .await;

        let policy = RobotsPolicy::new(test_client(), "solcrawl");
        let url = Url::parse(&format!("{}/products/panel", server.uri())).unwrap();
        let verdict = policy.can_crawl(&url).await;
        assert!(verdict.allowed);
        assert_eq!(verdict.crawl_delay, Some(Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn test_injected_cache_preempts_fetch() {
        // No server at all: the pre-populated cache must answer
        let cache = RobotsCache::new();
        cache.insert(
            "https://shop.example",
            RuleSet::parse("User-agent: *\nDisallow: /"),
        );

        let policy = RobotsPolicy::with_cache(test_client(), "solcrawl", cache);
        let url = Url::parse("https://shop.example/products/panel").unwrap();
        assert!(!policy.can_crawl(&url).await.allowed);
    }

    #[tokio::test]
    async fn test_robots_fetched_once_per_origin() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
            .expect(1)
            .mount(&server)
            .await;

        let policy = RobotsPolicy::new(test_client(), "solcrawl");
        for i in 0..5 {
            let url = Url::parse(&format!("{}/products/panel-{}", server.uri(), i)).unwrap();
            assert!(policy.can_crawl(&url).await.allowed);
        }
    }
}
