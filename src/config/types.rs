use serde::Deserialize;

/// Main configuration structure for Solcrawl
///
/// Every field has a default, so an empty (or absent) config file yields a
/// usable configuration. CLI flags override file values after loading.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of pages to visit in one crawl run
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Maximum frontier depth from the seed URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Number of concurrent fetch workers
    pub concurrency: u32,

    /// Minimum time between any two requests in the run (milliseconds)
    #[serde(rename = "rate-limit-ms")]
    pub rate_limit_ms: u64,

    /// Per-request fetch timeout (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Retry attempts after the first failed fetch
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// First backoff delay after a failed fetch (milliseconds)
    ///
    /// Subsequent delays grow by 2.5x, capped at 15 seconds. The exact
    /// constants are not load-bearing; this knob mostly exists so tests can
    /// retry quickly.
    #[serde(rename = "retry-base-ms")]
    pub retry_base_ms: u64,

    /// Whether robots.txt directives are honored
    #[serde(rename = "respect-robots-txt")]
    pub respect_robots_txt: bool,

    /// Optional wall-clock budget for the whole crawl (milliseconds)
    ///
    /// When exceeded, the frontier is drained without further dequeues;
    /// in-flight fetches are allowed to finish.
    #[serde(rename = "crawl-deadline-ms")]
    pub crawl_deadline_ms: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 200,
            max_depth: 3,
            concurrency: 4,
            rate_limit_ms: 1000,
            timeout_ms: 30_000,
            max_retries: 5,
            retry_base_ms: 2000,
            respect_robots_txt: true,
            crawl_deadline_ms: None,
        }
    }
}

/// User agent identification configuration
///
/// The crawler always identifies itself with a contact URL so site operators
/// can reach whoever runs it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler (also the token matched against robots.txt blocks)
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "solcrawl".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/solcrawl/solcrawl".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the full User-Agent header value
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to write scraped products as JSON lines (one product per line)
    ///
    /// When absent, products are only reported in the crawl summary.
    #[serde(rename = "products-path")]
    pub products_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.crawler.max_pages, 200);
        assert_eq!(config.crawler.max_depth, 3);
        assert_eq!(config.crawler.concurrency, 4);
        assert_eq!(config.crawler.rate_limit_ms, 1000);
        assert_eq!(config.crawler.max_retries, 5);
        assert!(config.crawler.respect_robots_txt);
        assert!(config.crawler.crawl_deadline_ms.is_none());
        assert!(config.output.products_path.is_none());
    }

    #[test]
    fn test_user_agent_header_value() {
        let ua = UserAgentConfig {
            crawler_name: "solcrawl".to_string(),
            crawler_version: "1.2.3".to_string(),
            contact_url: "https://example.com/bot".to_string(),
        };
        assert_eq!(
            ua.header_value(),
            "solcrawl/1.2.3 (+https://example.com/bot)"
        );
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [crawler]
            max-pages = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.crawler.max_pages, 10);
        assert_eq!(config.crawler.max_depth, 3);
        assert_eq!(config.user_agent.crawler_name, "solcrawl");
    }
}
