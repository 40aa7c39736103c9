//! Crawl engine: worker pool orchestration over one frontier
//!
//! The engine seeds the frontier with a single URL and runs a bounded pool
//! of workers against it. Each worker repeatedly checks out a target, asks
//! the robots policy for permission, fetches through the shared rate
//! limiter with retries, classifies the page, and either expands the
//! frontier (category), extracts a product (product), or moves on
//! (unknown). Per-URL failures are skips, never crawl failures.

use crate::category::detect_category;
use crate::classify::{classify, PageKind};
use crate::config::{Config, CrawlerConfig};
use crate::crawler::frontier::{Checkout, CrawlState, CrawlTarget};
use crate::crawler::links::collect_catalog_links;
use crate::extract::{extract, ScrapedProduct};
use crate::fetch::{build_http_client, fetch_page, fetch_with_retry, RateLimiter, RetryPolicy};
use crate::robots::RobotsPolicy;
use crate::url::normalize_url;
use crate::CrawlerError;
use reqwest::Client;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;

/// How long an idle worker sleeps before re-checking the frontier
const IDLE_POLL: Duration = Duration::from_millis(25);

/// Why a crawl stopped
///
/// Running out of budget is a normal way for a crawl to end, not an error;
/// callers that care (logs, dashboards) read it off the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Every reachable in-bounds URL was processed
    FrontierExhausted,
    /// The page budget cut the crawl short
    PageBudgetReached,
    /// The wall-clock deadline cut the crawl short
    DeadlineExceeded,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::FrontierExhausted => "frontier exhausted",
            Self::PageBudgetReached => "page budget reached",
            Self::DeadlineExceeded => "deadline exceeded",
        };
        f.write_str(label)
    }
}

/// Final report of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Normalized URLs of discovered product pages, deduplicated
    pub product_links: Vec<String>,

    /// Every URL processed this run, in completion order
    pub pages_visited: Vec<String>,

    /// Number of category (listing) pages encountered
    pub catalog_pages_found: usize,

    /// Products extracted from product pages that passed the identity check
    pub products: Vec<ScrapedProduct>,

    /// Why the crawl stopped
    pub termination: TerminationReason,
}

/// The crawl orchestrator
///
/// Construction is the only fallible part; a built engine can run any
/// number of crawls, each with its own frontier and visited set. Only the
/// robots cache inside [`RobotsPolicy`] carries state across runs.
pub struct CrawlEngine {
    config: CrawlerConfig,
    client: Client,
    robots: Arc<RobotsPolicy>,
}

impl CrawlEngine {
    /// Builds an engine from configuration
    ///
    /// # Errors
    ///
    /// Fails only on setup problems (an HTTP client that cannot be built).
    pub fn new(config: &Config) -> Result<Self, CrawlerError> {
        let client = build_http_client(&config.user_agent, config.crawler.timeout_ms)?;
        let robots = Arc::new(RobotsPolicy::new(
            client.clone(),
            config.user_agent.crawler_name.clone(),
        ));

        Ok(Self {
            config: config.crawler.clone(),
            client,
            robots,
        })
    }

    /// Crawls a distributor catalog starting from one seed URL
    ///
    /// Always returns a result on a started crawl; zero products found is
    /// a valid, reportable outcome. The only errors are setup-time ones:
    /// a seed URL that does not parse.
    ///
    /// # Arguments
    ///
    /// * `seed` - The URL to start from, typically a storefront or
    ///   collection page
    pub async fn crawl(&self, seed: &str) -> Result<CrawlResult, CrawlerError> {
        let seed_url = normalize_url(seed)?;
        tracing::info!("Starting crawl from {}", seed_url);

        let state = Arc::new(Mutex::new(CrawlState::new()));
        state
            .lock()
            .expect("crawl state lock poisoned")
            .enqueue(CrawlTarget {
                url: seed_url,
                depth: 0,
            });

        let deadline = self
            .config
            .crawl_deadline_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));

        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(
            self.config.rate_limit_ms,
        )));
        let retry = RetryPolicy::new(
            self.config.max_retries,
            Duration::from_millis(self.config.retry_base_ms),
        );

        let started = std::time::Instant::now();
        let mut workers = JoinSet::new();
        for worker_id in 0..self.config.concurrency.max(1) {
            let worker = Worker {
                config: self.config.clone(),
                client: self.client.clone(),
                robots: Arc::clone(&self.robots),
                limiter: Arc::clone(&limiter),
                retry,
                state: Arc::clone(&state),
                deadline,
            };
            workers.spawn(worker.run(worker_id));
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Crawl worker panicked: {}", e);
            }
        }

        let state = Arc::try_unwrap(state)
            .expect("workers still hold crawl state after join")
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let (product_links, pages_visited, catalog_pages_found, products, termination) =
            state.into_parts();

        tracing::info!(
            "Crawl finished ({}) in {:?}: {} pages, {} catalog pages, {} product links, {} products",
            termination,
            started.elapsed(),
            pages_visited.len(),
            catalog_pages_found,
            product_links.len(),
            products.len()
        );

        Ok(CrawlResult {
            product_links,
            pages_visited,
            catalog_pages_found,
            products,
            termination,
        })
    }
}

/// One member of the crawl worker pool
///
/// Cheap handles all the way down, so each worker owns its clone and the
/// pool shares state only through the mutex and the limiter.
struct Worker {
    config: CrawlerConfig,
    client: Client,
    robots: Arc<RobotsPolicy>,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
    state: Arc<Mutex<CrawlState>>,
    deadline: Option<Instant>,
}

impl Worker {
    /// Checkout-process loop until the crawl has nothing left for us
    async fn run(self, worker_id: u32) {
        loop {
            let past_deadline = self
                .deadline
                .map(|d| Instant::now() >= d)
                .unwrap_or(false);

            let checkout = self
                .state
                .lock()
                .expect("crawl state lock poisoned")
                .checkout(self.config.max_pages as usize, past_deadline);

            match checkout {
                Checkout::Target(target) => self.process(target).await,
                Checkout::Wait => tokio::time::sleep(IDLE_POLL).await,
                Checkout::Done => break,
            }
        }
        tracing::debug!("Worker {} finished", worker_id);
    }

    /// Fetches, classifies, and records a single target
    async fn process(&self, target: CrawlTarget) {
        let url_string = target.url.to_string();
        tracing::debug!("Processing {} (depth {})", url_string, target.depth);

        let mut crawl_delay = None;
        if self.config.respect_robots_txt {
            let verdict = self.robots.can_crawl(&target.url).await;
            if !verdict.allowed {
                tracing::info!("Skipping {} (disallowed by robots.txt)", url_string);
                self.complete(url_string);
                return;
            }
            crawl_delay = verdict.crawl_delay;
        }

        let fetched = fetch_with_retry(&self.limiter, &self.retry, crawl_delay, || {
            fetch_page(&self.client, &url_string)
        })
        .await;

        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Skipping {} after retries: {}", url_string, e);
                self.complete(url_string);
                return;
            }
        };

        let kind = if page.is_html() {
            classify(&target.url, &page.body)
        } else {
            tracing::debug!(
                "Skipping non-HTML response from {} ({:?})",
                url_string,
                page.content_type
            );
            PageKind::Unknown
        };

        match kind {
            PageKind::Category => {
                let links = collect_catalog_links(&page.body, &target.url);
                let mut state = self.state.lock().expect("crawl state lock poisoned");
                state.record_category_page();
                if target.depth < self.config.max_depth {
                    for link in links {
                        state.enqueue(CrawlTarget {
                            url: link,
                            depth: target.depth + 1,
                        });
                    }
                } else {
                    tracing::debug!("Not expanding {}: depth limit reached", url_string);
                }
                state.complete(url_string);
            }
            PageKind::Product => {
                let mut product = extract(&target.url, &page.body);
                product.category = detect_category(&product);

                let mut state = self.state.lock().expect("crawl state lock poisoned");
                state.record_product_link(url_string.clone());
                if product.has_identity() {
                    state.push_product(product);
                } else {
                    tracing::debug!("Rejecting {}: no usable name or price", url_string);
                }
                state.complete(url_string);
            }
            PageKind::Unknown => {
                self.complete(url_string);
            }
        }
    }

    fn complete(&self, url: String) {
        self.state
            .lock()
            .expect("crawl state lock poisoned")
            .complete(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_seed_is_fatal() {
        let engine = CrawlEngine::new(&Config::default()).unwrap();
        assert!(engine.crawl("not a url").await.is_err());
        assert!(engine.crawl("ftp://shop.example/catalog").await.is_err());
    }

    #[test]
    fn test_termination_reason_labels() {
        assert_eq!(
            TerminationReason::FrontierExhausted.to_string(),
            "frontier exhausted"
        );
        assert_eq!(
            TerminationReason::PageBudgetReached.to_string(),
            "page budget reached"
        );
    }
}
