//! Crawler module: frontier, link collection, and the crawl engine
//!
//! This module contains the core crawling logic:
//! - The frontier queue and per-run shared state
//! - Same-origin catalog link collection from category pages
//! - The worker-pool engine that ties robots, rate limiting, fetching,
//!   classification, and extraction together

pub(crate) mod engine;
pub(crate) mod frontier;
pub(crate) mod links;

pub use engine::{CrawlEngine, CrawlResult, TerminationReason};
pub use frontier::CrawlTarget;

use crate::config::Config;
use crate::CrawlerError;

/// Runs a complete crawl from a seed URL
///
/// Convenience wrapper that builds a [`CrawlEngine`] and runs one crawl.
/// Long-lived callers that crawl several distributors should build the
/// engine once and reuse it, keeping its robots.txt cache warm.
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - The URL to start from
///
/// # Returns
///
/// * `Ok(CrawlResult)` - The crawl ran to completion (even with zero products)
/// * `Err(CrawlerError)` - Setup failed (bad seed URL or HTTP client)
pub async fn crawl(config: &Config, seed: &str) -> Result<CrawlResult, CrawlerError> {
    let engine = CrawlEngine::new(config)?;
    engine.crawl(seed).await
}
