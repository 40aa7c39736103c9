//! Crawl frontier and shared per-run state
//!
//! One [`CrawlState`] lives behind a mutex for the duration of a single
//! crawl run and is shared by every worker. It owns the frontier queue, the
//! visited set, and the accumulating result fields. URLs are marked visited
//! at *enqueue* time, which both deduplicates re-discovered links and
//! prevents two workers from racing on the same URL in flight.

use crate::crawler::engine::TerminationReason;
use crate::extract::ScrapedProduct;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL queued for fetching, with its distance from the seed
///
/// Immutable once enqueued; discarded after processing.
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    /// The normalized URL to fetch
    pub url: Url,

    /// Frontier depth: 0 for the seed, +1 per discovery hop
    pub depth: u32,
}

/// Outcome of asking the frontier for work
#[derive(Debug)]
pub(crate) enum Checkout {
    /// A target to process; the caller owns completing it
    Target(CrawlTarget),
    /// Nothing queued, but other workers are still in flight
    Wait,
    /// The crawl is over for this worker
    Done,
}

/// Mutable state shared by all workers of one crawl run
#[derive(Debug)]
pub(crate) struct CrawlState {
    frontier: VecDeque<CrawlTarget>,
    visited: HashSet<String>,
    pages_visited: Vec<String>,
    product_links: Vec<String>,
    product_links_seen: HashSet<String>,
    products: Vec<ScrapedProduct>,
    catalog_pages_found: usize,
    in_flight: usize,
    termination: Option<TerminationReason>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self {
            frontier: VecDeque::new(),
            visited: HashSet::new(),
            pages_visited: Vec::new(),
            product_links: Vec::new(),
            product_links_seen: HashSet::new(),
            products: Vec::new(),
            catalog_pages_found: 0,
            in_flight: 0,
            termination: None,
        }
    }

    /// Enqueues a target unless its URL was already seen this run
    ///
    /// Returns true when the target was actually added. Depth bounds are
    /// the caller's responsibility; the frontier only guarantees
    /// uniqueness.
    pub fn enqueue(&mut self, target: CrawlTarget) -> bool {
        if !self.visited.insert(target.url.to_string()) {
            return false;
        }
        self.frontier.push_back(target);
        true
    }

    /// Hands out the next target, enforcing the page budget and deadline
    ///
    /// The budget counts completed pages plus in-flight ones, so the
    /// number of pages ever handed out can never exceed `max_pages`.
    pub fn checkout(&mut self, max_pages: usize, past_deadline: bool) -> Checkout {
        if past_deadline {
            if !self.frontier.is_empty() {
                self.termination
                    .get_or_insert(TerminationReason::DeadlineExceeded);
                self.frontier.clear();
            }
        }

        if self.pages_visited.len() + self.in_flight >= max_pages {
            if !self.frontier.is_empty() {
                self.termination
                    .get_or_insert(TerminationReason::PageBudgetReached);
            }
            return Checkout::Done;
        }

        match self.frontier.pop_front() {
            Some(target) => {
                self.in_flight += 1;
                Checkout::Target(target)
            }
            None if self.in_flight > 0 => Checkout::Wait,
            None => Checkout::Done,
        }
    }

    /// Records that a checked-out target finished processing
    ///
    /// `pages_visited` is appended in completion order, which is what the
    /// crawl report exposes.
    pub fn complete(&mut self, url: String) {
        debug_assert!(self.in_flight > 0, "complete() without checkout()");
        self.in_flight = self.in_flight.saturating_sub(1);
        self.pages_visited.push(url);
    }

    /// Counts a category page toward the crawl report
    pub fn record_category_page(&mut self) {
        self.catalog_pages_found += 1;
    }

    /// Records a discovered product page URL, deduplicated
    pub fn record_product_link(&mut self, url: String) -> bool {
        if !self.product_links_seen.insert(url.clone()) {
            return false;
        }
        self.product_links.push(url);
        true
    }

    /// Keeps an extracted product for the crawl report
    pub fn push_product(&mut self, product: ScrapedProduct) {
        self.products.push(product);
    }

    /// Finalizes the run into its report fields
    ///
    /// Returns `(product_links, pages_visited, catalog_pages_found,
    /// products, termination)`; a run that simply ran out of links
    /// terminated by frontier exhaustion.
    pub fn into_parts(
        self,
    ) -> (
        Vec<String>,
        Vec<String>,
        usize,
        Vec<ScrapedProduct>,
        TerminationReason,
    ) {
        (
            self.product_links,
            self.pages_visited,
            self.catalog_pages_found,
            self.products,
            self.termination
                .unwrap_or(TerminationReason::FrontierExhausted),
        )
    }
}
