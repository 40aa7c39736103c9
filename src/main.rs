//! Solcrawl main entry point
//!
//! Command-line interface for the distributor catalog crawler: point it at
//! a seed URL, get back a crawl summary and (optionally) a JSON-lines file
//! of scraped products.

use anyhow::Context;
use clap::Parser;
use solcrawl::config::{load_config, validate, Config};
use solcrawl::crawler::crawl;
use solcrawl::output::{print_crawl_summary, JsonLinesSink, ProductSink};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Solcrawl: a catalog crawler for solar equipment distributors
///
/// Crawls a distributor's site from a seed URL, discovers product and
/// category pages, and extracts structured product data. The crawl always
/// completes with a summary; finding zero products is a valid outcome,
/// not a failure.
#[derive(Parser, Debug)]
#[command(name = "solcrawl")]
#[command(version)]
#[command(about = "Discover and extract a distributor's product catalog", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from (storefront or collection page)
    #[arg(value_name = "SEED_URL")]
    seed: String,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of pages to visit
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Maximum link depth from the seed
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Number of concurrent fetch workers
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Minimum milliseconds between any two requests
    #[arg(long, value_name = "MS")]
    rate_limit_ms: Option<u64>,

    /// Per-request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Retry attempts after a failed fetch
    #[arg(long, value_name = "N")]
    max_retries: Option<u32>,

    /// Wall-clock budget for the whole crawl, in milliseconds
    #[arg(long, value_name = "MS")]
    deadline_ms: Option<u64>,

    /// Ignore robots.txt entirely
    #[arg(long)]
    no_robots: bool,

    /// Write scraped products to this file as JSON lines
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Load configuration (file optional), then let CLI flags override
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    apply_overrides(&mut config, &cli);
    validate(&config).context("configuration rejected")?;

    let result = crawl(&config, &cli.seed)
        .await
        .context("crawl failed to start")?;

    // Hand products to the sink, if one was requested
    let products_path = cli
        .output
        .clone()
        .or_else(|| config.output.products_path.as_ref().map(PathBuf::from));
    if let Some(path) = products_path {
        let mut sink = JsonLinesSink::create(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        for product in &result.products {
            sink.record(product)?;
        }
        sink.finish()?;
        tracing::info!(
            "Wrote {} products to {}",
            sink.records_written(),
            path.display()
        );
    }

    if !cli.quiet {
        print_crawl_summary(&result);
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("solcrawl=info,warn"),
            1 => EnvFilter::new("solcrawl=debug,info"),
            2 => EnvFilter::new("solcrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies CLI flag overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if let Some(rate_limit_ms) = cli.rate_limit_ms {
        config.crawler.rate_limit_ms = rate_limit_ms;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.crawler.timeout_ms = timeout_ms;
    }
    if let Some(max_retries) = cli.max_retries {
        config.crawler.max_retries = max_retries;
    }
    if let Some(deadline_ms) = cli.deadline_ms {
        config.crawler.crawl_deadline_ms = Some(deadline_ms);
    }
    if cli.no_robots {
        config.crawler.respect_robots_txt = false;
    }
}
