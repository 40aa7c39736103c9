//! Solcrawl: a catalog crawler for solar equipment distributors
//!
//! This crate discovers a distributor's product catalog from a single seed URL.
//! It crawls politely (robots.txt, shared rate limiting), classifies pages as
//! product or category listings, and extracts structured product data from the
//! pages it recognizes.

pub mod category;
pub mod classify;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Fatal, setup-time errors for Solcrawl operations
///
/// Per-URL failures during a crawl (timeouts, HTTP errors, ambiguous markup)
/// are deliberately *not* represented here: they are skipped and the crawl
/// continues. Only errors that prevent a crawl from starting surface as
/// `CrawlerError`.
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL: {0}")]
    Seed(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Solcrawl operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use category::EquipmentCategory;
pub use classify::PageKind;
pub use config::Config;
pub use crawler::{CrawlEngine, CrawlResult, TerminationReason};
pub use extract::ScrapedProduct;
pub use crate::url::{normalize_url, same_origin};
