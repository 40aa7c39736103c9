//! Configuration module for Solcrawl
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every option has a default, so a config file is optional; CLI
//! flags take precedence over file values.
//!
//! # Example
//!
//! ```no_run
//! use solcrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("solcrawl.toml")).unwrap();
//! println!("Crawling with {} workers", config.crawler.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::load_config;
pub use validation::validate;
