//! URL handling module for Solcrawl
//!
//! This module provides URL normalization plus the host and origin helpers
//! the crawler uses to keep a crawl on the distributor's own site.

mod normalize;

pub use normalize::normalize_url;

use url::Url;

/// Returns true when two URLs point at the same origin
///
/// Origin here means scheme + host + port. Category pages routinely link
/// out to manufacturers and payment providers; the crawler only follows
/// links that stay on the distributor's site.
///
/// # Examples
///
/// ```
/// use solcrawl::url::{normalize_url, same_origin};
///
/// let a = normalize_url("https://shop.example/collections/panels").unwrap();
/// let b = normalize_url("https://www.shop.example/products/panel-400w").unwrap();
/// let c = normalize_url("https://vendor.example/panel-400w").unwrap();
/// assert!(same_origin(&a, &b));
/// assert!(!same_origin(&a, &c));
/// ```
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme() && a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

/// Formats the origin of a URL as `scheme://host[:port]`
///
/// Non-default ports are kept so locally hosted test servers get distinct
/// robots.txt cache entries.
pub fn origin_of(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    match url.port() {
        Some(port) => Some(format!("{}://{}:{}", url.scheme(), host, port)),
        None => Some(format!("{}://{}", url.scheme(), host)),
    }
}
