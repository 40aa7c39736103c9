//! Catalog link collection from category pages
//!
//! A category page's value is its outbound links. This module pulls anchor
//! hrefs out of the HTML, resolves them against the page URL, normalizes
//! them, and keeps only same-origin links shaped like product or listing
//! pages. Everything else (external sites, carts, account pages, assets)
//! stays out of the frontier.

use crate::classify::{looks_like_listing_path, looks_like_product_path};
use crate::url::{normalize_url, same_origin};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Collects frontier-worthy links from a category page
///
/// Returned links are normalized, absolute, same-origin, deduplicated, and
/// in document order.
///
/// # Arguments
///
/// * `html` - The category page body
/// * `base` - The (normalized) URL of the page the links came from
pub(crate) fn collect_catalog_links(html: &str, base: &Url) -> Vec<Url> {
    let doc = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut links = Vec::new();

    for element in doc.select(&selector) {
        // Download links point at files, not pages
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_link(href, base) else {
            continue;
        };

        if !same_origin(&url, base) {
            continue;
        }

        let path = url.path();
        if !(looks_like_product_path(path) || looks_like_listing_path(path)) {
            continue;
        }

        if seen.insert(url.to_string()) {
            links.push(url);
        }
    }

    links
}

/// Resolves an anchor href to a normalized absolute URL
///
/// Returns None for fragment-only anchors, non-navigational schemes
/// (`javascript:`, `mailto:`, `tel:`, `data:`), and anything that fails to
/// parse or normalize.
fn resolve_link(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = base.join(href).ok()?;
    normalize_url(absolute.as_str()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        normalize_url("https://shop.example/collections/solar-panels").unwrap()
    }

    fn link_strings(html: &str) -> Vec<String> {
        collect_catalog_links(html, &base())
            .into_iter()
            .map(|u| u.to_string())
            .collect()
    }

    #[test]
    fn test_relative_product_links_resolved() {
        let html = r#"<html><body>
            <a href="/products/panel-400w">Panel</a>
            <a href="/products/panel-500w">Bigger panel</a>
        </body></html>"#;
        assert_eq!(
            link_strings(html),
            vec![
                "https://shop.example/products/panel-400w",
                "https://shop.example/products/panel-500w",
            ]
        );
    }

    #[test]
    fn test_listing_links_kept() {
        let html = r#"<html><body>
            <a href="/collections/solar-panels?page=2">Next page</a>
            <a href="/collections/batteries">Batteries</a>
        </body></html>"#;
        assert_eq!(
            link_strings(html),
            vec![
                "https://shop.example/collections/solar-panels?page=2",
                "https://shop.example/collections/batteries",
            ]
        );
    }

    #[test]
    fn test_cross_origin_links_dropped() {
        let html = r#"<html><body>
            <a href="https://manufacturer.example/products/panel-400w">Manufacturer</a>
            <a href="/products/panel-400w">Ours</a>
        </body></html>"#;
        assert_eq!(
            link_strings(html),
            vec!["https://shop.example/products/panel-400w"]
        );
    }

    #[test]
    fn test_non_catalog_paths_dropped() {
        let html = r#"<html><body>
            <a href="/cart">Cart</a>
            <a href="/account/login">Login</a>
            <a href="/about-us">About</a>
        </body></html>"#;
        assert!(link_strings(html).is_empty());
    }

    #[test]
    fn test_duplicates_collapsed() {
        let html = r#"<html><body>
            <a href="/products/panel-400w"><img src="x.jpg"></a>
            <a href="/products/panel-400w">Panel 400W</a>
            <a href="/products/panel-400w/#reviews">Reviews</a>
        </body></html>"#;
        assert_eq!(
            link_strings(html),
            vec!["https://shop.example/products/panel-400w"]
        );
    }

    #[test]
    fn test_special_schemes_skipped() {
        let html = r##"<html><body>
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:sales@shop.example">Email</a>
            <a href="tel:+15551234567">Call</a>
            <a href="#top">Top</a>
        </body></html>"##;
        assert!(link_strings(html).is_empty());
    }

    #[test]
    fn test_download_links_skipped() {
        let html = r#"<html><body>
            <a href="/products/panel-400w" download>Spec PDF</a>
        </body></html>"#;
        assert!(link_strings(html).is_empty());
    }

    #[test]
    fn test_tracking_params_stripped_before_dedup() {
        let html = r#"<html><body>
            <a href="/products/panel-400w?utm_source=banner">Promo</a>
            <a href="/products/panel-400w">Plain</a>
        </body></html>"#;
        assert_eq!(
            link_strings(html),
            vec!["https://shop.example/products/panel-400w"]
        );
    }
}
