//! Page classification for crawled catalog pages
//!
//! Decides whether a fetched page is a product detail page, a category
//! (listing) page, or neither. Classification is a pure function of the URL
//! and the HTML body, evaluated as an explicit ordered rule list with
//! first-match-wins, so the override ordering stays auditable and each rule
//! is testable on its own.
//!
//! Path-shape rules run before everything else: they are cheap and almost
//! always right for the dominant storefront platforms. The product-detail
//! shape is tested before the generic listing roots (`/products/{slug}`
//! must not be swallowed by a prefix match on `/products`), and known
//! listing slugs under `/products/` are excluded from the product shape.

use crate::extract::structured::{json_ld_has_type, meta_content};
use crate::extract::has_price_element;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Classification outcome for a fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// A product detail page worth extracting
    Product,
    /// A listing page whose value is its outbound product links
    Category,
    /// Neither; recorded as visited but contributes nothing
    Unknown,
}

/// Listing slugs that live under `/products/` on some platforms
const RESERVED_PRODUCT_SLUGS: &[&str] = &["new", "featured", "best-sellers", "clearance"];

/// Single-segment paths that are always listings
const LISTING_ROOTS: &[&str] = &["shop", "products", "catalog", "collections", "categories", "store"];

/// First segments whose two-segment paths are listings (`/collections/{slug}`)
const LISTING_PREFIXES: &[&str] = &["collections", "category", "categories", "pages", "shop", "catalog"];

/// Minimum distinct product-card anchors for the DOM listing heuristic
const PRODUCT_CARD_THRESHOLD: usize = 3;

struct RuleCtx<'a> {
    segments: Vec<&'a str>,
    doc: &'a Html,
}

type ClassifyRule = for<'a> fn(&RuleCtx<'a>) -> Option<PageKind>;

/// The classification cascade, evaluated in order, first match wins
const RULES: &[(&str, ClassifyRule)] = &[
    ("product-detail-path", product_detail_path_rule),
    ("listing-path", listing_path_rule),
    ("structured-data", structured_data_rule),
    ("dom-heuristic", dom_heuristic_rule),
];

/// Classifies a page as product, category, or unknown
///
/// Pure and idempotent: the same `(url, html)` pair always yields the same
/// kind.
///
/// # Examples
///
/// ```
/// use solcrawl::classify::{classify, PageKind};
/// use url::Url;
///
/// let url = Url::parse("https://shop.example/products/ecoflow-delta-2").unwrap();
/// assert_eq!(classify(&url, "<html></html>"), PageKind::Product);
/// ```
pub fn classify(url: &Url, html: &str) -> PageKind {
    let doc = Html::parse_document(html);
    let segments: Vec<&str> = url
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    let ctx = RuleCtx {
        segments,
        doc: &doc,
    };

    for (name, rule) in RULES {
        if let Some(kind) = rule(&ctx) {
            tracing::trace!("Classified {} as {:?} by rule {}", url, kind, name);
            return kind;
        }
    }

    PageKind::Unknown
}

/// `/products/{slug}` with a single slug segment is a product detail page,
/// unless the slug is a reserved listing name
fn product_detail_path_rule(ctx: &RuleCtx) -> Option<PageKind> {
    match ctx.segments.as_slice() {
        ["products", slug] if !RESERVED_PRODUCT_SLUGS.contains(slug) => Some(PageKind::Product),
        _ => None,
    }
}

/// Known listing roots and one-slug listing paths are category pages
fn listing_path_rule(ctx: &RuleCtx) -> Option<PageKind> {
    match ctx.segments.as_slice() {
        [root] if LISTING_ROOTS.contains(root) => Some(PageKind::Category),
        [prefix, _slug] if LISTING_PREFIXES.contains(prefix) => Some(PageKind::Category),
        // Reserved slugs under /products/ fell through the product rule
        ["products", slug] if RESERVED_PRODUCT_SLUGS.contains(slug) => Some(PageKind::Category),
        _ => None,
    }
}

/// Schema.org markup decides when the path shape did not
fn structured_data_rule(ctx: &RuleCtx) -> Option<PageKind> {
    if json_ld_has_type(ctx.doc, &["Product"]) {
        return Some(PageKind::Product);
    }

    if meta_content(ctx.doc, "meta[property='og:type']")
        .map(|t| t.eq_ignore_ascii_case("product"))
        .unwrap_or(false)
    {
        return Some(PageKind::Product);
    }

    if json_ld_has_type(ctx.doc, &["ItemList", "CollectionPage"]) {
        return Some(PageKind::Category);
    }

    None
}

/// DOM fallback: many product-card links make a listing; one dominant
/// heading with a price makes a product
fn dom_heuristic_rule(ctx: &RuleCtx) -> Option<PageKind> {
    if count_product_card_anchors(ctx.doc) >= PRODUCT_CARD_THRESHOLD {
        return Some(PageKind::Category);
    }

    let h1_selector = Selector::parse("h1").ok()?;
    let h1_count = ctx.doc.select(&h1_selector).count();
    if h1_count == 1 && has_price_element(ctx.doc) {
        return Some(PageKind::Product);
    }

    None
}

/// Counts distinct anchors that look like product cards
fn count_product_card_anchors(doc: &Html) -> usize {
    let Ok(selector) = Selector::parse("a[href]") else {
        return 0;
    };

    let mut distinct: HashSet<&str> = HashSet::new();
    for element in doc.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if href.contains("/products/") || href.contains("/item/") {
                distinct.insert(href);
            }
        }
    }

    distinct.len()
}

/// Whether a URL path has the shape of a product detail page
///
/// Broader than the classification rule: it also covers `/product/` and
/// `/item/` shapes seen on non-platform storefronts. Used when deciding
/// which discovered links are worth enqueuing.
pub(crate) fn looks_like_product_path(path: &str) -> bool {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        ["products", slug] => !RESERVED_PRODUCT_SLUGS.contains(slug),
        ["product" | "item", _slug] => true,
        _ => false,
    }
}

/// Whether a URL path has the shape of a listing page
pub(crate) fn looks_like_listing_path(path: &str) -> bool {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [root] => LISTING_ROOTS.contains(root),
        [prefix, slug] => {
            LISTING_PREFIXES.contains(prefix)
                || (*prefix == "products" && RESERVED_PRODUCT_SLUGS.contains(slug))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://shop.example{}", path)).unwrap()
    }

    #[test]
    fn test_product_detail_path() {
        assert_eq!(
            classify(&url("/products/ecoflow-delta-2"), "<html></html>"),
            PageKind::Product
        );
    }

    #[test]
    fn test_reserved_slug_is_not_product() {
        assert_eq!(
            classify(&url("/products/new"), "<html></html>"),
            PageKind::Category
        );
        assert_eq!(
            classify(&url("/products/best-sellers"), "<html></html>"),
            PageKind::Category
        );
    }

    #[test]
    fn test_listing_roots() {
        assert_eq!(classify(&url("/shop"), "<html></html>"), PageKind::Category);
        assert_eq!(
            classify(&url("/products"), "<html></html>"),
            PageKind::Category
        );
        assert_eq!(
            classify(&url("/collections/batteries"), "<html></html>"),
            PageKind::Category
        );
        assert_eq!(
            classify(&url("/category/inverters"), "<html></html>"),
            PageKind::Category
        );
    }

    #[test]
    fn test_product_subpath_not_swallowed_by_listing_root() {
        // The old prefix-match bug: /products/{slug} must stay a product
        // even though /products alone is a listing root.
        assert_eq!(
            classify(&url("/products/400w-panel"), "<html></html>"),
            PageKind::Product
        );
    }

    #[test]
    fn test_json_ld_product() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@context":"https://schema.org","@type":"Product","name":"Delta 2"}
        </script></head><body></body></html>"#;
        assert_eq!(classify(&url("/p/12345"), html), PageKind::Product);
    }

    #[test]
    fn test_og_type_product() {
        let html = r#"<html><head><meta property="og:type" content="product"></head></html>"#;
        assert_eq!(classify(&url("/p/12345"), html), PageKind::Product);
    }

    #[test]
    fn test_json_ld_item_list() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@type":"ItemList","itemListElement":[]}
        </script></head><body></body></html>"#;
        assert_eq!(classify(&url("/featured"), html), PageKind::Category);
    }

    #[test]
    fn test_dom_heuristic_many_product_cards() {
        let html = r#"<html><body>
            <a href="/products/panel-a">A</a>
            <a href="/products/panel-b">B</a>
            <a href="/products/panel-c">C</a>
            <a href="/products/panel-d">D</a>
        </body></html>"#;
        assert_eq!(classify(&url("/deals"), html), PageKind::Category);
    }

    #[test]
    fn test_dom_heuristic_duplicate_anchors_counted_once() {
        let html = r#"<html><body>
            <a href="/products/panel-a">A</a>
            <a href="/products/panel-a">A again</a>
            <a href="/products/panel-a">A image</a>
        </body></html>"#;
        assert_eq!(classify(&url("/deals"), html), PageKind::Unknown);
    }

    #[test]
    fn test_dom_heuristic_single_h1_with_price() {
        let html = r#"<html><body>
            <h1>EcoFlow Delta 2</h1>
            <span class="price">$999.00</span>
        </body></html>"#;
        assert_eq!(classify(&url("/p/delta-2"), html), PageKind::Product);
    }

    #[test]
    fn test_unknown_page() {
        let html = "<html><body><p>About our company</p></body></html>";
        assert_eq!(classify(&url("/about-us"), html), PageKind::Unknown);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let html = r#"<html><body><h1>Panel</h1><span class="price">$100</span></body></html>"#;
        let u = url("/p/panel");
        let first = classify(&u, html);
        for _ in 0..3 {
            assert_eq!(classify(&u, html), first);
        }
    }

    #[test]
    fn test_looks_like_product_path() {
        assert!(looks_like_product_path("/products/ecoflow-delta-2"));
        assert!(looks_like_product_path("/item/4412"));
        assert!(!looks_like_product_path("/products/new"));
        assert!(!looks_like_product_path("/products"));
        assert!(!looks_like_product_path("/products/panels/400w"));
        assert!(!looks_like_product_path("/about"));
    }

    #[test]
    fn test_looks_like_listing_path() {
        assert!(looks_like_listing_path("/collections/solar-panels"));
        assert!(looks_like_listing_path("/shop"));
        assert!(looks_like_listing_path("/products/clearance"));
        assert!(!looks_like_listing_path("/products/ecoflow-delta-2"));
        assert!(!looks_like_listing_path("/cart"));
    }
}
