//! Product data extraction from classified product pages
//!
//! Each field is pulled through its own prioritized cascade of strategies:
//! structured data first, then microdata and meta tags, then common CSS
//! classes. The first non-empty result wins. Fields are fully
//! independent: a page with no recognizable price still yields its name.
//!
//! The extractor itself never rejects a page; it returns whatever it found.
//! Whether a near-empty product is worth keeping is the crawl engine's call
//! (see [`ScrapedProduct::has_identity`]).

pub(crate) mod structured;

use crate::category::EquipmentCategory;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use structured::{
    json_ld_product, loose_string, meta_content, offers_availability, offers_price,
};
use url::Url;

/// CSS classes that commonly carry the display price
pub(crate) const PRICE_CLASS_SELECTORS: &[&str] = &[".price", ".product-price", ".money"];

/// Structured product data scraped from one product page
///
/// Everything except `source_url` and `in_stock` is best-effort and absent
/// when extraction fails. A product is never mutated after extraction; the
/// persistence collaborator upserts it keyed by source URL or model number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedProduct {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub model_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<BTreeMap<String, String>>,
    pub image_url: Option<String>,
    pub data_sheet_url: Option<String>,
    pub source_url: String,
    pub in_stock: bool,
    pub category: EquipmentCategory,
}

impl ScrapedProduct {
    /// Whether this product carries enough identity to be worth keeping
    ///
    /// A page that superficially looked like a product but yielded neither
    /// a name nor a price must not become a catalog record.
    pub fn has_identity(&self) -> bool {
        self.name.is_some() || self.price.is_some()
    }
}

/// Extracts product data from a product page
///
/// Pure function of its inputs; every field runs its own cascade and
/// failures are per-field, never page-wide.
///
/// # Arguments
///
/// * `url` - The page URL (becomes `source_url`; also resolves relative image links)
/// * `html` - The raw HTML body
pub fn extract(url: &Url, html: &str) -> ScrapedProduct {
    let doc = Html::parse_document(html);
    let ld = json_ld_product(&doc);

    let name = first_text(&doc, "h1")
        .or_else(|| meta_content(&doc, "meta[property='og:title']"))
        .or_else(|| ld.as_ref().and_then(|p| p.get("name")).and_then(loose_string));

    let price = ld
        .as_ref()
        .and_then(offers_price)
        .as_deref()
        .and_then(clean_price_text)
        .or_else(|| itemprop_price(&doc))
        .or_else(|| price_class_text(&doc).as_deref().and_then(clean_price_text))
        .or_else(|| {
            meta_content(&doc, "meta[property='og:price:amount']")
                .or_else(|| meta_content(&doc, "meta[property='product:price:amount']"))
                .as_deref()
                .and_then(clean_price_text)
        });

    let description = meta_content(&doc, "meta[name='description']")
        .or_else(|| first_text(&doc, "[itemprop='description']"))
        .or_else(|| {
            ld.as_ref()
                .and_then(|p| p.get("description"))
                .and_then(loose_string)
        });

    let image_url = meta_content(&doc, "meta[property='og:image']")
        .or_else(|| first_attr(&doc, "[itemprop='image']", "src"))
        .or_else(|| ld.as_ref().and_then(|p| p.get("image")).and_then(loose_string))
        .and_then(|src| absolutize(url, &src));

    let manufacturer = ld
        .as_ref()
        .and_then(|p| p.get("brand"))
        .and_then(loose_string);

    let model_number = ld
        .as_ref()
        .and_then(|p| p.get("sku").or_else(|| p.get("mpn")))
        .and_then(loose_string);

    let specifications = ld.as_ref().and_then(specifications_table);

    let data_sheet_url = data_sheet_link(&doc).and_then(|href| absolutize(url, &href));

    let in_stock = infer_stock_status(&doc, ld.as_ref());

    ScrapedProduct {
        name,
        price,
        description,
        manufacturer,
        model_number,
        specifications,
        image_url,
        data_sheet_url,
        source_url: url.to_string(),
        in_stock,
        category: EquipmentCategory::Other,
    }
}

/// Cleans display price text and parses it as a number
///
/// Strips everything except digits and decimal points before parsing, so
/// `"$1,299.00"` becomes `1299.0`. Anything that fails to parse, or that
/// parses to a non-finite value, is absent, never zero.
pub fn clean_price_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
}

/// Whether the page has any recognizable price-bearing element
pub(crate) fn has_price_element(doc: &Html) -> bool {
    if let Ok(selector) = Selector::parse("[itemprop='price']") {
        if doc.select(&selector).next().is_some() {
            return true;
        }
    }

    PRICE_CLASS_SELECTORS.iter().any(|css| {
        Selector::parse(css)
            .map(|sel| doc.select(&sel).next().is_some())
            .unwrap_or(false)
    })
}

/// Trimmed text of the first element matching a selector
fn first_text(doc: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    doc.select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .find(|s| !s.is_empty())
}

/// Attribute value of the first element matching a selector
fn first_attr(doc: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    doc.select(&selector)
        .filter_map(|el| el.value().attr(attr))
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

/// Price from a microdata element: the `content` attribute wins over text
fn itemprop_price(doc: &Html) -> Option<f64> {
    let selector = Selector::parse("[itemprop='price']").ok()?;
    for el in doc.select(&selector) {
        let raw = el
            .value()
            .attr("content")
            .map(|s| s.to_string())
            .unwrap_or_else(|| el.text().collect::<String>());
        if let Some(price) = clean_price_text(&raw) {
            return Some(price);
        }
    }
    None
}

/// Display price text from the common price CSS classes
fn price_class_text(doc: &Html) -> Option<String> {
    for css in PRICE_CLASS_SELECTORS {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        if let Some(text) = doc
            .select(&selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .find(|s| !s.is_empty())
        {
            return Some(text);
        }
    }
    None
}

/// Specification map from schema.org `additionalProperty` entries
fn specifications_table(product: &serde_json::Value) -> Option<BTreeMap<String, String>> {
    let props = product.get("additionalProperty")?.as_array()?;

    let table: BTreeMap<String, String> = props
        .iter()
        .filter_map(|prop| {
            let name = prop.get("name").and_then(loose_string)?;
            let value = prop.get("value").and_then(loose_string)?;
            Some((name, value))
        })
        .collect();

    (!table.is_empty()).then_some(table)
}

/// Finds a PDF datasheet link on the page
fn data_sheet_link(doc: &Html) -> Option<String> {
    let selector = Selector::parse("a[href]").ok()?;

    for el in doc.select(&selector) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let href_lower = href.to_lowercase();
        let text_lower = el.text().collect::<String>().to_lowercase();

        let named_like_datasheet = href_lower.contains("datasheet")
            || href_lower.contains("data-sheet")
            || href_lower.contains("spec-sheet");
        let pdf_with_datasheet_label = href_lower.ends_with(".pdf")
            && (text_lower.contains("datasheet")
                || text_lower.contains("data sheet")
                || text_lower.contains("spec"));

        if named_like_datasheet || pdf_with_datasheet_label {
            return Some(href.to_string());
        }
    }

    None
}

/// Stock status: in stock unless the page says otherwise
///
/// Absence of evidence is presence of stock. Only an explicit
/// schema.org `OutOfStock` availability or an "out of stock" / "sold out"
/// text match flips the flag.
fn infer_stock_status(doc: &Html, ld: Option<&serde_json::Value>) -> bool {
    if let Some(availability) = ld.and_then(offers_availability) {
        let availability = availability.to_lowercase();
        if availability.contains("outofstock") || availability.contains("discontinued") {
            return false;
        }
        if availability.contains("instock") {
            return true;
        }
    }

    let body_text = body_text_lowercase(doc);
    !(body_text.contains("out of stock") || body_text.contains("sold out"))
}

/// Lowercased text content of the page body
fn body_text_lowercase(doc: &Html) -> String {
    let Ok(selector) = Selector::parse("body") else {
        return String::new();
    };
    doc.select(&selector)
        .flat_map(|body| body.text())
        .collect::<String>()
        .to_lowercase()
}

/// Resolves a possibly-relative link against the page URL
fn absolutize(base: &Url, href: &str) -> Option<String> {
    base.join(href).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_url() -> Url {
        Url::parse("https://shop.example/products/ecoflow-delta-2").unwrap()
    }

    #[test]
    fn test_price_cleaning() {
        assert_eq!(clean_price_text("$1,299.00"), Some(1299.0));
        assert_eq!(clean_price_text("1299"), Some(1299.0));
        assert_eq!(clean_price_text("€ 849,00 EUR"), Some(84900.0));
        assert_eq!(clean_price_text(""), None);
        assert_eq!(clean_price_text("Call for pricing"), None);
        assert_eq!(clean_price_text("$"), None);
    }

    #[test]
    fn test_extract_from_json_ld() {
        let html = r#"<html><head>
            <script type="application/ld+json">{
                "@context": "https://schema.org",
                "@type": "Product",
                "name": "EcoFlow Delta 2",
                "description": "Portable power station",
                "brand": {"@type": "Brand", "name": "EcoFlow"},
                "sku": "EF-D2-1024",
                "image": "https://cdn.shop.example/delta2.jpg",
                "additionalProperty": [
                    {"@type": "PropertyValue", "name": "Capacity", "value": "1024Wh"},
                    {"@type": "PropertyValue", "name": "Weight", "value": "12kg"}
                ],
                "offers": {"@type": "Offer", "price": "999.00", "availability": "https://schema.org/InStock"}
            }</script>
        </head><body></body></html>"#;

        let product = extract(&product_url(), html);
        assert_eq!(product.name, Some("EcoFlow Delta 2".to_string()));
        assert_eq!(product.price, Some(999.0));
        assert_eq!(product.description, Some("Portable power station".to_string()));
        assert_eq!(product.manufacturer, Some("EcoFlow".to_string()));
        assert_eq!(product.model_number, Some("EF-D2-1024".to_string()));
        assert_eq!(
            product.image_url,
            Some("https://cdn.shop.example/delta2.jpg".to_string())
        );
        let specs = product.specifications.unwrap();
        assert_eq!(specs.get("Capacity"), Some(&"1024Wh".to_string()));
        assert!(product.in_stock);
        assert_eq!(product.source_url, "https://shop.example/products/ecoflow-delta-2");
    }

    #[test]
    fn test_h1_beats_og_title_for_name() {
        let html = r#"<html><head>
            <meta property="og:title" content="Delta 2 | Shop Example">
        </head><body><h1>EcoFlow Delta 2</h1></body></html>"#;
        let product = extract(&product_url(), html);
        assert_eq!(product.name, Some("EcoFlow Delta 2".to_string()));
    }

    #[test]
    fn test_og_title_fallback() {
        let html = r#"<html><head>
            <meta property="og:title" content="EcoFlow Delta 2">
        </head><body></body></html>"#;
        let product = extract(&product_url(), html);
        assert_eq!(product.name, Some("EcoFlow Delta 2".to_string()));
    }

    #[test]
    fn test_price_from_css_class() {
        let html = r#"<html><body>
            <h1>Panel</h1>
            <div class="product-price">$1,299.00</div>
        </body></html>"#;
        let product = extract(&product_url(), html);
        assert_eq!(product.price, Some(1299.0));
    }

    #[test]
    fn test_price_from_itemprop_content_attr() {
        let html = r#"<html><body>
            <h1>Panel</h1>
            <span itemprop="price" content="449.99">$449.99 USD</span>
        </body></html>"#;
        let product = extract(&product_url(), html);
        assert_eq!(product.price, Some(449.99));
    }

    #[test]
    fn test_unparseable_price_is_absent_not_zero() {
        let html = r#"<html><body>
            <h1>Panel</h1>
            <div class="price">Call for pricing</div>
        </body></html>"#;
        let product = extract(&product_url(), html);
        assert_eq!(product.price, None);
    }

    #[test]
    fn test_fields_are_independent() {
        // No price anywhere, but the name still comes through
        let html = "<html><body><h1>Mystery Panel</h1></body></html>";
        let product = extract(&product_url(), html);
        assert_eq!(product.name, Some("Mystery Panel".to_string()));
        assert_eq!(product.price, None);
        assert!(product.has_identity());
    }

    #[test]
    fn test_no_identity_when_nameless_and_priceless() {
        let html = "<html><body><p>nothing here</p></body></html>";
        let product = extract(&product_url(), html);
        assert!(!product.has_identity());
    }

    #[test]
    fn test_in_stock_default_true() {
        let html = "<html><body><h1>Panel</h1></body></html>";
        assert!(extract(&product_url(), html).in_stock);
    }

    #[test]
    fn test_out_of_stock_text_flips_flag() {
        let html = r#"<html><body><h1>Panel</h1><span class="badge">Out of Stock</span></body></html>"#;
        assert!(!extract(&product_url(), html).in_stock);

        let html = r#"<html><body><h1>Panel</h1><p>SOLD OUT</p></body></html>"#;
        assert!(!extract(&product_url(), html).in_stock);
    }

    #[test]
    fn test_schema_out_of_stock_flips_flag() {
        let html = r#"<html><head><script type="application/ld+json">{
            "@type": "Product", "name": "Panel",
            "offers": {"price": "100", "availability": "https://schema.org/OutOfStock"}
        }</script></head><body></body></html>"#;
        assert!(!extract(&product_url(), html).in_stock);
    }

    #[test]
    fn test_relative_image_resolved() {
        let html = r#"<html><head>
            <meta property="og:image" content="/cdn/delta2.jpg">
        </head><body><h1>Delta 2</h1></body></html>"#;
        let product = extract(&product_url(), html);
        assert_eq!(
            product.image_url,
            Some("https://shop.example/cdn/delta2.jpg".to_string())
        );
    }

    #[test]
    fn test_data_sheet_link_found() {
        let html = r#"<html><body>
            <h1>Panel</h1>
            <a href="/files/panel-400w-datasheet.pdf">Download datasheet</a>
        </body></html>"#;
        let product = extract(&product_url(), html);
        assert_eq!(
            product.data_sheet_url,
            Some("https://shop.example/files/panel-400w-datasheet.pdf".to_string())
        );
    }

    #[test]
    fn test_description_from_meta() {
        let html = r#"<html><head>
            <meta name="description" content="A 400W monocrystalline panel.">
        </head><body><h1>Panel</h1></body></html>"#;
        let product = extract(&product_url(), html);
        assert_eq!(
            product.description,
            Some("A 400W monocrystalline panel.".to_string())
        );
    }
}
