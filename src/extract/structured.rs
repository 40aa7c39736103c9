//! Structured data helpers: JSON-LD blocks and meta tags
//!
//! Storefront HTML is frequently malformed, so every helper here returns an
//! `Option` and swallows parse failures: a broken JSON-LD block simply
//! contributes nothing and the caller falls through to its next strategy.

use scraper::{Html, Selector};
use serde_json::Value;

/// Reads the `content` attribute of the first element matching a selector
pub(crate) fn meta_content(doc: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    doc.select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

/// Collects every top-level JSON-LD node on the page
///
/// Top-level arrays and `@graph` containers are flattened one level; nodes
/// nested inside other nodes' fields are not walked.
pub(crate) fn json_ld_nodes(doc: &Html) -> Vec<Value> {
    let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return Vec::new();
    };

    let mut nodes = Vec::new();
    for script in doc.select(&selector) {
        let text: String = script.text().collect();
        let Ok(parsed) = serde_json::from_str::<Value>(&text) else {
            continue;
        };

        match parsed {
            Value::Array(items) => nodes.extend(items),
            Value::Object(ref obj) => {
                if let Some(Value::Array(graph)) = obj.get("@graph") {
                    nodes.extend(graph.iter().cloned());
                }
                nodes.push(parsed);
            }
            _ => {}
        }
    }

    nodes
}

/// Whether a JSON-LD node declares one of the given `@type` values
pub(crate) fn node_has_type(node: &Value, types: &[&str]) -> bool {
    match node.get("@type") {
        Some(Value::String(t)) => types.iter().any(|ty| t.eq_ignore_ascii_case(ty)),
        Some(Value::Array(ts)) => ts.iter().any(|t| {
            t.as_str()
                .map(|t| types.iter().any(|ty| t.eq_ignore_ascii_case(ty)))
                .unwrap_or(false)
        }),
        _ => false,
    }
}

/// Whether any JSON-LD node on the page has one of the given types
pub(crate) fn json_ld_has_type(doc: &Html, types: &[&str]) -> bool {
    json_ld_nodes(doc).iter().any(|n| node_has_type(n, types))
}

/// The first JSON-LD `Product` node on the page, if any
pub(crate) fn json_ld_product(doc: &Html) -> Option<Value> {
    json_ld_nodes(doc)
        .into_iter()
        .find(|n| node_has_type(n, &["Product"]))
}

/// Coerces a JSON-LD value into a display string
///
/// Schema.org publishers are inconsistent: a field may be a plain string, a
/// number, an array of either, or a nested object carrying `name`/`url`.
pub(crate) fn loose_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.iter().find_map(loose_string),
        Value::Object(obj) => obj
            .get("name")
            .or_else(|| obj.get("url"))
            .and_then(loose_string),
        _ => None,
    }
}

/// Extracts the raw price text from a Product node's offers
pub(crate) fn offers_price(product: &Value) -> Option<String> {
    let offers = product.get("offers")?;
    let offer = match offers {
        Value::Array(items) => items.first()?,
        other => other,
    };

    offer
        .get("price")
        .or_else(|| offer.get("lowPrice"))
        .and_then(loose_string)
}

/// Extracts the availability URL/token from a Product node's offers
pub(crate) fn offers_availability(product: &Value) -> Option<String> {
    let offers = product.get("offers")?;
    let offer = match offers {
        Value::Array(items) => items.first()?,
        other => other,
    };

    offer.get("availability").and_then(loose_string)
}
