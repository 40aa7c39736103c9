//! Equipment category detection for scraped products
//!
//! Maps a product's name, description, and URL path onto a closed set of
//! solar equipment categories for downstream cataloging. Keyword matching
//! runs in a fixed priority order, specific gear like charge controllers
//! and inverters before the catch-alls, so a "battery cable" lands in wiring
//! territory only when nothing more specific claimed it first. Detection
//! never fails; an unmatched product is simply `Other`.

use crate::extract::ScrapedProduct;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of equipment categories the catalog understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentCategory {
    SolarPanel,
    Battery,
    Inverter,
    ChargeController,
    Mounting,
    Wiring,
    Electrical,
    Monitoring,
    Accessories,
    #[default]
    Other,
}

impl EquipmentCategory {
    /// Stable lowercase label, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SolarPanel => "solar_panel",
            Self::Battery => "battery",
            Self::Inverter => "inverter",
            Self::ChargeController => "charge_controller",
            Self::Mounting => "mounting",
            Self::Wiring => "wiring",
            Self::Electrical => "electrical",
            Self::Monitoring => "monitoring",
            Self::Accessories => "accessories",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EquipmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword table in evaluation order: first category with any hit wins
///
/// Charge controllers come before batteries and panels because their
/// listings almost always mention both; the generic buckets go last so
/// they cannot shadow specific gear.
const CATEGORY_KEYWORDS: &[(EquipmentCategory, &[&str])] = &[
    (
        EquipmentCategory::ChargeController,
        &["charge controller", "mppt", "pwm controller", "solar controller"],
    ),
    (
        EquipmentCategory::Inverter,
        &["inverter", "micro inverter", "microinverter"],
    ),
    (
        EquipmentCategory::Battery,
        &["battery", "batteries", "lifepo4", "lithium", "agm", "power station"],
    ),
    (
        EquipmentCategory::SolarPanel,
        &[
            "solar panel",
            "solar panels",
            "pv module",
            "photovoltaic",
            "monocrystalline",
            "polycrystalline",
            "bifacial",
        ],
    ),
    (
        EquipmentCategory::Mounting,
        &["mount", "racking", "rail", "roof attachment", "ground screw"],
    ),
    (
        EquipmentCategory::Wiring,
        &["wire", "cable", "mc4", "connector"],
    ),
    (
        EquipmentCategory::Monitoring,
        &["monitor", "meter", "gateway", "shunt", "sensor"],
    ),
    (
        EquipmentCategory::Electrical,
        &["breaker", "fuse", "combiner", "disconnect", "busbar", "electrical"],
    ),
    (
        EquipmentCategory::Accessories,
        &["accessor", "adapter", "extension", "carry case", "kit"],
    ),
];

/// Detects the equipment category of a scraped product
///
/// Scores keywords over the concatenated name, description, and URL path
/// tokens. Defaults to [`EquipmentCategory::Other`] when nothing matches.
///
/// # Examples
///
/// ```
/// use solcrawl::category::{detect_category, EquipmentCategory};
/// use solcrawl::extract::extract;
/// use url::Url;
///
/// let url = Url::parse("https://shop.example/products/delta-2").unwrap();
/// let product = extract(&url, "<html><body><h1>Delta 2 Power Station</h1></body></html>");
/// assert_eq!(detect_category(&product), EquipmentCategory::Battery);
/// ```
pub fn detect_category(product: &ScrapedProduct) -> EquipmentCategory {
    let haystack = keyword_haystack(product);

    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|kw| haystack.contains(kw)) {
            return *category;
        }
    }

    EquipmentCategory::Other
}

/// Builds the lowercased text the keywords are matched against
///
/// URL path separators become spaces so `collections/solar-panels`
/// contributes the tokens "solar panels".
fn keyword_haystack(product: &ScrapedProduct) -> String {
    let mut haystack = String::new();

    if let Some(name) = &product.name {
        haystack.push_str(name);
        haystack.push(' ');
    }
    if let Some(description) = &product.description {
        haystack.push_str(description);
        haystack.push(' ');
    }

    let path_tokens: String = product
        .source_url
        .chars()
        .map(|c| if c == '/' || c == '-' || c == '_' { ' ' } else { c })
        .collect();
    haystack.push_str(&path_tokens);

    haystack.to_lowercase()
}
