//! Output handling: the product sink contract and crawl summaries
//!
//! The crawler itself never persists anything. Extracted products are
//! handed to a [`ProductSink`], the seam where a real deployment plugs in
//! its upsert-by-source-URL logic; the shipped implementation simply
//! writes JSON lines. The summary printer gives the CLI a human-readable
//! account of what a run did.

mod json_lines;

pub use json_lines::JsonLinesSink;

use crate::crawler::CrawlResult;
use crate::extract::ScrapedProduct;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur while recording products
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to serialize product: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for scraped products
///
/// Implementations decide what "storing a product" means: upserting into
/// a database keyed by `(distributor, source_url)`, appending to a file,
/// posting to a queue. The crawler only promises each product is handed
/// over exactly once per run.
pub trait ProductSink {
    /// Records one scraped product
    fn record(&mut self, product: &ScrapedProduct) -> OutputResult<()>;

    /// Flushes any buffered records; called once after the crawl
    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

/// Prints a human-readable summary of a crawl run
pub fn print_crawl_summary(result: &CrawlResult) {
    println!("=== Crawl Summary ===\n");
    println!("Pages visited:       {}", result.pages_visited.len());
    println!("Catalog pages found: {}", result.catalog_pages_found);
    println!("Product links:       {}", result.product_links.len());
    println!("Products extracted:  {}", result.products.len());
    println!("Stopped because:     {}", result.termination);

    if !result.products.is_empty() {
        println!("\nProducts by category:");
        let mut by_category: BTreeMap<&str, usize> = BTreeMap::new();
        for product in &result.products {
            *by_category.entry(product.category.as_str()).or_default() += 1;
        }
        for (category, count) in by_category {
            println!("  {:<18} {}", category, count);
        }

        println!("\nSample products:");
        for product in result.products.iter().take(5) {
            let name = product.name.as_deref().unwrap_or("(unnamed)");
            match product.price {
                Some(price) => println!("  {} (${:.2})", name, price),
                None => println!("  {}", name),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::EquipmentCategory;
    use crate::crawler::TerminationReason;

    /// Sink that only counts records
    struct CountingSink {
        records: usize,
        finished: bool,
    }

    impl ProductSink for CountingSink {
        fn record(&mut self, _product: &ScrapedProduct) -> OutputResult<()> {
            self.records += 1;
            Ok(())
        }

        fn finish(&mut self) -> OutputResult<()> {
            self.finished = true;
            Ok(())
        }
    }

    fn sample_product() -> ScrapedProduct {
        ScrapedProduct {
            name: Some("Panel".to_string()),
            price: Some(199.0),
            description: None,
            manufacturer: None,
            model_number: None,
            specifications: None,
            image_url: None,
            data_sheet_url: None,
            source_url: "https://shop.example/products/panel".to_string(),
            in_stock: true,
            category: EquipmentCategory::SolarPanel,
        }
    }

    #[test]
    fn test_counting_sink() {
        let mut sink = CountingSink {
            records: 0,
            finished: false,
        };
        sink.record(&sample_product()).unwrap();
        sink.record(&sample_product()).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.records, 2);
        assert!(sink.finished);
    }

    #[test]
    fn test_summary_printing_does_not_panic() {
        let result = CrawlResult {
            product_links: vec!["https://shop.example/products/panel".to_string()],
            pages_visited: vec!["https://shop.example/".to_string()],
            catalog_pages_found: 1,
            products: vec![sample_product()],
            termination: TerminationReason::FrontierExhausted,
        };
        print_crawl_summary(&result);
    }
}
