//! JSON-lines product sink
//!
//! Writes one JSON object per line, the lingua franca for feeding scraped
//! data into whatever ingestion pipeline sits downstream.

use crate::extract::ScrapedProduct;
use crate::output::{OutputResult, ProductSink};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Appends products to a file as JSON lines
pub struct JsonLinesSink {
    writer: BufWriter<File>,
    records: usize,
}

impl JsonLinesSink {
    /// Creates (or truncates) the output file
    ///
    /// # Arguments
    ///
    /// * `path` - Destination file path
    pub fn create(path: &Path) -> OutputResult<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            records: 0,
        })
    }

    /// Number of products written so far
    pub fn records_written(&self) -> usize {
        self.records
    }
}

impl ProductSink for JsonLinesSink {
    fn record(&mut self, product: &ScrapedProduct) -> OutputResult<()> {
        serde_json::to_writer(&mut self.writer, product)?;
        self.writer.write_all(b"\n")?;
        self.records += 1;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
