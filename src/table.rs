//! Result table and sinks.
//!
//! An ordered collection of flattened product rows. No uniqueness
//! constraint — duplicate IDs across regions are expected and kept.

use crate::normalize::ProductRecord;
use anyhow::{Context, Result};
use std::io::Write;

/// Ordered table of product rows, one per scraped product.
#[derive(Debug, Default)]
pub struct ResultTable {
    rows: Vec<ProductRecord>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ProductRecord) {
        self.rows.push(record);
    }

    pub fn rows(&self) -> &[ProductRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Concatenate per-region tables in the order supplied, each table's
    /// internal order untouched.
    pub fn concat(tables: Vec<ResultTable>) -> ResultTable {
        let mut all = ResultTable::new();
        for table in tables {
            all.rows.extend(table.rows);
        }
        all
    }

    /// Write the table as CSV with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv_writer.serialize(row).context("failed to write CSV row")?;
        }
        csv_writer.flush().context("failed to flush CSV output")?;
        Ok(())
    }

    /// Write the table as a pretty-printed JSON array.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, &self.rows)
            .context("failed to write JSON output")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> ProductRecord {
        ProductRecord {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_concat_preserves_order() {
        let mut first = ResultTable::new();
        first.push(record("1"));
        first.push(record("2"));
        let empty = ResultTable::new();
        let mut second = ResultTable::new();
        second.push(record("3"));

        let all = ResultTable::concat(vec![first, empty, second]);
        let ids: Vec<_> = all.rows().iter().map(|r| r.id.clone().unwrap()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let mut table = ResultTable::new();
        table.push(ProductRecord {
            id: Some("1".to_string()),
            brand: Some("AcmeCo".to_string()),
            ..Default::default()
        });

        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("id,image_url,post_type"));
        assert!(header.ends_with("extracted_datetime,extracted_date,extracted_time"));
        assert!(lines.next().unwrap().contains("AcmeCo"));
    }

    #[test]
    fn test_json_output_is_an_array() {
        let mut table = ResultTable::new();
        table.push(record("9"));

        let mut out = Vec::new();
        table.write_json(&mut out).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        assert_eq!(parsed[0]["id"], "9");
    }
}
