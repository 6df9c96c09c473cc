//! Catalog payload decoder.
//!
//! The intercepted response body is a JSON object whose `"data"` key holds
//! the raw product records. Records stay untyped (`serde_json::Value`);
//! the normalizer is where shape assumptions live.

use anyhow::{Context, Result};
use serde_json::Value;

/// Parse a catalog response body and extract the raw product records.
///
/// A missing or non-array `"data"` key yields an empty list, not an error
/// — downstream iteration then processes nothing for the region.
pub fn decode_catalog(body: &str) -> Result<Vec<Value>> {
    let payload: Value =
        serde_json::from_str(body).context("catalog response body is not valid JSON")?;

    Ok(match payload.get("data") {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_extracts_data_array() {
        let body = json!({
            "data": [
                {"ID": 1, "post_name": "leche-entera"},
                {"ID": 2, "post_name": "pan-tajado"},
            ],
            "total": 2,
        })
        .to_string();

        let products = decode_catalog(&body).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0]["post_name"], "leche-entera");
    }

    #[test]
    fn test_missing_data_key_yields_empty() {
        let products = decode_catalog(r#"{"status": "ok"}"#).unwrap();
        assert!(products.is_empty());
    }

    #[test]
    fn test_non_array_data_yields_empty() {
        let products = decode_catalog(r#"{"data": "none"}"#).unwrap();
        assert!(products.is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(decode_catalog("<html>not json</html>").is_err());
    }
}
