//! Record normalizer.
//!
//! Maps one raw catalog record into the flat `ProductRecord` schema.
//! Direct fields are copied by key lookup; a missing key is an absent
//! value, never an error. Most descriptive fields live in the record's
//! `"meta"` sub-map as single-element lists — the normalizer reads the
//! first element of each list value, as a string, or the empty string
//! when the key is absent inside `meta`. When `meta` itself is missing,
//! the meta-derived fields stay unset.

use crate::region::{Region, SITE_BASE};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Extraction metadata shared by every row of a run.
///
/// Date and time are formatted from one instant so every row of a run
/// carries a consistent timestamp triple.
#[derive(Debug, Clone)]
pub struct ExtractionStamp {
    pub datetime: String,
    pub date: String,
    pub time: String,
}

impl ExtractionStamp {
    pub fn now() -> Self {
        Self::at(Local::now().naive_local())
    }

    pub fn at(instant: NaiveDateTime) -> Self {
        Self {
            datetime: instant.format("%Y-%m-%d %H:%M:%S").to_string(),
            date: instant.format("%Y%m%d").to_string(),
            time: instant.format("%H:%M:%S").to_string(),
        }
    }
}

/// One flattened product row. Field order is the output column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: Option<String>,
    pub image_url: Option<String>,
    pub post_type: Option<String>,
    pub post_date: Option<String>,
    pub post_modified: Option<String>,
    pub post_status: Option<String>,
    pub post_name: Option<String>,
    pub product_name: Option<String>,
    pub post_title: Option<String>,
    pub comunicacion_type: Option<String>,
    pub product_description: Option<String>,
    pub sale_price: Option<String>,
    pub price: Option<String>,
    pub price_type: Option<String>,
    pub brand: Option<String>,
    pub outstanding: Option<String>,
    pub sap_ean_code: Option<String>,
    pub region: Option<String>,
    pub measure: Option<String>,
    pub product_url: Option<String>,
    pub category: Option<String>,
    pub extracted_region: Option<String>,
    pub extracted_datetime: Option<String>,
    pub extracted_date: Option<String>,
    pub extracted_time: Option<String>,
}

impl ProductRecord {
    /// Flatten one raw catalog record.
    ///
    /// `category` is left unset here; it needs a live URL resolution and
    /// is filled in by the resolver afterwards.
    pub fn from_raw(raw: &Value, region: &Region, stamp: &ExtractionStamp) -> Self {
        let mut record = ProductRecord {
            id: scalar(raw.get("ID")),
            image_url: scalar(raw.get("image")),
            post_type: scalar(raw.get("post_type")),
            post_date: scalar(raw.get("post_date")),
            post_modified: scalar(raw.get("post_modified")),
            post_status: scalar(raw.get("post_status")),
            post_name: scalar(raw.get("post_name")),
            product_name: scalar(raw.get("post_name")),
            post_title: scalar(raw.get("post_title")),
            extracted_region: region.tag(),
            extracted_datetime: Some(stamp.datetime.clone()),
            extracted_date: Some(stamp.date.clone()),
            extracted_time: Some(stamp.time.clone()),
            ..Default::default()
        };

        if let Some(meta) = raw.get("meta").filter(|m| m.is_object()) {
            record.comunicacion_type = Some(first_meta_element(meta, "comunicacion"));
            record.product_description = Some(first_meta_element(meta, "descripcion"));
            record.sale_price = Some(first_meta_element(meta, "precio_promocion_"));
            record.price = Some(first_meta_element(meta, "precio_referente"));
            record.price_type = Some(first_meta_element(meta, "tipo_de_precio_referente"));
            record.brand = Some(first_meta_element(meta, "marca"));
            record.outstanding = Some(first_meta_element(meta, "producto_destacado"));
            record.sap_ean_code = Some(first_meta_element(meta, "sap-ean"));
            record.region = Some(first_meta_element(meta, "region"));
            record.measure = Some(first_meta_element(meta, "unidad_de_medida"));
        }

        if let (Some(post_type), Some(name)) = (&record.post_type, &record.product_name) {
            record.product_url = Some(format!("{SITE_BASE}{post_type}/{name}/"));
        }

        record
    }
}

/// Read a JSON value as a scalar string. Numbers and booleans are
/// stringified; null and absent keys are `None`.
fn scalar(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// First element of a meta list value, as a string.
///
/// The site stores meta attributes as single-element lists. An absent key,
/// a non-list value, or an empty list all read as the empty string.
fn first_meta_element(meta: &Value, key: &str) -> String {
    match meta.get(key) {
        Some(Value::Array(items)) => match items.first() {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        },
        _ => String::new(),
    }
}
