//! FILENAME: core/trade-data/src/loader.rs
//! JSON loading - turns a pre-computed dataset document into a cache.
//!
//! Input is a top-level JSON array of flat objects. There is no schema
//! enforcement beyond the documented field keys: a missing or mistyped
//! value interns as empty and simply drops out of the aggregates.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use log::{error, warn};
use serde_json::Value;

use drill_engine::{CacheValue, DatasetCache};

use crate::error::TradeDataError;
use crate::schema::{DatasetSchema, FieldKind};

/// Parses a JSON document into a cache according to `schema`.
pub fn parse_records(json: &str, schema: &DatasetSchema) -> Result<DatasetCache, TradeDataError> {
    let document: Value = serde_json::from_str(json)?;
    let rows = document.as_array().ok_or(TradeDataError::NotAnArray)?;

    let mut cache = DatasetCache::new(&schema.field_names());
    let mut values = Vec::with_capacity(schema.fields.len());

    for (index, row) in rows.iter().enumerate() {
        let object = match row.as_object() {
            Some(o) => o,
            None => {
                warn!("{}: record {} is not an object, skipped", schema.name, index);
                continue;
            }
        };

        values.clear();
        for field in &schema.fields {
            let raw = object.get(&field.key).unwrap_or(&Value::Null);
            values.push(convert(raw, field.kind));
        }
        cache.add_record(&values);
    }

    Ok(cache)
}

/// Loads and parses a dataset file.
pub fn load_dataset(path: &Path, schema: &DatasetSchema) -> Result<DatasetCache, TradeDataError> {
    let json = fs::read_to_string(path)?;
    parse_records(&json, schema)
}

/// Loads a dataset file, logging failures and falling back to an empty
/// cache. The explorer then renders empty breakdowns at every level, the
/// same way the dashboard behaves when its fetch fails.
pub fn load_or_empty(path: &Path, schema: &DatasetSchema) -> DatasetCache {
    match load_dataset(path, schema) {
        Ok(cache) => cache,
        Err(err) => {
            error!("{}: failed to load {}: {}", schema.name, path.display(), err);
            DatasetCache::new(&schema.field_names())
        }
    }
}

/// Normalizes one JSON value into a cache value.
fn convert(value: &Value, kind: FieldKind) -> CacheValue {
    match kind {
        FieldKind::Text => match value {
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    CacheValue::Empty
                } else {
                    CacheValue::text(trimmed)
                }
            }
            Value::Number(n) => CacheValue::text(n.to_string()),
            Value::Bool(b) => CacheValue::text(if *b { "true" } else { "false" }),
            _ => CacheValue::Empty,
        },
        FieldKind::Number => match value {
            Value::Number(n) => n.as_f64().map(CacheValue::number).unwrap_or(CacheValue::Empty),
            // Quantities and prices sometimes arrive as numeric strings.
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(CacheValue::number)
                .unwrap_or(CacheValue::Empty),
            _ => CacheValue::Empty,
        },
        FieldKind::Date => match value {
            Value::String(s) => parse_date(s.trim()).map(CacheValue::Date).unwrap_or(CacheValue::Empty),
            _ => CacheValue::Empty,
        },
    }
}

/// Accepts full dates (`2023-04-17`) and month-only keys (`2023-04`).
fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").ok()
}
