//! FILENAME: core/trade-data/src/schema.rs
//! Dataset schemas - field layout and hierarchy of each shipped dataset.
//!
//! A schema maps the JSON keys of one pre-computed dataset to typed fields
//! and carries the drill-down hierarchy over those fields. Field order in
//! the schema is the `FieldIndex` order of the resulting cache.

use serde::{Deserialize, Serialize};

use drill_engine::{DrillLevel, Hierarchy, TrendLevel};

/// How a JSON value is normalized into the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Kept as text; numbers and booleans are stringified.
    Text,
    /// Parsed as f64; numeric strings are accepted, anything else is empty.
    Number,
    /// Parsed as `YYYY-MM-DD` or month-only `YYYY-MM`; failures are empty.
    Date,
}

/// One field of a dataset: its JSON key and how to read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    /// Key of the field in each JSON record.
    pub key: String,

    /// How the value is normalized.
    pub kind: FieldKind,
}

impl FieldDef {
    pub fn new(key: impl Into<String>, kind: FieldKind) -> Self {
        FieldDef {
            key: key.into(),
            kind,
        }
    }
}

/// The complete description of one dataset: fields plus drill-down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub name: String,
    pub fields: Vec<FieldDef>,
    pub hierarchy: Hierarchy,
}

impl DatasetSchema {
    /// Field names for the cache, in `FieldIndex` order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.key.as_str()).collect()
    }
}

/// Fabric export dataset (`fabric_data_gain_lucky_2023_export_top20.json`):
/// brand → buyer → fabric type → material, monthly unit-price trend,
/// quantities as the breakdown metric. `Dimension_Info` (index 4) feeds the
/// top-5 dimension chart via `compute_top`.
pub fn fabric_export() -> DatasetSchema {
    let fields = vec![
        FieldDef::new("Brand", FieldKind::Text),
        FieldDef::new("Buyer", FieldKind::Text),
        FieldDef::new("Normalized_fabric", FieldKind::Text),
        FieldDef::new("Fabric_Composition_Normalized", FieldKind::Text),
        FieldDef::new("Dimension_Info", FieldKind::Text),
        FieldDef::new("Quantity", FieldKind::Number),
        FieldDef::new("UnitPrice_Currency", FieldKind::Number),
        FieldDef::new("Month", FieldKind::Date),
    ];
    let hierarchy = Hierarchy::new(
        "fabric_export",
        vec![
            DrillLevel::new("brand", 0),
            DrillLevel::new("buyer", 1),
            DrillLevel::new("fabric_type", 2),
            DrillLevel::new("material", 3),
        ],
        TrendLevel::new("monthly_trends", 7, 6),
        5,
    );
    DatasetSchema {
        name: "fabric_export".to_string(),
        fields,
        hierarchy,
    }
}

/// Clothing import dataset
/// (`clothing_data_gain_lucky_2023_import_top20.json`):
/// brand → supplier → fabric type → product → material percent, monthly
/// unit-price trend over the trade date, quantities as the metric.
pub fn clothing_import() -> DatasetSchema {
    let fields = vec![
        FieldDef::new("brands", FieldKind::Text),
        FieldDef::new("supplier", FieldKind::Text),
        FieldDef::new("label_fabric", FieldKind::Text),
        FieldDef::new("fabricTypes", FieldKind::Text),
        FieldDef::new("percent_material", FieldKind::Text),
        FieldDef::new("quantity", FieldKind::Number),
        FieldDef::new("unitPrice_currency", FieldKind::Number),
        FieldDef::new("TradeDate", FieldKind::Date),
    ];
    let hierarchy = Hierarchy::new(
        "clothing_import",
        vec![
            DrillLevel::new("brand", 0),
            DrillLevel::new("supplier", 1),
            DrillLevel::new("fabric_type", 2),
            DrillLevel::new("product", 3),
            DrillLevel::new("percent_material", 4),
        ],
        TrendLevel::new("monthly_trends", 7, 6),
        5,
    );
    DatasetSchema {
        name: "clothing_import".to_string(),
        fields,
        hierarchy,
    }
}
