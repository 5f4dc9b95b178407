//! FILENAME: core/trade-data/src/lib.rs
//! Textile trade datasets for the drill-down explorer.
//!
//! This crate knows what the pre-computed JSON documents look like and how
//! to turn them into `drill-engine` caches. It depends on `drill-engine`
//! only for shared types (CacheValue, DatasetCache, Hierarchy).
//!
//! Layers:
//! - `schema`: Field layout and hierarchy of each shipped dataset
//! - `loader`: JSON parsing into a `DatasetCache`

pub mod error;
pub mod loader;
pub mod schema;

pub use error::TradeDataError;
pub use loader::{load_dataset, load_or_empty, parse_records};
pub use schema::{clothing_import, fabric_export, DatasetSchema, FieldDef, FieldKind};
