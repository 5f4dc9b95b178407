//! FILENAME: core/drill-engine/src/cache.rs
//! Dataset cache - interned storage for a flat record set.
//!
//! The cache is built once per dataset and never mutated afterwards. Each
//! unique field value is stored once and referenced by index, so records are
//! small vectors of `ValueId`s and equality filtering is an integer compare.
//!
//! Interning also fixes the category order: the first record that mentions a
//! value assigns its id, and breakdowns iterate ids in first-seen order.

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::definition::FieldIndex;

/// A reference to an interned value within a field's unique value store.
pub type ValueId = u32;

/// Represents a missing value in the cache.
pub const VALUE_ID_EMPTY: ValueId = u32::MAX;

/// A normalized, hashable representation of a record field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheValue {
    Empty,
    Number(OrderedFloat),
    Text(String),
    Date(NaiveDate),
}

impl CacheValue {
    pub fn number(n: f64) -> Self {
        CacheValue::Number(OrderedFloat(n))
    }

    pub fn text(s: impl Into<String>) -> Self {
        CacheValue::Text(s.into())
    }

    /// Numeric view of the value, `None` for anything that is not a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CacheValue::Number(n) => Some(n.0),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CacheValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Display label used for breakdown slices and breadcrumbs.
    pub fn display(&self) -> String {
        match self {
            CacheValue::Empty => String::new(),
            CacheValue::Number(n) => {
                if n.0.fract() == 0.0 && n.0.abs() < 1e15 {
                    format!("{:.0}", n.0)
                } else {
                    format!("{}", n.0)
                }
            }
            CacheValue::Text(s) => s.clone(),
            CacheValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Wrapper around f64 that implements Eq and Hash for use as a map key.
/// NaN values are treated as equal to each other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            true
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            u64::MAX.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

// ============================================================================
// FIELD CACHE
// ============================================================================

/// Unique value store for a single field (column) of the dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldCache {
    /// Display name of the field.
    pub name: String,

    /// Map from value to its unique id (for deduplication during build).
    value_to_id: FxHashMap<CacheValue, ValueId>,

    /// Unique values in first-seen order, indexed by ValueId.
    id_to_value: Vec<CacheValue>,
}

impl FieldCache {
    pub fn new(name: impl Into<String>) -> Self {
        FieldCache {
            name: name.into(),
            value_to_id: FxHashMap::default(),
            id_to_value: Vec::new(),
        }
    }

    /// Interns a value and returns its ValueId.
    /// If the value already exists, returns the existing id.
    pub fn intern(&mut self, value: CacheValue) -> ValueId {
        if let CacheValue::Empty = value {
            return VALUE_ID_EMPTY;
        }

        if let Some(&id) = self.value_to_id.get(&value) {
            return id;
        }

        let id = self.id_to_value.len() as ValueId;
        self.id_to_value.push(value.clone());
        self.value_to_id.insert(value, id);
        id
    }

    /// Looks up the id of an already interned value without interning it.
    pub fn lookup(&self, value: &CacheValue) -> Option<ValueId> {
        if let CacheValue::Empty = value {
            return Some(VALUE_ID_EMPTY);
        }
        self.value_to_id.get(value).copied()
    }

    pub fn get_value(&self, id: ValueId) -> Option<&CacheValue> {
        if id == VALUE_ID_EMPTY {
            return Some(&CacheValue::Empty);
        }
        self.id_to_value.get(id as usize)
    }

    /// Returns the number of unique values (excluding empty).
    pub fn unique_count(&self) -> usize {
        self.id_to_value.len()
    }
}

// ============================================================================
// RECORDS
// ============================================================================

/// A single transaction line, stored as interned value ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataRecord {
    /// Index of the record in the source document (0-based).
    pub source_index: u32,

    /// ValueIds for each field, indexed by FieldIndex.
    pub values: SmallVec<[ValueId; 8]>,
}

impl DataRecord {
    /// ValueId of the record at `field`, empty when out of range.
    pub fn value_at(&self, field: FieldIndex) -> ValueId {
        self.values.get(field).copied().unwrap_or(VALUE_ID_EMPTY)
    }
}

/// The full record set for one dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetCache {
    /// Value store for each field, indexed by FieldIndex.
    pub fields: Vec<FieldCache>,

    /// All records, stored as interned value ids.
    pub records: Vec<DataRecord>,
}

impl DatasetCache {
    /// Creates an empty cache with named fields.
    pub fn new(field_names: &[&str]) -> Self {
        DatasetCache {
            fields: field_names.iter().map(|n| FieldCache::new(*n)).collect(),
            records: Vec::new(),
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Adds a record, interning each value into its field cache.
    /// Short rows are padded with empty; extra values are dropped.
    pub fn add_record(&mut self, values: &[CacheValue]) {
        let source_index = self.records.len() as u32;
        let mut interned: SmallVec<[ValueId; 8]> = SmallVec::with_capacity(self.fields.len());

        for (i, value) in values.iter().enumerate() {
            if i < self.fields.len() {
                interned.push(self.fields[i].intern(value.clone()));
            }
        }
        while interned.len() < self.fields.len() {
            interned.push(VALUE_ID_EMPTY);
        }

        self.records.push(DataRecord {
            source_index,
            values: interned,
        });
    }

    /// Resolves a field name to its index.
    pub fn field_index(&self, name: &str) -> Option<FieldIndex> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Dereferences a record's value at `field`.
    pub fn value_of(&self, record: &DataRecord, field: FieldIndex) -> &CacheValue {
        self.fields
            .get(field)
            .and_then(|f| f.get_value(record.value_at(field)))
            .unwrap_or(&CacheValue::Empty)
    }

    /// Returns an iterator over records matching every `(field, value)`
    /// constraint. Equality only, no partial matches.
    pub fn matching_records<'a>(
        &'a self,
        constraints: &'a [(FieldIndex, ValueId)],
    ) -> impl Iterator<Item = &'a DataRecord> {
        self.records.iter().filter(move |record| {
            constraints
                .iter()
                .all(|&(field, value)| record.value_at(field) == value)
        })
    }
}
