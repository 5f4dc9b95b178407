//! FILENAME: core/drill-engine/src/definition.rs
//! Hierarchy definition - the serializable configuration of a drill-down.
//!
//! These types DESCRIBE a drill-down: the ordered category levels, the
//! terminal trend level, and the metric that category breakdowns aggregate.
//! They are immutable snapshots of dataset intent, designed to be
//! serializable alongside the dataset schema.

use serde::{Deserialize, Serialize};

/// Index into the dataset's fields (0-based).
pub type FieldIndex = usize;

/// Supported aggregation functions for the category metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Aggregation {
    #[default]
    Sum,
    Count,
    Average,
    Min,
    Max,
}

/// One categorical step in the drill-down hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrillLevel {
    /// Level name used in breadcrumbs (e.g. "brand", "supplier").
    pub name: String,

    /// The dataset field this level groups by.
    pub field: FieldIndex,
}

impl DrillLevel {
    pub fn new(name: impl Into<String>, field: FieldIndex) -> Self {
        DrillLevel {
            name: name.into(),
            field,
        }
    }
}

/// The terminal level: a monthly time-series instead of a category breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendLevel {
    /// Level name used in breadcrumbs (e.g. "monthly_trends").
    pub name: String,

    /// Field holding the trade date records are bucketed by.
    pub date_field: FieldIndex,

    /// Numeric field averaged per calendar month (e.g. unit price).
    pub value_field: FieldIndex,
}

impl TrendLevel {
    pub fn new(name: impl Into<String>, date_field: FieldIndex, value_field: FieldIndex) -> Self {
        TrendLevel {
            name: name.into(),
            date_field,
            value_field,
        }
    }
}

/// The complete definition of one dataset's drill-down.
///
/// Levels are ordered from outer to inner; the trend level always comes
/// last. Exactly one level is "current" at any time (see `DrillState`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hierarchy {
    /// User-friendly name for this hierarchy.
    pub name: String,

    /// Category levels, ordered from root to deepest.
    pub levels: Vec<DrillLevel>,

    /// The terminal trend level.
    pub trend: TrendLevel,

    /// Numeric field aggregated at category levels (e.g. quantity).
    pub metric_field: FieldIndex,

    /// How the metric is aggregated per category.
    pub metric_aggregation: Aggregation,
}

impl Hierarchy {
    pub fn new(
        name: impl Into<String>,
        levels: Vec<DrillLevel>,
        trend: TrendLevel,
        metric_field: FieldIndex,
    ) -> Self {
        Hierarchy {
            name: name.into(),
            levels,
            trend,
            metric_field,
            metric_aggregation: Aggregation::Sum,
        }
    }

    /// Total number of levels, trend included.
    pub fn depth(&self) -> usize {
        self.levels.len() + 1
    }

    /// Whether `level` is the terminal trend level.
    pub fn is_trend_level(&self, level: usize) -> bool {
        level >= self.levels.len()
    }

    /// Breadcrumb name of a level index.
    pub fn level_name(&self, level: usize) -> &str {
        if self.is_trend_level(level) {
            &self.trend.name
        } else {
            &self.levels[level].name
        }
    }
}
