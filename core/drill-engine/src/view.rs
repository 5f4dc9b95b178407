//! FILENAME: core/drill-engine/src/view.rs
//! Chart-ready output for the presentation layer.
//!
//! The engine produces either a category breakdown (grid buttons / pie
//! slices) or a monthly trend series (line chart with highest/lowest
//! markers). Both are plain value types, serialized as-is to the frontend.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One category in a breakdown: a grid button or pie slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySlice {
    /// Category label (e.g. a brand or material name).
    pub label: String,

    /// Aggregated metric for the category.
    pub value: f64,
}

/// One calendar month in the terminal trend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// First day of the month, used for chronological ordering.
    pub period: NaiveDate,

    /// Axis label, formatted as `YYYY-MM`.
    pub label: String,

    /// Arithmetic mean of the trend value field over the month.
    pub average: f64,

    /// True for every month whose average equals the global maximum.
    pub is_highest: bool,

    /// True for every month whose average equals the global minimum.
    pub is_lowest: bool,
}

impl TrendPoint {
    pub fn new(period: NaiveDate, average: f64) -> Self {
        TrendPoint {
            period,
            label: period.format("%Y-%m").to_string(),
            average,
            is_highest: false,
            is_lowest: false,
        }
    }
}

/// What the current level renders as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrillView {
    /// Category breakdown at a non-terminal level, in first-seen order.
    Categories(Vec<CategorySlice>),

    /// Monthly trend series at the terminal level, chronological.
    Trend(Vec<TrendPoint>),
}

impl DrillView {
    pub fn is_empty(&self) -> bool {
        match self {
            DrillView::Categories(slices) => slices.is_empty(),
            DrillView::Trend(points) => points.is_empty(),
        }
    }

    /// The breakdown slices, empty at the trend level.
    pub fn categories(&self) -> &[CategorySlice] {
        match self {
            DrillView::Categories(slices) => slices,
            DrillView::Trend(_) => &[],
        }
    }

    /// The trend series, empty at category levels.
    pub fn trend(&self) -> &[TrendPoint] {
        match self {
            DrillView::Categories(_) => &[],
            DrillView::Trend(points) => points,
        }
    }
}

/// One entry of the navigation breadcrumb, mirroring the selection path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreadcrumbItem {
    /// Level the choice was made at (e.g. "brand").
    pub level: String,

    /// The chosen category label.
    pub label: String,
}
