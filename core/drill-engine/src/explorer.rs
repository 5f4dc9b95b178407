//! FILENAME: core/drill-engine/src/explorer.rs
//! Convenience facade over `(hierarchy, cache, state)`.
//!
//! One explorer per dataset view: it owns the record set and the current
//! selection state exclusively; nothing is shared between views. Views are
//! computed on demand and never stored.

use crate::cache::DatasetCache;
use crate::definition::{FieldIndex, Hierarchy};
use crate::engine;
use crate::error::DrillError;
use crate::state::{apply, DrillAction, DrillState};
use crate::view::{BreadcrumbItem, CategorySlice, DrillView};

pub struct DrillExplorer {
    hierarchy: Hierarchy,
    cache: DatasetCache,
    state: DrillState,
}

impl DrillExplorer {
    pub fn new(hierarchy: Hierarchy, cache: DatasetCache) -> Self {
        DrillExplorer {
            hierarchy,
            cache,
            state: DrillState::root(),
        }
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    pub fn state(&self) -> &DrillState {
        &self.state
    }

    /// Replaces the record set, e.g. after a re-fetch. The selection is
    /// reset since interned ids are only valid for the cache that made them.
    pub fn replace_cache(&mut self, cache: DatasetCache) {
        self.cache = cache;
        self.state = DrillState::root();
    }

    /// Drills into a category of the current breakdown.
    pub fn select(&mut self, label: &str) -> Result<(), DrillError> {
        self.state = apply(
            &self.hierarchy,
            &self.cache,
            &self.state,
            DrillAction::Select(label.to_string()),
        )?;
        Ok(())
    }

    /// Jumps back to a breadcrumb entry (`-1` for root).
    pub fn navigate_to(&mut self, depth: isize) -> Result<(), DrillError> {
        self.state = apply(
            &self.hierarchy,
            &self.cache,
            &self.state,
            DrillAction::NavigateTo(depth),
        )?;
        Ok(())
    }

    /// Returns to the root level.
    pub fn reset(&mut self) {
        self.state = DrillState::root();
    }

    /// The chart-ready view for the current level.
    pub fn view(&self) -> DrillView {
        engine::compute(&self.hierarchy, &self.cache, &self.state)
    }

    /// Top `limit` breakdown of `field` under the current path.
    pub fn top_breakdown(&self, field: FieldIndex, limit: usize) -> Vec<CategorySlice> {
        engine::compute_top(&self.hierarchy, &self.cache, &self.state, field, limit)
    }

    pub fn breadcrumb(&self) -> Vec<BreadcrumbItem> {
        self.state.breadcrumb(&self.hierarchy)
    }

    pub fn level_name(&self) -> &str {
        self.hierarchy.level_name(self.state.level)
    }

    pub fn at_trend_level(&self) -> bool {
        self.hierarchy.is_trend_level(self.state.level)
    }
}
