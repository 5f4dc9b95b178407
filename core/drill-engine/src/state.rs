//! FILENAME: core/drill-engine/src/state.rs
//! Selection state and navigation transitions.
//!
//! The state is an immutable value: every navigation is a pure transition
//! `(state, action) -> Result<state, error>` that either produces a new
//! state or leaves the caller's state untouched. The path is the single
//! source of truth; the breadcrumb is a projection of it.

use serde::{Deserialize, Serialize};

use crate::cache::{DatasetCache, ValueId};
use crate::definition::Hierarchy;
use crate::engine::{category_groups, group_label, path_constraints};
use crate::error::DrillError;
use crate::view::BreadcrumbItem;

/// One selection in the drill-down path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathEntry {
    /// The level index the choice was made at.
    pub level: usize,

    /// Interned id of the chosen category value.
    pub value: ValueId,

    /// Display label of the chosen category, for breadcrumbs.
    pub label: String,
}

/// Where the user currently is in the hierarchy.
///
/// Invariant: `path[i].level == i` and `path.len() == level`, so the path
/// only ever constrains levels before the current one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillState {
    /// Index of the current level (`levels.len()` means the trend level).
    pub level: usize,

    /// Selections made so far, ordered from root to deepest.
    pub path: Vec<PathEntry>,
}

impl DrillState {
    /// The initial state: root level, empty path.
    pub fn root() -> Self {
        DrillState {
            level: 0,
            path: Vec::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Breadcrumb projection of the path, for navigation UI.
    pub fn breadcrumb(&self, hierarchy: &Hierarchy) -> Vec<BreadcrumbItem> {
        self.path
            .iter()
            .map(|entry| BreadcrumbItem {
                level: hierarchy.level_name(entry.level).to_string(),
                label: entry.label.clone(),
            })
            .collect()
    }
}

impl Default for DrillState {
    fn default() -> Self {
        Self::root()
    }
}

/// A navigation request against the current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrillAction {
    /// Drill into the named category of the current breakdown.
    Select(String),

    /// Jump back to a breadcrumb entry: keep the first `depth + 1`
    /// selections and land on the level after them (`-1` means root).
    NavigateTo(isize),

    /// Return to the root level with an empty path.
    Reset,
}

/// Applies a navigation action, returning the successor state.
///
/// `Select` is validated against the current breakdown: a label that is not
/// one of its categories is rejected with `InvalidSelection` instead of
/// silently producing an empty aggregation. `NavigateTo` rejects depths
/// outside `-1..path.len()` with `InvalidDepth`.
pub fn apply(
    hierarchy: &Hierarchy,
    cache: &DatasetCache,
    state: &DrillState,
    action: DrillAction,
) -> Result<DrillState, DrillError> {
    match action {
        DrillAction::Select(label) => {
            if hierarchy.is_trend_level(state.level) {
                return Err(DrillError::InvalidSelection {
                    label,
                    level: hierarchy.level_name(state.level).to_string(),
                });
            }

            let group_field = hierarchy.levels[state.level].field;
            let constraints = path_constraints(hierarchy, state);
            let groups = category_groups(cache, &constraints, group_field, hierarchy.metric_field);

            let chosen = groups
                .iter()
                .map(|(id, _)| *id)
                .find(|&id| group_label(cache, group_field, id) == label);

            match chosen {
                Some(value) => {
                    let mut path = state.path.clone();
                    path.push(PathEntry {
                        level: state.level,
                        value,
                        label,
                    });
                    Ok(DrillState {
                        level: state.level + 1,
                        path,
                    })
                }
                None => Err(DrillError::InvalidSelection {
                    label,
                    level: hierarchy.level_name(state.level).to_string(),
                }),
            }
        }

        DrillAction::NavigateTo(depth) => {
            if depth < -1 || depth >= state.path.len() as isize {
                return Err(DrillError::InvalidDepth {
                    depth,
                    len: state.path.len(),
                });
            }

            let keep = (depth + 1) as usize;
            let mut path = state.path.clone();
            path.truncate(keep);
            Ok(DrillState { level: keep, path })
        }

        DrillAction::Reset => Ok(DrillState::root()),
    }
}
