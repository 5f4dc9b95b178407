//! FILENAME: core/drill-engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrillError {
    #[error("'{label}' is not a category in the current '{level}' breakdown")]
    InvalidSelection { label: String, level: String },

    #[error("breadcrumb depth {depth} out of range (path has {len} entries)")]
    InvalidDepth { depth: isize, len: usize },
}
