//! FILENAME: core/drill-engine/src/lib.rs
//! Drill-down aggregation engine for the trade data explorer.
//!
//! This crate implements the one algorithmic kernel the explorer repeats for
//! every dataset: maintain a hierarchical selection path over categorical
//! dimensions, filter a flat record set by that path, and aggregate the
//! filtered subset into chart-ready series.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the hierarchy IS)
//! - `cache`: Interned record storage (HOW we store and filter)
//! - `state`: Selection path and pure navigation transitions (WHERE we are)
//! - `engine`: Aggregation (HOW we calculate)
//! - `view`: Chart-ready output for the frontend (WHAT we display)
//! - `explorer`: Convenience facade tying the layers together

pub mod cache;
pub mod definition;
pub mod engine;
pub mod error;
pub mod explorer;
pub mod state;
pub mod view;

pub use cache::*;
pub use definition::*;
pub use engine::{compute, compute_top};
pub use error::DrillError;
pub use explorer::DrillExplorer;
pub use state::{apply, DrillAction, DrillState, PathEntry};
pub use view::*;
