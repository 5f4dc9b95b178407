//! FILENAME: core/trade-data/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TradeDataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a top-level JSON array of records")]
    NotAnArray,
}
