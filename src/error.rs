//! Errors raised by the price history store. The scoring engine itself is
//! infallible.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item id is not present in the store.
    #[error("item {0} not found in store")]
    UnknownItem(u32),

    /// Price history key that is not a positive integer id.
    #[error("invalid item id {0:?}")]
    InvalidItemId(String),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
