//! Error types for occupancy-engine operations.
//!
//! Only configuration and document loading can fail. Malformed activity records
//! are dropped while parsing and never surface here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid calendar: {0}")]
    InvalidCalendar(String),

    #[error("Invalid chart document: {0}")]
    InvalidDocument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
