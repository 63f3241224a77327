//! Error types for slot-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid business hours: {0}")]
    InvalidBusinessHours(String),

    #[error("Invalid search parameters: {0}")]
    InvalidSearch(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
