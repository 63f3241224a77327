//! Error types for the scheduling pipeline.

use thiserror::Error;

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors reported by a calendar provider.
///
/// The display form is the provider's message verbatim, so it can be handed
/// back to callers unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider could not be reached or refused to answer.
    #[error("{0}")]
    Unreachable(String),

    /// The provider answered but rejected the operation.
    #[error("{0}")]
    Rejected(String),

    /// The account is unknown to the provider.
    #[error("unknown calendar account: {0}")]
    NotFound(String),
}

/// Errors that can stop the pipeline before it starts.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Engine error: {0}")]
    Engine(#[from] slot_engine::EngineError),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
