//! Error types for the medtrack_core library.

use std::io;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for medtrack_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A referenced record does not exist in the store
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: Uuid },

    /// A malformed definition reached an operation that requires valid input
    #[error("Validation error: {0}")]
    Validation(String),

    /// The record store failed to read or write
    #[error("Store error: {0}")]
    Store(String),
}

impl Error {
    /// NotFound for a medication identity
    pub fn medication_not_found(id: Uuid) -> Self {
        Error::NotFound {
            what: "medication",
            id,
        }
    }

    /// NotFound for an occurrence identity
    pub fn occurrence_not_found(id: Uuid) -> Self {
        Error::NotFound {
            what: "occurrence",
            id,
        }
    }
}
