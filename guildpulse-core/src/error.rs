//! Error types for guildpulse-core

use thiserror::Error;

use crate::types::AggregateFamily;

/// Main error type for the guildpulse-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Lookback window was zero or negative
    #[error("invalid window: {0} days (must be > 0)")]
    InvalidWindow(i64),

    /// A required aggregate family could not be read
    #[error("aggregate store unavailable while reading {family}: {source}")]
    StoreUnavailable {
        family: AggregateFamily,
        #[source]
        source: rusqlite::Error,
    },

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap a store error as an unavailable read of `family`.
    pub fn store(family: AggregateFamily, source: rusqlite::Error) -> Self {
        Error::StoreUnavailable { family, source }
    }
}

/// Result type alias for guildpulse-core
pub type Result<T> = std::result::Result<T, Error>;
