//! Error types for the Menagerie crates.

use thiserror::Error;

/// Top-level error type for Menagerie operations.
#[derive(Debug, Error)]
pub enum MenagerieError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be parsed
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// A value was outside its accepted range
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Result type alias for Menagerie operations.
pub type MenagerieResult<T> = Result<T, MenagerieError>;
