//! Structured error types for the ledger CLI

use thiserror::Error;

use lib_tokens::TokenError;
use lib_types::ConfigError;

#[derive(Error, Debug)]
pub enum CliError {
    // Input parsing
    #[error("Invalid token kind '{0}': expected a kind name or tag number")]
    InvalidKind(String),

    #[error("Invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("Balance period {period} is not a window start (nearest start is {nearest})")]
    NotPeriodStart { period: u64, nearest: u64 },

    #[error("Criteria are only meaningful for PropertyForward ids")]
    UnexpectedCriteria,

    #[error("Failed to read criteria from {path}: {reason}")]
    CriteriaLoadFailed { path: String, reason: String },

    // Library errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    // I/O operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // Serialization
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
