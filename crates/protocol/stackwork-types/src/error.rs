//! Error types for marketplace data parsing.

use thiserror::Error;

/// Result type alias for type-level parsing.
pub type Result<T> = std::result::Result<T, TypesError>;

/// Errors raised while parsing or validating marketplace values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TypesError {
    /// Amount string is not a non-negative decimal number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Amount does not fit in 64 bits of micro-STX.
    #[error("amount out of range: {0}")]
    AmountOverflow(String),

    /// Stacks address failed the syntactic check.
    #[error("invalid Stacks address: {0}")]
    InvalidAddress(String),

    /// Unknown task status string.
    #[error("unknown task status: {0}")]
    UnknownStatus(String),

    /// Unknown task category string.
    #[error("unknown task category: {0}")]
    UnknownCategory(String),

    /// Unknown network string.
    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}
