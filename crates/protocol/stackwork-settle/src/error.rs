//! Error types for the settlement module.

use std::time::Duration;

use stackwork_x402::X402Error;
use thiserror::Error;

/// Result type alias for settlement operations.
pub type SettleResult<T> = Result<T, SettleError>;

/// Errors that can occur during payout settlement.
#[derive(Debug, Error)]
pub enum SettleError {
    /// The payout itself is malformed (zero amount, bad address).
    #[error("invalid payout: {0}")]
    InvalidPayout(String),

    /// The settlement backend reported itself unhealthy.
    #[error("settlement backend unavailable: {0}")]
    Unavailable(String),

    /// The transfer was rejected or failed on-chain.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network error (retryable).
    #[error("network error: {0}")]
    Network(String),

    /// Timeout error (retryable).
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// Internal error (lock poisoning, unexpected state).
    #[error("internal error: {0}")]
    Internal(String),
}

impl SettleError {
    pub fn invalid_payout(msg: impl Into<String>) -> Self {
        Self::InvalidPayout(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn transaction_failed(reason: impl Into<String>) -> Self {
        Self::TransactionFailed(reason.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Build a timeout error for an operation that exceeded `limit`.
    pub fn elapsed(operation: &str, limit: Duration) -> Self {
        Self::Timeout(format!("{} exceeded {:?}", operation, limit))
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}

impl From<X402Error> for SettleError {
    fn from(e: X402Error) -> Self {
        match e {
            X402Error::Timeout(limit) => Self::elapsed("facilitator call", limit),
            X402Error::FacilitatorNetwork(msg) | X402Error::Transport(msg) => Self::Network(msg),
            X402Error::SettlementFailed { reason } => Self::TransactionFailed(reason),
            X402Error::InvalidKey(msg) => Self::Config(format!("signing key: {}", msg)),
            other => Self::Internal(other.to_string()),
        }
    }
}
