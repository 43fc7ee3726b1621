//! Error types for the payment protocol.

use thiserror::Error;

use crate::codec::DecodeError;

/// Result type for payment protocol operations.
pub type X402Result<T> = Result<T, X402Error>;

/// Errors that can occur while requesting, verifying or settling payments.
#[derive(Debug, Error)]
pub enum X402Error {
    /// A payment header could not be decoded.
    #[error("malformed payment header: {0}")]
    Decode(#[from] DecodeError),

    /// An amount string is not a non-negative integer / decimal.
    #[error("invalid amount: {value}")]
    InvalidAmount {
        /// The offending input
        value: String,
    },

    /// Payment was decoded but does not satisfy the requirement.
    #[error("payment rejected: {reason}")]
    PaymentRejected {
        /// Verifier reason string
        reason: String,
    },

    /// Nonce has already been used by this payer (replay).
    #[error("nonce already used: {nonce}")]
    NonceReused {
        /// The reused nonce
        nonce: u64,
    },

    /// Signing key material is malformed.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Facilitator reported a failed settlement.
    #[error("settlement failed: {reason}")]
    SettlementFailed {
        /// Reason for failure
        reason: String,
    },

    /// Network/HTTP error communicating with the facilitator.
    #[error("facilitator communication error: {0}")]
    FacilitatorNetwork(String),

    /// Outbound HTTP transport failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Operation exceeded its time budget.
    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Internal error.
    #[error("internal payment error: {0}")]
    Internal(String),
}

impl X402Error {
    /// Returns a user-friendly suggestion for recovering from this error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::Decode(_) => "Send the X-PAYMENT header as base64 of the payment JSON",
            Self::InvalidAmount { .. } => "Amounts are decimal strings of micro-STX",
            Self::PaymentRejected { .. } => "Re-sign the payment against the advertised requirement",
            Self::NonceReused { .. } => "Use a fresh nonce for each payment",
            Self::InvalidKey(_) => "Provide a 64-character hex Ed25519 key",
            Self::SettlementFailed { .. } => "Retry settlement or check facilitator status",
            Self::FacilitatorNetwork(_) => "Check network connectivity to the facilitator",
            Self::Transport(_) => "Check connectivity to the target server",
            Self::Timeout(_) => "Retry later or raise the configured timeout",
            Self::Internal(_) => "This is an internal error; please report it",
        }
    }

    /// Returns true if the operation may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::FacilitatorNetwork(_)
                | Self::SettlementFailed { .. }
                | Self::Transport(_)
                | Self::Timeout(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Decode(_) | Self::InvalidAmount { .. } | Self::InvalidKey(_) => 400,
            Self::PaymentRejected { .. } | Self::NonceReused { .. } => 402,
            Self::SettlementFailed { .. } | Self::FacilitatorNetwork(_) | Self::Transport(_) => {
                502
            }
            Self::Timeout(_) => 504,
            Self::Internal(_) => 500,
        }
    }
}

impl From<reqwest::Error> for X402Error {
    fn from(e: reqwest::Error) -> Self {
        Self::FacilitatorNetwork(e.to_string())
    }
}

impl From<stackwork_crypto::CryptoError> for X402Error {
    fn from(e: stackwork_crypto::CryptoError) -> Self {
        Self::InvalidKey(e.to_string())
    }
}
