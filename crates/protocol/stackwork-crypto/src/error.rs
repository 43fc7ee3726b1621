//! Error types for stackwork-crypto

use thiserror::Error;

/// Errors that can occur in cryptographic operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid hex encoding
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Invalid signature length
    #[error("Invalid signature length: expected 64, got {0}")]
    InvalidSignatureLength(usize),

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,
}
