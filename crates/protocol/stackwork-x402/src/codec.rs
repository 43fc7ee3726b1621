//! Header codec and micro-STX amount conversion.
//!
//! Payment headers are base64 (standard alphabet) of the JSON encoding of a
//! [`PaymentPayload`] or [`PaymentRequirement`]. Decoding never panics; every
//! malformed input maps to a [`DecodeError`] variant so callers can tell
//! garbage apart from a payment that was merely insufficient.

use base64::{engine::general_purpose::STANDARD, Engine};
use num_bigint::BigUint;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::error::Category;
use thiserror::Error;

use crate::error::{X402Error, X402Result};
use crate::types::{PaymentPayload, PaymentRequirement};

/// Micro-STX per STX.
const MICRO_PER_STX: u32 = 1_000_000;

/// Why a header could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input is not valid base64.
    #[error("invalid base64: {0}")]
    InvalidBase64(String),

    /// Decoded bytes are not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// JSON is well formed but does not match the expected schema.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

/// Encode a value as a header-safe string.
pub fn encode<T: Serialize>(value: &T) -> X402Result<String> {
    let json = serde_json::to_vec(value)
        .map_err(|e| X402Error::Internal(format!("failed to serialize header: {}", e)))?;
    Ok(STANDARD.encode(json))
}

/// Decode a header string into `T`.
pub fn decode<T: DeserializeOwned>(header: &str) -> Result<T, DecodeError> {
    let bytes = STANDARD
        .decode(header.trim())
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| match e.classify() {
        Category::Data => DecodeError::InvalidSchema(e.to_string()),
        Category::Syntax | Category::Eof | Category::Io => DecodeError::InvalidJson(e.to_string()),
    })
}

/// Decode and schema-check an `X-PAYMENT` header.
pub fn decode_payload(header: &str) -> Result<PaymentPayload, DecodeError> {
    let payload: PaymentPayload = decode(header)?;
    require_non_empty("scheme", &payload.scheme)?;
    require_non_empty("network", &payload.network)?;
    require_non_empty("recipientAddress", &payload.recipient_address)?;
    require_non_empty("asset", &payload.asset)?;
    require_non_empty("signature", &payload.signature)?;
    require_non_empty("publicKey", &payload.public_key)?;
    require_digits("amount", &payload.amount)?;
    Ok(payload)
}

/// Decode and schema-check an `X-PAYMENT-REQUIRED` header.
pub fn decode_requirement(header: &str) -> Result<PaymentRequirement, DecodeError> {
    let requirement: PaymentRequirement = decode(header)?;
    require_non_empty("scheme", &requirement.scheme)?;
    require_non_empty("network", &requirement.network)?;
    require_non_empty("recipientAddress", &requirement.recipient_address)?;
    require_non_empty("asset", &requirement.asset)?;
    require_digits("amount", &requirement.amount)?;
    Ok(requirement)
}

fn require_non_empty(field: &str, value: &str) -> Result<(), DecodeError> {
    if value.is_empty() {
        return Err(DecodeError::InvalidSchema(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn require_digits(field: &str, value: &str) -> Result<(), DecodeError> {
    if parse_minor(value).is_none() {
        return Err(DecodeError::InvalidSchema(format!(
            "{} must be a non-negative integer string, got {:?}",
            field, value
        )));
    }
    Ok(())
}

// =============================================================================
// Amounts
// =============================================================================

/// Parse a micro-STX integer string with arbitrary precision.
///
/// Returns `None` for empty strings, signs, whitespace and anything that is
/// not plain ASCII digits.
pub fn parse_minor(value: &str) -> Option<BigUint> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(value.as_bytes(), 10)
}

/// Convert a decimal STX amount into a micro-STX integer string.
///
/// Digits past the sixth fraction digit round half-up.
///
/// ```
/// use stackwork_x402::codec::to_minor_units;
///
/// assert_eq!(to_minor_units("0.020").unwrap(), "20000");
/// assert_eq!(to_minor_units("0").unwrap(), "0");
/// ```
pub fn to_minor_units(major: &str) -> X402Result<String> {
    let parts = stackwork_types::parse_decimal_parts(major).map_err(|_| X402Error::InvalidAmount {
        value: major.to_string(),
    })?;

    let invalid = || X402Error::InvalidAmount {
        value: major.to_string(),
    };
    let whole = BigUint::parse_bytes(parts.whole.as_bytes(), 10).ok_or_else(invalid)?;
    let fraction = BigUint::parse_bytes(parts.fraction.as_bytes(), 10).ok_or_else(invalid)?;

    let mut minor = whole * MICRO_PER_STX + fraction;
    if parts.round_up {
        minor += 1u32;
    }
    Ok(minor.to_string())
}

/// Convert a micro-STX integer string into STX with exactly six fraction digits.
///
/// ```
/// use stackwork_x402::codec::to_major_units;
///
/// assert_eq!(to_major_units("200").unwrap(), "0.000200");
/// ```
pub fn to_major_units(minor: &str) -> X402Result<String> {
    let value = parse_minor(minor).ok_or_else(|| X402Error::InvalidAmount {
        value: minor.to_string(),
    })?;

    let divisor = BigUint::from(MICRO_PER_STX);
    let whole = &value / &divisor;
    let fraction = (&value % &divisor).to_string();

    Ok(format!("{}.{:0>6}", whole, fraction))
}
