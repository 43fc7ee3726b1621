//! Payment verification.
//!
//! [`verify_payment`] is a pure function of the payload, the requirement and
//! the current time. Checks run in a fixed order and the first failure wins,
//! so a payload that is wrong in several ways always reports the same reason:
//!
//! 1. scheme
//! 2. network
//! 3. chain id
//! 4. recipient (exact, case-sensitive)
//! 5. asset
//! 6. amount (arbitrary precision, overpayment accepted)
//! 7. expiry
//! 8. signature (only when enabled on the [`PaymentVerifier`])

use stackwork_crypto::{PublicKey, Signature};
use thiserror::Error;
use tracing::debug;

use crate::codec::parse_minor;
use crate::types::{PaymentDetails, PaymentPayload, PaymentRequirement, VerificationResult};

/// First check a payload failed.
///
/// The `Display` form is the reason string reported to payers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyFailure {
    #[error("Scheme mismatch")]
    SchemeMismatch,

    #[error("Network mismatch")]
    NetworkMismatch,

    #[error("Chain ID mismatch")]
    ChainIdMismatch,

    #[error("Recipient mismatch")]
    RecipientMismatch,

    #[error("Asset mismatch")]
    AssetMismatch,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient amount: got {got}, need {need}")]
    InsufficientAmount { got: String, need: String },

    #[error("Payment expired")]
    Expired,

    #[error("Invalid signature")]
    InvalidSignature,
}

/// Check `payload` against `requirement` at time `now_ms`.
pub fn verify_payment(
    payload: &PaymentPayload,
    requirement: &PaymentRequirement,
    now_ms: u64,
) -> Result<PaymentDetails, VerifyFailure> {
    if payload.scheme != requirement.scheme {
        return Err(VerifyFailure::SchemeMismatch);
    }
    if payload.network != requirement.network {
        return Err(VerifyFailure::NetworkMismatch);
    }
    if payload.chain_id != requirement.chain_id {
        return Err(VerifyFailure::ChainIdMismatch);
    }
    if payload.recipient_address != requirement.recipient_address {
        return Err(VerifyFailure::RecipientMismatch);
    }
    if payload.asset != requirement.asset {
        return Err(VerifyFailure::AssetMismatch);
    }

    let got = parse_minor(&payload.amount)
        .ok_or_else(|| VerifyFailure::InvalidAmount(payload.amount.clone()))?;
    let need = parse_minor(&requirement.amount)
        .ok_or_else(|| VerifyFailure::InvalidAmount(requirement.amount.clone()))?;
    if got < need {
        return Err(VerifyFailure::InsufficientAmount {
            got: payload.amount.clone(),
            need: requirement.amount.clone(),
        });
    }

    if let Some(expires_at) = payload.expires_at {
        if expires_at < now_ms {
            return Err(VerifyFailure::Expired);
        }
    }

    Ok(PaymentDetails {
        amount: payload.amount.clone(),
        recipient: payload.recipient_address.clone(),
        nonce: payload.nonce,
    })
}

/// Whether the payload's signature was produced by its `publicKey`.
pub fn verify_signature(payload: &PaymentPayload) -> bool {
    let Ok(public_key) = PublicKey::from_hex(&payload.public_key) else {
        return false;
    };
    let Ok(signature) = Signature::from_hex(&payload.signature) else {
        return false;
    };
    stackwork_crypto::verify(&public_key, &payload.signing_message(), &signature)
}

/// Stateless verifier shared by the payment gate.
///
/// Safe to call concurrently; it holds only configuration.
#[derive(Debug, Clone, Default)]
pub struct PaymentVerifier {
    check_signature: bool,
}

impl PaymentVerifier {
    /// A verifier running the field, amount and expiry checks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also require a valid Ed25519 signature from the payload's public key.
    pub fn with_signature_check(mut self) -> Self {
        self.check_signature = true;
        self
    }

    pub fn checks_signature(&self) -> bool {
        self.check_signature
    }

    /// Verify at an explicit time.
    pub fn verify_at(
        &self,
        payload: &PaymentPayload,
        requirement: &PaymentRequirement,
        now_ms: u64,
    ) -> Result<PaymentDetails, VerifyFailure> {
        let details = verify_payment(payload, requirement, now_ms)?;
        if self.check_signature && !verify_signature(payload) {
            return Err(VerifyFailure::InvalidSignature);
        }
        Ok(details)
    }

    /// Verify against the current wall clock.
    ///
    /// Async so that on-chain balance checks can slot in without changing
    /// callers; today it never suspends.
    pub async fn verify(
        &self,
        payload: &PaymentPayload,
        requirement: &PaymentRequirement,
    ) -> VerificationResult {
        match self.verify_at(payload, requirement, stackwork_crypto::current_timestamp()) {
            Ok(details) => VerificationResult::accepted(details),
            Err(failure) => {
                debug!(reason = %failure, nonce = payload.nonce, "Payment rejected by verifier");
                VerificationResult::rejected(failure.to_string())
            }
        }
    }
}
