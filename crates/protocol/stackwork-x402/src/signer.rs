//! Payer-side payload construction and signing.

use stackwork_crypto::{current_timestamp, public_key_from_private, random_nonce, PrivateKey, PublicKey};

use crate::error::X402Result;
use crate::types::{PaymentPayload, PaymentRequirement, DEFAULT_PAYMENT_TTL_MS};

/// Builds signed payloads that satisfy a requirement exactly.
#[derive(Clone)]
pub struct PaymentSigner {
    private_key: PrivateKey,
    public_key: PublicKey,
    ttl_ms: Option<u64>,
}

impl PaymentSigner {
    /// Create a signer with the default five minute validity window.
    pub fn new(private_key: PrivateKey) -> Self {
        let public_key = public_key_from_private(&private_key);
        Self {
            private_key,
            public_key,
            ttl_ms: Some(DEFAULT_PAYMENT_TTL_MS),
        }
    }

    /// Create a signer from a hex-encoded private key.
    pub fn from_hex(private_key_hex: &str) -> X402Result<Self> {
        Ok(Self::new(PrivateKey::from_hex(private_key_hex)?))
    }

    /// Override the validity window. `None` produces payloads without expiry.
    pub fn with_ttl(mut self, ttl_ms: Option<u64>) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Sign a payment for `requirement` with a fresh nonce at the current time.
    pub fn sign(&self, requirement: &PaymentRequirement) -> PaymentPayload {
        self.sign_with(requirement, random_nonce(), current_timestamp())
    }

    /// Sign a payment with an explicit nonce and clock.
    pub fn sign_with(&self, requirement: &PaymentRequirement, nonce: u64, now_ms: u64) -> PaymentPayload {
        let mut payload = PaymentPayload {
            scheme: requirement.scheme.clone(),
            network: requirement.network.clone(),
            chain_id: requirement.chain_id,
            recipient_address: requirement.recipient_address.clone(),
            asset: requirement.asset.clone(),
            amount: requirement.amount.clone(),
            nonce,
            signature: String::new(),
            public_key: self.public_key.to_hex(),
            expires_at: self.ttl_ms.map(|ttl| now_ms.saturating_add(ttl)),
        };
        let signature = stackwork_crypto::sign(&self.private_key, &payload.signing_message());
        payload.signature = signature.to_hex();
        payload
    }
}

impl std::fmt::Debug for PaymentSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentSigner")
            .field("public_key", &self.public_key)
            .field("ttl_ms", &self.ttl_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::verify_signature;
    use stackwork_crypto::generate_identity;
    use stackwork_types::StacksNetwork;

    fn requirement() -> PaymentRequirement {
        PaymentRequirement::stx(
            StacksNetwork::Testnet,
            "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM",
            "20000",
        )
    }

    #[test]
    fn test_payload_mirrors_requirement() {
        let (private_key, public_key) = generate_identity();
        let signer = PaymentSigner::new(private_key);
        let payload = signer.sign_with(&requirement(), 5, 1_000);

        assert_eq!(payload.amount, "20000");
        assert_eq!(payload.chain_id, 2_147_483_648);
        assert_eq!(payload.public_key, public_key.to_hex());
        assert_eq!(payload.expires_at, Some(1_000 + DEFAULT_PAYMENT_TTL_MS));
        assert!(verify_signature(&payload));
    }

    #[test]
    fn test_no_expiry() {
        let (private_key, _) = generate_identity();
        let signer = PaymentSigner::new(private_key).with_ttl(None);
        let payload = signer.sign(&requirement());
        assert!(payload.expires_at.is_none());
        assert!(verify_signature(&payload));
    }

    #[test]
    fn test_from_hex_rejects_bad_key() {
        assert!(PaymentSigner::from_hex("not-hex").is_err());
    }

    #[test]
    fn test_debug_hides_private_key() {
        let (private_key, _) = generate_identity();
        let hex_key = private_key.to_hex();
        let signer = PaymentSigner::new(private_key);
        assert!(!format!("{:?}", signer).contains(&hex_key));
    }
}
