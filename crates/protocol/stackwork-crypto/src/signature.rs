//! Signature creation and verification.
//!
//! Signatures are computed over the hash of the message:
//! ```text
//! signature = Ed25519_Sign(private_key, SHA256(message))
//! ```

use ed25519_dalek::{Signature as DalekSignature, Signer, Verifier, VerifyingKey};

use crate::hash::message_hash;
use crate::{PrivateKey, PublicKey, Signature};

/// Sign a message with a private key.
///
/// # Example
/// ```
/// use stackwork_crypto::{generate_identity, sign, verify};
///
/// let (private_key, public_key) = generate_identity();
/// let signature = sign(&private_key, b"Hello, world!");
/// assert!(verify(&public_key, b"Hello, world!", &signature));
/// ```
pub fn sign(private_key: &PrivateKey, message: &[u8]) -> Signature {
    let hash = message_hash(message);
    let signing_key = private_key.to_signing_key();
    let sig: DalekSignature = signing_key.sign(&hash.0);
    Signature(sig.to_bytes())
}

/// Verify a signature against a public key and message.
///
/// Returns `false` for malformed public keys instead of erroring.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    let hash = message_hash(message);

    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };

    let sig = DalekSignature::from_bytes(&signature.0);
    verifying_key.verify(&hash.0, &sig).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::generate_identity;

    #[test]
    fn test_sign_verify() {
        let (private_key, public_key) = generate_identity();
        let signature = sign(&private_key, b"message");
        assert!(verify(&public_key, b"message", &signature));
    }

    #[test]
    fn test_tampered_message_fails() {
        let (private_key, public_key) = generate_identity();
        let signature = sign(&private_key, b"amount=100");
        assert!(!verify(&public_key, b"amount=101", &signature));
    }

    #[test]
    fn test_wrong_key_fails() {
        let (private_key, _) = generate_identity();
        let (_, other_public) = generate_identity();
        let signature = sign(&private_key, b"message");
        assert!(!verify(&other_public, b"message", &signature));
    }

    #[test]
    fn test_deterministic() {
        let (private_key, _) = generate_identity();
        assert_eq!(sign(&private_key, b"x"), sign(&private_key, b"x"));
    }
}
