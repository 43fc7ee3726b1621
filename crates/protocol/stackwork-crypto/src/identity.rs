//! Ed25519 keypair generation.

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

use crate::{PrivateKey, PublicKey};

/// Generate a new Ed25519 identity (keypair).
///
/// Uses the operating system's cryptographically secure random number generator.
pub fn generate_identity() -> (PrivateKey, PublicKey) {
    let mut csprng = OsRng;
    let signing_key = SigningKey::generate(&mut csprng);
    let verifying_key = signing_key.verifying_key();

    (
        PrivateKey::from_signing_key(&signing_key),
        PublicKey(verifying_key.to_bytes()),
    )
}

/// Derive the public key belonging to a private key.
pub fn public_key_from_private(private_key: &PrivateKey) -> PublicKey {
    PublicKey(private_key.to_signing_key().verifying_key().to_bytes())
}
