//! Cryptographic primitives for Stackwork.
//!
//! This crate provides the signing material used by the payment protocol and
//! the marketplace:
//!
//! - **Hashing**: SHA-256 digests of canonical payment messages
//! - **Identity**: Ed25519 keypair generation and hex encoding of keys
//! - **Signatures**: Message signing and verification
//! - **Identifiers**: Prefixed random record ids and payment nonces
//!
//! # Example
//!
//! ```
//! use stackwork_crypto::{generate_identity, sign, verify, random_id};
//!
//! let (private_key, public_key) = generate_identity();
//!
//! let message = b"pay 20000 uSTX to SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7";
//! let signature = sign(&private_key, message);
//! assert!(verify(&public_key, message, &signature));
//!
//! let id = random_id("task");
//! assert!(id.starts_with("task_"));
//! ```

mod error;
mod hash;
mod id;
mod identity;
mod signature;

pub use error::CryptoError;
pub use hash::{message_hash, Hash};
pub use id::{random_id, random_nonce};
pub use identity::{generate_identity, public_key_from_private};
pub use signature::{sign, verify};

use ed25519_dalek::SigningKey;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Current wall-clock time as a [`Timestamp`].
pub fn current_timestamp() -> Timestamp {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as Timestamp)
        .unwrap_or(0)
}

/// An Ed25519 private key (32 bytes).
///
/// Implements Zeroize + ZeroizeOnDrop to clear key material from memory.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    /// Create a PrivateKey from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a private key from 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        Ok(Self(decode_fixed::<32>(s)?))
    }

    /// Get the raw bytes of the private key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex encoding of the key. Handle with care.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub(crate) fn from_signing_key(key: &SigningKey) -> Self {
        Self(key.to_bytes())
    }

    pub(crate) fn to_signing_key(&self) -> SigningKey {
        SigningKey::from_bytes(&self.0)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKey([REDACTED])")
    }
}

/// An Ed25519 public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    /// Create a PublicKey from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a public key from 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        Ok(Self(decode_fixed::<32>(s)?))
    }

    /// Get the raw bytes of the public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex encoding, as carried in payment payloads.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", hex::encode(&self.0[..8]))
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// An Ed25519 signature (64 bytes).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    /// Create a Signature from raw bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Parse a signature from 128 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        let arr: [u8; 64] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidSignatureLength(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Get the raw bytes of the signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", hex::encode(&self.0[..8]))
    }
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], CryptoError> {
    let bytes = hex::decode(s.trim()).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::InvalidKeyLength {
            expected: N,
            actual: bytes.len(),
        })
}
