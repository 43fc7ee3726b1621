//! SHA-256 message hashing.

use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash(pub [u8; 32]);

impl std::fmt::Debug for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hash({})", hex::encode(&self.0[..8]))
    }
}

impl std::fmt::Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Hash an arbitrary message with SHA-256.
///
/// # Example
/// ```
/// use stackwork_crypto::message_hash;
///
/// let a = message_hash(b"payment");
/// let b = message_hash(b"payment");
/// assert_eq!(a, b);
/// ```
pub fn message_hash(message: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(message);
    Hash(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        let hash = message_hash(b"abc");
        assert_eq!(
            hash.to_string(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_different_inputs_differ() {
        assert_ne!(message_hash(b"a"), message_hash(b"b"));
    }
}
