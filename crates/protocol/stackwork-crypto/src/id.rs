//! Random identifiers.

use rand::rngs::OsRng;
use rand::RngCore;

/// Generate a record identifier: `<prefix>_<32 hex chars>`.
pub fn random_id(prefix: &str) -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    format!("{}_{}", prefix, hex::encode(bytes))
}

/// Generate a random payment nonce.
pub fn random_nonce() -> u64 {
    OsRng.next_u64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_id_shape() {
        let id = random_id("bid");
        assert!(id.starts_with("bid_"));
        assert_eq!(id.len(), "bid_".len() + 32);
        assert_ne!(random_id("bid"), id);
    }

    #[test]
    fn test_nonces_vary() {
        let a = random_nonce();
        let b = random_nonce();
        let c = random_nonce();
        assert!(a != b || b != c);
    }
}
