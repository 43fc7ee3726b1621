//! Syntactic Stacks address validation.
//!
//! A standard principal is `S`, a version character and a 39-character c32
//! body. Nothing here touches the chain.

use crate::enums::StacksNetwork;
use crate::error::{Result, TypesError};

/// Total length of a standard principal.
pub const ADDRESS_LENGTH: usize = 41;

/// Crockford base32 alphabet used by c32check.
const C32_ALPHABET: &str = "0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Network implied by an address's version character, if it is well formed.
pub fn address_network(address: &str) -> Option<StacksNetwork> {
    let bytes = address.as_bytes();
    if bytes.len() != ADDRESS_LENGTH || bytes[0] != b'S' {
        return None;
    }
    if !bytes[2..].iter().all(|b| C32_ALPHABET.as_bytes().contains(b)) {
        return None;
    }

    let version = bytes[1] as char;
    [StacksNetwork::Mainnet, StacksNetwork::Testnet]
        .into_iter()
        .find(|network| network.address_versions().contains(&version))
}

/// Whether `address` is a syntactically valid principal on any network.
pub fn is_valid_address(address: &str) -> bool {
    address_network(address).is_some()
}

/// Validate an address, optionally requiring it to belong to `network`.
pub fn validate_address(address: &str, network: Option<StacksNetwork>) -> Result<()> {
    match (address_network(address), network) {
        (None, _) => Err(TypesError::InvalidAddress(address.to_string())),
        (Some(found), Some(expected)) if found != expected => Err(TypesError::InvalidAddress(
            format!("{} is not a {} address", address, expected),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAINNET: &str = "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7";
    const TESTNET: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

    #[test]
    fn test_known_addresses() {
        assert_eq!(address_network(MAINNET), Some(StacksNetwork::Mainnet));
        assert_eq!(address_network(TESTNET), Some(StacksNetwork::Testnet));
        assert!(is_valid_address("SM2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7"));
        assert!(is_valid_address("SN1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM"));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ"));
        assert!(!is_valid_address("XP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7"));
        assert!(!is_valid_address("SX2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7"));
        // 'O' and 'I' are not in the c32 alphabet.
        assert!(!is_valid_address("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJO"));
        assert!(!is_valid_address("sp2j6zy48gv1ez5v2v5rb9mp66sw86pykknrv9ej7"));
    }

    #[test]
    fn test_rejects_multibyte_input_of_address_length() {
        // 41 bytes, but the second character spans two of them.
        let address = format!("S\u{e9}{}", "A".repeat(38));
        assert_eq!(address.len(), ADDRESS_LENGTH);
        assert!(!is_valid_address(&address));
        assert!(matches!(
            validate_address(&address, None),
            Err(TypesError::InvalidAddress(_))
        ));

        let address = format!("ST{}\u{e9}", "A".repeat(37));
        assert_eq!(address.len(), ADDRESS_LENGTH);
        assert!(!is_valid_address(&address));
    }

    #[test]
    fn test_network_mismatch() {
        assert!(validate_address(MAINNET, Some(StacksNetwork::Mainnet)).is_ok());
        assert!(validate_address(MAINNET, None).is_ok());
        assert!(matches!(
            validate_address(MAINNET, Some(StacksNetwork::Testnet)),
            Err(TypesError::InvalidAddress(_))
        ));
    }
}
