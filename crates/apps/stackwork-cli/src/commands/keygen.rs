//! Generate keypair command.

use stackwork_crypto::generate_identity;

use crate::error::CliResult;
use crate::output::{KeygenOutput, OutputFormat, Render};

/// Execute the keygen command. Nothing is written to disk.
pub fn keygen(format: OutputFormat) -> CliResult<String> {
    let (private_key, public_key) = generate_identity();
    let output = KeygenOutput {
        private_key: private_key.to_hex(),
        public_key: public_key.to_hex(),
    };
    Ok(output.render(format))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keygen_json() {
        let output = keygen(OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["private_key"].as_str().unwrap().len(), 64);
        assert_eq!(value["public_key"].as_str().unwrap().len(), 64);
    }
}
