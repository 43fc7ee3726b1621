//! Initialize data directory command.

use std::path::Path;

use stackwork_crypto::generate_identity;
use stackwork_types::{validate_address, StacksNetwork};
use tracing::info;

use crate::config::CliConfig;
use crate::context::write_payment_key;
use crate::error::{CliError, CliResult};
use crate::output::{InitOutput, OutputFormat, Render};

/// Execute the init command.
pub fn init(
    mut config: CliConfig,
    config_path: &Path,
    format: OutputFormat,
    platform_wallet: Option<String>,
    network: StacksNetwork,
    force: bool,
) -> CliResult<String> {
    let key_path = config.key_path();
    if key_path.exists() && !force {
        return Err(CliError::KeyExists);
    }

    if let Some(wallet) = platform_wallet {
        validate_address(&wallet, Some(network))?;
        config.engine.platform_wallet = wallet;
    }
    config.engine.network = network;
    config.settlement.network = network;

    let base_dir = config.base_dir();
    std::fs::create_dir_all(&base_dir)?;

    let (private_key, public_key) = generate_identity();
    write_payment_key(&key_path, &private_key)?;
    config.save(config_path)?;

    info!(
        data_dir = %base_dir.display(),
        public_key = %public_key.to_hex(),
        "Initialized stackwork"
    );

    let output = InitOutput {
        data_dir: base_dir.to_string_lossy().to_string(),
        config_path: config_path.to_string_lossy().to_string(),
        public_key: public_key.to_hex(),
        key_created: true,
    };

    Ok(output.render(format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{setup_config, PLATFORM_WALLET};
    use crate::context::load_payment_key;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_key_and_config() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = setup_config(&temp_dir);
        config.engine.platform_wallet.clear();
        let config_path = temp_dir.path().join("config.toml");

        let output = init(
            config.clone(),
            &config_path,
            OutputFormat::Human,
            Some(PLATFORM_WALLET.to_string()),
            StacksNetwork::Testnet,
            false,
        )
        .unwrap();
        assert!(output.contains("Payment key created"));

        let saved = CliConfig::load(&config_path).unwrap();
        assert_eq!(saved.engine.platform_wallet, PLATFORM_WALLET);
        assert!(load_payment_key(&saved).is_ok());
    }

    #[test]
    fn test_init_fails_if_key_exists() {
        let temp_dir = TempDir::new().unwrap();
        let config = setup_config(&temp_dir);
        let config_path = temp_dir.path().join("config.toml");

        init(config.clone(), &config_path, OutputFormat::Human, None, StacksNetwork::Testnet, false)
            .unwrap();
        let second = init(config.clone(), &config_path, OutputFormat::Human, None, StacksNetwork::Testnet, false);
        assert!(matches!(second, Err(CliError::KeyExists)));

        // --force replaces the key.
        let before = load_payment_key(&config).unwrap().to_hex();
        init(config.clone(), &config_path, OutputFormat::Json, None, StacksNetwork::Testnet, true).unwrap();
        assert_ne!(load_payment_key(&config).unwrap().to_hex(), before);
    }

    #[test]
    fn test_init_rejects_wallet_for_other_network() {
        let temp_dir = TempDir::new().unwrap();
        let result = init(
            setup_config(&temp_dir),
            &temp_dir.path().join("config.toml"),
            OutputFormat::Human,
            Some(PLATFORM_WALLET.to_string()),
            StacksNetwork::Mainnet,
            false,
        );
        assert!(matches!(result, Err(CliError::Types(_))));
    }
}
