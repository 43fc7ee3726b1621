//! CLI configuration.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use stackwork_settle::{duration_millis, SettleConfig};
use stackwork_types::{StacksNetwork, DEFAULT_PLATFORM_FEE_BPS};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::{CliError, CliResult};

/// Configuration file name inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Payment key file, relative to the data directory.
pub const PAYMENT_KEY_FILE: &str = "identity/payment.key";

/// Environment variable holding the payment key as hex; overrides the key file.
pub const PAYMENT_KEY_ENV: &str = "STACKWORK_PAYMENT_KEY";

fn env_var_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").ok())
        .as_ref()
}

/// Expand environment variables in a string.
/// Supports `${VAR_NAME}` syntax; unset variables are left as written.
pub fn expand_env_vars(input: &str) -> String {
    let Some(pattern) = env_var_pattern() else {
        return input.to_string();
    };
    pattern
        .replace_all(input, |caps: &Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .to_string()
}

fn expand_opt(value: &mut Option<String>) {
    if let Some(v) = value {
        *v = expand_env_vars(v);
    }
}

/// CLI configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Payment key and outbound payment limits.
    pub payment: PaymentConfig,
    /// Payout settlement.
    pub settlement: SettleConfig,
    /// Task engine behavior.
    pub engine: EngineSection,
    /// Event webhook.
    pub webhook: WebhookConfig,
}

impl CliConfig {
    /// Load configuration from a file.
    /// Environment variables in `${VAR}` format are expanded in URLs, paths
    /// and secrets.
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;
        config.expand_env();
        Ok(config)
    }

    /// Load configuration from the default location.
    pub fn load_default() -> CliResult<Self> {
        Self::load(&default_config_path())
    }

    fn expand_env(&mut self) {
        expand_opt(&mut self.settlement.facilitator_url);
        expand_opt(&mut self.webhook.url);
        expand_opt(&mut self.webhook.bearer_token);
        self.engine.platform_wallet = expand_env_vars(&self.engine.platform_wallet);
        if let Some(dir) = &self.storage.data_dir {
            self.storage.data_dir = Some(PathBuf::from(expand_env_vars(&dir.to_string_lossy())));
        }
        if let Some(key) = &self.payment.key_path {
            self.payment.key_path = Some(PathBuf::from(expand_env_vars(&key.to_string_lossy())));
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> CliResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the base directory for all stackwork data.
    pub fn base_dir(&self) -> PathBuf {
        self.storage.base_dir()
    }

    /// Path of the payment key file.
    pub fn key_path(&self) -> PathBuf {
        self.payment
            .key_path
            .clone()
            .unwrap_or_else(|| self.base_dir().join(PAYMENT_KEY_FILE))
    }

    /// Check cross-section consistency.
    pub fn validate(&self) -> CliResult<()> {
        if self.engine.fee_bps > 10_000 {
            return Err(CliError::config("engine.fee_bps must not exceed 10000"));
        }
        if self.engine.settlement_timeout.is_zero() {
            return Err(CliError::config("engine.settlement_timeout_ms must be greater than zero"));
        }
        if self.settlement.network != self.engine.network {
            return Err(CliError::config(format!(
                "settlement.network ({}) differs from engine.network ({})",
                self.settlement.network, self.engine.network
            )));
        }
        self.settlement.validate()?;
        Ok(())
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory. Defaults to the platform data directory.
    pub data_dir: Option<PathBuf>,
    /// SQLite database path. Defaults to `<data_dir>/stackwork.db`.
    pub database: Option<PathBuf>,
}

impl StorageConfig {
    pub fn base_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_base_dir)
    }
}

/// Payment key and outbound auto-pay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    /// Hex Ed25519 private key file. Defaults to `<data_dir>/identity/payment.key`.
    pub key_path: Option<PathBuf>,
    /// Largest 402 paid automatically by `pay fetch`, in STX.
    pub max_auto_pay: String,
    /// Outbound request timeout, in milliseconds.
    #[serde(with = "duration_millis", rename = "timeout_ms")]
    pub timeout: Duration,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            key_path: None,
            max_auto_pay: "1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Task engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Network new tasks settle on.
    pub network: StacksNetwork,
    /// Platform fee in basis points.
    pub fee_bps: u16,
    /// Wallet recorded as fee recipient.
    pub platform_wallet: String,
    #[serde(with = "duration_millis", rename = "settlement_timeout_ms")]
    pub settlement_timeout: Duration,
    pub simulate_on_failure: bool,
    pub allow_bids_above_bounty: bool,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            network: StacksNetwork::Testnet,
            fee_bps: DEFAULT_PLATFORM_FEE_BPS,
            platform_wallet: String::new(),
            settlement_timeout: stackwork_ops::DEFAULT_SETTLEMENT_TIMEOUT,
            simulate_on_failure: true,
            allow_bids_above_bounty: false,
        }
    }
}

/// Webhook that receives every market event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Endpoint URL. No webhook when unset.
    pub url: Option<String>,
    /// Sent as `Authorization: Bearer <token>`.
    pub bearer_token: Option<String>,
    #[serde(with = "duration_millis", rename = "timeout_ms")]
    pub timeout: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            bearer_token: None,
            timeout: stackwork_ops::DEFAULT_WEBHOOK_TIMEOUT,
        }
    }
}

/// Get the default base directory for stackwork data.
///
/// Delegates to [`stackwork_store::default_data_dir`].
pub fn default_base_dir() -> PathBuf {
    stackwork_store::default_data_dir()
}

/// Get the default config file path.
pub fn default_config_path() -> PathBuf {
    default_base_dir().join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.engine.fee_bps, 100);
        assert!(config.engine.simulate_on_failure);
        assert!(config.settlement.facilitator_url.is_none());
        assert!(config.webhook.url.is_none());
        assert_eq!(config.payment.max_auto_pay, "1");
        config.validate().unwrap();
    }

    #[test]
    fn test_config_save_and_load_roundtrip() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE);

        let mut config = CliConfig::default();
        config.storage.data_dir = Some(temp_dir.path().to_path_buf());
        config.engine.fee_bps = 250;
        config.engine.platform_wallet = "ST3AM1A56AK2C1XAFJ4115ZSV26EB49BVQ10MGCS0".into();
        config.save(&config_path).unwrap();

        let loaded = CliConfig::load(&config_path).unwrap();
        assert_eq!(loaded.engine.fee_bps, 250);
        assert_eq!(loaded.engine.platform_wallet, config.engine.platform_wallet);
        assert_eq!(loaded.base_dir(), temp_dir.path());
        assert_eq!(loaded.settlement.timeout, config.settlement.timeout);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CliConfig = toml::from_str(
            r#"
            [engine]
            fee_bps = 50

            [settlement]
            facilitator_url = "http://127.0.0.1:4020"
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.fee_bps, 50);
        assert!(config.engine.simulate_on_failure);
        assert_eq!(config.engine.settlement_timeout, Duration::from_secs(5));
        assert_eq!(
            config.settlement.facilitator_url.as_deref(),
            Some("http://127.0.0.1:4020")
        );
    }

    #[test]
    fn test_config_load_nonexistent_returns_default() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = CliConfig::load(&temp_dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.engine.fee_bps, DEFAULT_PLATFORM_FEE_BPS);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[engine\nfee_bps = ").unwrap();
        assert!(matches!(CliConfig::load(&path), Err(CliError::Toml(_))));
    }

    #[test]
    fn test_validate_rejects_network_mismatch() {
        let mut config = CliConfig::default();
        config.settlement.network = StacksNetwork::Mainnet;
        assert!(matches!(config.validate(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_fee_over_100_percent() {
        let mut config = CliConfig::default();
        config.engine.fee_bps = 10_001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("STACKWORK_TEST_HOOK", "https://example.com/hook");

        assert_eq!(
            expand_env_vars("${STACKWORK_TEST_HOOK}"),
            "https://example.com/hook"
        );
        assert_eq!(
            expand_env_vars("${STACKWORK_NONEXISTENT_12345}"),
            "${STACKWORK_NONEXISTENT_12345}"
        );
        assert_eq!(
            expand_env_vars("prefix_${STACKWORK_TEST_HOOK}_suffix"),
            "prefix_https://example.com/hook_suffix"
        );

        std::env::remove_var("STACKWORK_TEST_HOOK");
    }

    #[test]
    fn test_load_expands_webhook_secrets() {
        std::env::set_var("STACKWORK_TEST_TOKEN", "s3cret");
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "[webhook]\nurl = \"http://localhost/hook\"\nbearer_token = \"${STACKWORK_TEST_TOKEN}\"\n",
        )
        .unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.webhook.bearer_token.as_deref(), Some("s3cret"));
        std::env::remove_var("STACKWORK_TEST_TOKEN");
    }

    #[test]
    fn test_key_path_defaults_under_data_dir() {
        let mut config = CliConfig::default();
        config.storage.data_dir = Some(PathBuf::from("/var/lib/stackwork"));
        assert_eq!(
            config.key_path(),
            PathBuf::from("/var/lib/stackwork/identity/payment.key")
        );
    }
}
