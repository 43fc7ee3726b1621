//! Configuration for payout settlement.

use serde::{Deserialize, Serialize};
use stackwork_types::StacksNetwork;
use std::time::Duration;

use crate::error::{SettleError, SettleResult};

/// Default per-call settlement timeout.
pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for payout settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    /// Network payouts are made on.
    pub network: StacksNetwork,

    /// Facilitator base URL. Payouts are simulated when unset.
    pub facilitator_url: Option<String>,

    /// Upper bound on a single settlement call, in milliseconds.
    #[serde(with = "duration_millis", rename = "timeout_ms")]
    pub timeout: Duration,

    /// Retry policy
    pub retry: RetryConfig,
}

impl SettleConfig {
    /// Configuration that settles through the facilitator at `url`.
    pub fn facilitator(network: StacksNetwork, url: impl Into<String>) -> Self {
        Self {
            network,
            facilitator_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> SettleResult<()> {
        if let Some(url) = &self.facilitator_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(SettleError::config(format!(
                    "facilitator url must be http(s): {}",
                    url
                )));
            }
        }
        if self.timeout.is_zero() {
            return Err(SettleError::config("timeout must be greater than zero"));
        }
        if self.retry.max_attempts == 0 {
            return Err(SettleError::config("retry.max_attempts must be at least 1"));
        }
        Ok(())
    }
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            network: StacksNetwork::Testnet,
            facilitator_url: None,
            timeout: DEFAULT_SETTLE_TIMEOUT,
            retry: RetryConfig::default(),
        }
    }
}

/// Retry policy configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Base delay between retries
    #[serde(with = "duration_millis", rename = "base_delay_ms")]
    pub base_delay: Duration,
    /// Maximum delay between retries
    #[serde(with = "duration_millis", rename = "max_delay_ms")]
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

/// Serde helper storing a Duration as integer milliseconds.
pub mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = SettleConfig::default();
        assert_eq!(config.network, StacksNetwork::Testnet);
        assert!(config.facilitator_url.is_none());
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_config_default() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.base_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = SettleConfig::facilitator(StacksNetwork::Testnet, "ftp://facilitator");
        assert!(matches!(config.validate(), Err(SettleError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = SettleConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_durations_serialize_as_millis() {
        let config = SettleConfig::facilitator(StacksNetwork::Mainnet, "https://f.example");
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["timeout_ms"], 5000);
        assert_eq!(json["retry"]["base_delay_ms"], 500);
        assert_eq!(json["network"], "mainnet");

        let parsed: SettleConfig =
            serde_json::from_str(r#"{"timeout_ms": 1500, "retry": {"max_attempts": 5}}"#).unwrap();
        assert_eq!(parsed.timeout, Duration::from_millis(1500));
        assert_eq!(parsed.retry.max_attempts, 5);
        assert_eq!(parsed.retry.max_delay, Duration::from_secs(10));
    }
}
