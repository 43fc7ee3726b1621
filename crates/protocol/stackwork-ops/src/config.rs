//! Configuration for the task engine.

use std::time::Duration;

use stackwork_types::{validate_address, StacksNetwork, BPS_DENOMINATOR, DEFAULT_PLATFORM_FEE_BPS};

use crate::error::{OpsError, OpsResult};

/// Default bound on one approval's settlement attempt.
pub const DEFAULT_SETTLEMENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for engine behavior.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Network new tasks settle on unless the request names one.
    pub network: StacksNetwork,
    /// Platform fee in basis points of the bounty.
    pub fee_bps: u16,
    /// Wallet recorded as the fee recipient on completed tasks.
    pub platform_wallet: String,
    /// Upper bound on health check plus payout during approval.
    pub settlement_timeout: Duration,
    /// Record a simulated transaction id when settlement fails.
    /// When false, approval fails and the task stays `submitted`.
    pub simulate_on_failure: bool,
    /// Accept bids larger than the task bounty.
    /// Payouts always derive from the bounty regardless.
    pub allow_bids_above_bounty: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            network: StacksNetwork::Testnet,
            fee_bps: DEFAULT_PLATFORM_FEE_BPS,
            platform_wallet: String::new(),
            settlement_timeout: DEFAULT_SETTLEMENT_TIMEOUT,
            simulate_on_failure: true,
            allow_bids_above_bounty: false,
        }
    }
}

impl EngineConfig {
    pub fn new(network: StacksNetwork, platform_wallet: impl Into<String>) -> Self {
        Self {
            network,
            platform_wallet: platform_wallet.into(),
            ..Default::default()
        }
    }

    pub fn with_fee_bps(mut self, fee_bps: u16) -> Self {
        self.fee_bps = fee_bps;
        self
    }

    pub fn with_settlement_timeout(mut self, timeout: Duration) -> Self {
        self.settlement_timeout = timeout;
        self
    }

    pub fn with_simulate_on_failure(mut self, enabled: bool) -> Self {
        self.simulate_on_failure = enabled;
        self
    }

    pub fn with_bids_above_bounty(mut self, allowed: bool) -> Self {
        self.allow_bids_above_bounty = allowed;
        self
    }

    pub fn validate(&self) -> OpsResult<()> {
        if u64::from(self.fee_bps) > BPS_DENOMINATOR {
            return Err(OpsError::validation(format!(
                "Platform fee of {} bps exceeds 100%",
                self.fee_bps
            )));
        }
        if self.settlement_timeout.is_zero() {
            return Err(OpsError::validation("Settlement timeout must be positive"));
        }
        validate_address(&self.platform_wallet, Some(self.network))
            .map_err(|e| OpsError::validation(format!("Platform wallet: {}", e)))
    }
}
