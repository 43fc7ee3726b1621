//! Market context for CLI operations.

use std::path::Path;
use std::sync::Arc;

use stackwork_crypto::PrivateKey;
use stackwork_ops::{EngineConfig, TaskEngine, WebhookNotifier};
use stackwork_settle::{FacilitatorSettlement, Settlement, SimulatedSettlement};
use stackwork_store::{MarketState, MarketStateConfig};
use stackwork_x402::PaymentSigner;
use tracing::{debug, info};

use crate::config::{CliConfig, PAYMENT_KEY_ENV};
use crate::error::{CliError, CliResult};

/// Read the payment key from `STACKWORK_PAYMENT_KEY` or the key file.
pub fn load_payment_key(config: &CliConfig) -> CliResult<PrivateKey> {
    if let Ok(hex) = std::env::var(PAYMENT_KEY_ENV) {
        return Ok(PrivateKey::from_hex(hex.trim())?);
    }

    let path = config.key_path();
    if !path.exists() {
        return Err(CliError::KeyNotInitialized);
    }
    let contents = std::fs::read_to_string(&path)?;
    Ok(PrivateKey::from_hex(contents.trim())?)
}

/// Write a payment key as hex, readable only by the owner on Unix.
pub fn write_payment_key(path: &Path, key: &PrivateKey) -> CliResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, key.to_hex())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

/// Create the settlement backend based on configuration.
///
/// With `settlement.facilitator_url` set, payouts are signed with the
/// payment key and settled through the facilitator. Otherwise they are
/// simulated.
fn create_settlement(config: &CliConfig) -> CliResult<Arc<dyn Settlement>> {
    if config.settlement.facilitator_url.is_none() {
        debug!("No facilitator configured, payouts are simulated");
        return Ok(Arc::new(SimulatedSettlement::new()));
    }

    let signer = PaymentSigner::new(load_payment_key(config)?);
    let settlement = FacilitatorSettlement::from_config(&config.settlement, signer)?;
    info!(
        facilitator = config.settlement.facilitator_url.as_deref().unwrap_or_default(),
        "Settling payouts through facilitator"
    );
    Ok(Arc::new(settlement))
}

fn engine_config(config: &CliConfig) -> CliResult<EngineConfig> {
    let engine = &config.engine;
    if engine.platform_wallet.is_empty() {
        return Err(CliError::config(
            "engine.platform_wallet is not set. Run 'stackwork init --platform-wallet <address>'",
        ));
    }
    Ok(EngineConfig::new(engine.network, &engine.platform_wallet)
        .with_fee_bps(engine.fee_bps)
        .with_settlement_timeout(engine.settlement_timeout)
        .with_simulate_on_failure(engine.simulate_on_failure)
        .with_bids_above_bounty(engine.allow_bids_above_bounty))
}

/// Everything a market command needs.
pub struct MarketContext {
    pub engine: TaskEngine,
    pub config: CliConfig,
}

impl MarketContext {
    /// Open the store and build the engine described by `config`.
    pub fn open(config: CliConfig) -> CliResult<Self> {
        config.validate()?;

        let mut state_config = MarketStateConfig::new(config.base_dir());
        if let Some(database) = &config.storage.database {
            state_config = state_config.with_database_path(database);
        }
        let state = MarketState::open(state_config)?;

        let settlement = create_settlement(&config)?;
        let mut engine = TaskEngine::new(state, settlement, engine_config(&config)?)?;

        if let Some(url) = &config.webhook.url {
            let mut notifier = WebhookNotifier::with_timeout(url.as_str(), config.webhook.timeout)?;
            if let Some(token) = &config.webhook.bearer_token {
                notifier = notifier.with_bearer_token(token.as_str());
            }
            debug!(url = %url, "Forwarding market events to webhook");
            engine = engine.with_notifier(Arc::new(notifier));
        }

        Ok(Self { engine, config })
    }
}
