//! Payouts settled through an x402 facilitator.
//!
//! The platform signs an `exact` STX payment to the agent's wallet and hands
//! it to a [`Settler`]. The payload is signed once per payout, so every retry
//! carries the same nonce and a facilitator can deduplicate it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use stackwork_x402::{FacilitatorClient, PaymentRequirement, PaymentSigner, Settler};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::SettleConfig;
use crate::error::{SettleError, SettleResult};
use crate::retry::RetryPolicy;
use crate::traits::Settlement;
use crate::types::{Payout, PayoutReceipt, TransactionId};

/// [`Settlement`] backed by a payment facilitator.
pub struct FacilitatorSettlement {
    settler: Arc<dyn Settler>,
    signer: PaymentSigner,
    retry: RetryPolicy,
    timeout: Duration,
}

impl FacilitatorSettlement {
    pub fn new(settler: Arc<dyn Settler>, signer: PaymentSigner) -> Self {
        Self {
            settler,
            signer,
            retry: RetryPolicy::default(),
            timeout: crate::config::DEFAULT_SETTLE_TIMEOUT,
        }
    }

    /// Build an HTTP facilitator client from configuration.
    pub fn from_config(config: &SettleConfig, signer: PaymentSigner) -> SettleResult<Self> {
        config.validate()?;
        let url = config
            .facilitator_url
            .as_deref()
            .ok_or_else(|| SettleError::config("facilitator_url is not set"))?;
        let client = FacilitatorClient::with_timeout(url, config.timeout)?;

        Ok(Self::new(Arc::new(client), signer)
            .with_retry(RetryPolicy::from_config(&config.retry))
            .with_timeout(config.timeout))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Per-attempt time limit.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = limit;
        self
    }
}

#[async_trait]
impl Settlement for FacilitatorSettlement {
    fn name(&self) -> &'static str {
        "facilitator"
    }

    async fn health(&self) -> SettleResult<()> {
        let health = timeout(self.timeout, self.settler.health())
            .await
            .map_err(|_| SettleError::elapsed("facilitator health", self.timeout))??;

        if health.is_ok() {
            Ok(())
        } else {
            Err(SettleError::unavailable(format!(
                "facilitator status {}",
                health.status
            )))
        }
    }

    async fn settle_payout(&self, payout: &Payout) -> SettleResult<PayoutReceipt> {
        payout.validate()?;

        let requirement =
            PaymentRequirement::stx(payout.network, &payout.recipient_address, payout.amount.to_string())
                .with_description(format!("Payout for task {}", payout.task_id))
                .with_resource(payout.task_id.clone());
        let payload = self.signer.sign(&requirement);

        debug!(
            task_id = %payout.task_id,
            recipient = %payout.recipient_address,
            amount = payout.amount,
            nonce = payload.nonce,
            "Submitting payout"
        );

        let limit = self.timeout;
        let result = self
            .retry
            .execute(|| {
                let settler = Arc::clone(&self.settler);
                let payload = payload.clone();
                async move {
                    timeout(limit, settler.settle(&payload))
                        .await
                        .map_err(|_| SettleError::elapsed("facilitator settle", limit))?
                        .map_err(SettleError::from)
                }
            })
            .await;

        match result {
            Ok(receipt) => {
                info!(
                    task_id = %payout.task_id,
                    tx_id = %receipt.tx_id,
                    amount = %payout.amount_stx(),
                    "Payout settled"
                );
                Ok(PayoutReceipt {
                    tx_id: TransactionId::new(receipt.tx_id),
                    status: receipt.status,
                })
            }
            Err(e) => {
                warn!(task_id = %payout.task_id, error = %e, "Payout settlement failed");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for FacilitatorSettlement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacilitatorSettlement")
            .field("payer", &self.signer.public_key().to_hex())
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackwork_crypto::generate_identity;
    use stackwork_types::StacksNetwork;

    fn signer() -> PaymentSigner {
        PaymentSigner::new(generate_identity().0)
    }

    #[test]
    fn test_from_config_requires_url() {
        let err = FacilitatorSettlement::from_config(&SettleConfig::default(), signer()).unwrap_err();
        assert!(matches!(err, SettleError::Config(_)));
    }

    #[test]
    fn test_from_config_with_url() {
        let config = SettleConfig::facilitator(StacksNetwork::Testnet, "http://127.0.0.1:4020");
        let settlement = FacilitatorSettlement::from_config(&config, signer()).unwrap();
        assert_eq!(settlement.name(), "facilitator");
        assert_eq!(settlement.timeout, config.timeout);
    }
}
