//! Settlement that records payouts without moving funds.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::info;

use crate::error::SettleResult;
use crate::traits::Settlement;
use crate::types::{Payout, PayoutReceipt};

/// [`Settlement`] issuing `sim_<hex>` transaction ids.
///
/// Used when no facilitator is configured and as the engine's fallback when
/// the configured backend is unavailable.
#[derive(Debug, Default)]
pub struct SimulatedSettlement {
    settled: AtomicU64,
}

impl SimulatedSettlement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of payouts recorded so far.
    pub fn settled_count(&self) -> u64 {
        self.settled.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Settlement for SimulatedSettlement {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn health(&self) -> SettleResult<()> {
        Ok(())
    }

    async fn settle_payout(&self, payout: &Payout) -> SettleResult<PayoutReceipt> {
        payout.validate()?;
        let receipt = PayoutReceipt::simulated();
        self.settled.fetch_add(1, Ordering::Relaxed);
        info!(
            task_id = %payout.task_id,
            tx_id = %receipt.tx_id,
            amount = %payout.amount_stx(),
            "Payout simulated"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackwork_types::StacksNetwork;

    #[tokio::test]
    async fn test_simulated_payouts() {
        let settlement = SimulatedSettlement::new();
        assert!(settlement.health().await.is_ok());

        let payout = Payout::new(
            "task_1",
            "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM",
            990_000,
            StacksNetwork::Testnet,
        );
        let a = settlement.settle_payout(&payout).await.unwrap();
        let b = settlement.settle_payout(&payout).await.unwrap();

        assert!(a.tx_id.is_simulated());
        assert_eq!(a.status, "simulated");
        assert_ne!(a.tx_id, b.tx_id);
        assert_eq!(settlement.settled_count(), 2);
    }

    #[tokio::test]
    async fn test_simulated_still_validates() {
        let settlement = SimulatedSettlement::new();
        let payout = Payout::new("task_1", "not-an-address", 5, StacksNetwork::Testnet);
        assert!(settlement.settle_payout(&payout).await.is_err());
        assert_eq!(settlement.settled_count(), 0);
    }
}
