//! Mock implementation of the `Settlement` trait.

use async_trait::async_trait;
use stackwork_settle::{Payout, PayoutReceipt, SettleError, SettleResult, Settlement, TransactionId};
use std::sync::{Arc, RwLock};
use std::time::Duration;

#[derive(Default)]
struct MockSettlementInner {
    /// When true, payouts fail with `TransactionFailed`.
    should_fail: bool,
    /// When true, health reports the backend unavailable.
    unavailable: bool,
    /// Sleep before answering payout calls.
    delay: Option<Duration>,
    /// Every payout that succeeded.
    payouts: Vec<Payout>,
    payout_calls: u32,
    tx_counter: u64,
}

/// A mock [`Settlement`] that records payouts in memory.
///
/// Uses `Arc<RwLock<...>>` internally, so all clones share state.
#[derive(Clone, Default)]
pub struct MockSettlement {
    inner: Arc<RwLock<MockSettlementInner>>,
}

impl MockSettlement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail all payouts.
    pub fn with_failure(self) -> Self {
        self.set_should_fail(true);
        self
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.inner.write().unwrap().should_fail = should_fail;
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.write().unwrap().unavailable = unavailable;
    }

    pub fn set_delay(&self, delay: Duration) {
        self.inner.write().unwrap().delay = Some(delay);
    }

    // =========================================================================
    // Assertion Helpers
    // =========================================================================

    pub fn payouts(&self) -> Vec<Payout> {
        self.inner.read().unwrap().payouts.clone()
    }

    pub fn payout_calls(&self) -> u32 {
        self.inner.read().unwrap().payout_calls
    }
}

#[async_trait]
impl Settlement for MockSettlement {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn health(&self) -> SettleResult<()> {
        if self.inner.read().unwrap().unavailable {
            return Err(SettleError::unavailable("mock: configured unavailable"));
        }
        Ok(())
    }

    async fn settle_payout(&self, payout: &Payout) -> SettleResult<PayoutReceipt> {
        let delay = {
            let mut inner = self.inner.write().unwrap();
            inner.payout_calls += 1;
            inner.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        payout.validate()?;
        let mut inner = self.inner.write().unwrap();
        if inner.should_fail {
            return Err(SettleError::transaction_failed("mock: configured to fail"));
        }
        inner.tx_counter += 1;
        inner.payouts.push(payout.clone());
        Ok(PayoutReceipt {
            tx_id: TransactionId::new(format!("0x{:064x}", inner.tx_counter)),
            status: "pending".to_string(),
        })
    }
}
