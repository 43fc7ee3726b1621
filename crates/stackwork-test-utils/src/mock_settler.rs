//! Mock implementation of the x402 `Settler` trait.

use async_trait::async_trait;
use stackwork_x402::{FacilitatorHealth, PaymentPayload, SettlementReceipt, Settler, X402Error, X402Result};
use std::sync::{Arc, RwLock};
use std::time::Duration;

#[derive(Default)]
struct MockSettlerInner {
    /// Number of upcoming settle calls that fail with a network error.
    transient_failures: u32,
    /// When true, settle calls fail with `SettlementFailed`.
    reject: bool,
    /// When true, health reports `unavailable`.
    unhealthy: bool,
    /// Sleep before answering settle calls.
    delay: Option<Duration>,
    health_calls: u32,
    settle_calls: u32,
    /// Payloads that settled successfully.
    settled: Vec<PaymentPayload>,
    tx_counter: u64,
}

/// A mock [`Settler`] recording every call.
///
/// Clones share state.
#[derive(Clone, Default)]
pub struct MockSettler {
    inner: Arc<RwLock<MockSettlerInner>>,
}

impl MockSettler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` settle calls with a transient network error.
    pub fn fail_next(&self, count: u32) {
        self.inner.write().unwrap().transient_failures = count;
    }

    /// Reject every settle call with `SettlementFailed`.
    pub fn set_reject(&self, reject: bool) {
        self.inner.write().unwrap().reject = reject;
    }

    pub fn set_unhealthy(&self, unhealthy: bool) {
        self.inner.write().unwrap().unhealthy = unhealthy;
    }

    /// Delay every settle call by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        self.inner.write().unwrap().delay = Some(delay);
    }

    // =========================================================================
    // Assertion Helpers
    // =========================================================================

    pub fn health_calls(&self) -> u32 {
        self.inner.read().unwrap().health_calls
    }

    pub fn settle_calls(&self) -> u32 {
        self.inner.read().unwrap().settle_calls
    }

    pub fn settled(&self) -> Vec<PaymentPayload> {
        self.inner.read().unwrap().settled.clone()
    }
}

#[async_trait]
impl Settler for MockSettler {
    async fn health(&self) -> X402Result<FacilitatorHealth> {
        let mut inner = self.inner.write().unwrap();
        inner.health_calls += 1;
        let status = if inner.unhealthy { "unavailable" } else { "ok" };
        Ok(FacilitatorHealth {
            status: status.to_string(),
        })
    }

    async fn settle(&self, payload: &PaymentPayload) -> X402Result<SettlementReceipt> {
        let delay = {
            let mut inner = self.inner.write().unwrap();
            inner.settle_calls += 1;
            inner.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner.write().unwrap();
        if inner.transient_failures > 0 {
            inner.transient_failures -= 1;
            return Err(X402Error::FacilitatorNetwork("mock: connection reset".into()));
        }
        if inner.reject {
            return Err(X402Error::SettlementFailed {
                reason: "mock: configured to reject".into(),
            });
        }
        inner.tx_counter += 1;
        inner.settled.push(payload.clone());
        Ok(SettlementReceipt {
            tx_id: format!("0x{:064x}", inner.tx_counter),
            status: "pending".to_string(),
        })
    }
}
