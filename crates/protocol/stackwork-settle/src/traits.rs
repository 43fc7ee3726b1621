//! Settlement trait definition.

use async_trait::async_trait;

use crate::error::SettleResult;
use crate::types::{Payout, PayoutReceipt};

/// Backend that transfers task payouts to agents.
///
/// The task engine calls [`health`](Settlement::health) before approving and
/// [`settle_payout`](Settlement::settle_payout) to obtain the transaction id
/// recorded on the completed task. Implementations bound their own network
/// time; callers may additionally wrap calls in a timeout.
#[async_trait]
pub trait Settlement: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// `Ok(())` when the backend can accept payouts.
    async fn health(&self) -> SettleResult<()>;

    /// Transfer `payout.amount` to `payout.recipient_address`.
    async fn settle_payout(&self, payout: &Payout) -> SettleResult<PayoutReceipt>;
}
