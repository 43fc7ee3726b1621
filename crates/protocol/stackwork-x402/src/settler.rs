//! Settlement capability consumed by the payment gate.

use async_trait::async_trait;

use crate::error::X402Result;
use crate::types::{FacilitatorHealth, PaymentPayload, SettlementReceipt};

/// Commits a verified payment, either on-chain or through a facilitator.
///
/// Failures are reported as [`crate::X402Error::SettlementFailed`] or
/// [`crate::X402Error::FacilitatorNetwork`], never as verification errors.
#[async_trait]
pub trait Settler: Send + Sync {
    /// Whether the settler is currently reachable and willing to settle.
    async fn health(&self) -> X402Result<FacilitatorHealth>;

    /// Broadcast (or delegate) the payment and return its transaction id.
    async fn settle(&self, payload: &PaymentPayload) -> X402Result<SettlementReceipt>;
}
