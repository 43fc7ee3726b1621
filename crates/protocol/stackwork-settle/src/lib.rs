//! Payout settlement for the Stackwork marketplace.
//!
//! When a poster approves a task, the engine pays the assigned agent the
//! bounty minus the platform fee. This crate provides the [`Settlement`]
//! seam for that transfer and two backends:
//!
//! - [`FacilitatorSettlement`]: signs an x402 payment to the agent and hands
//!   it to a facilitator, with retry and a per-attempt timeout
//! - [`SimulatedSettlement`]: records `sim_<hex>` transaction ids without
//!   moving funds
//!
//! ```text
//! stackwork-ops              stackwork-settle
//! ┌──────────────┐          ┌────────────────────────────┐
//! │ approve_task │ ───────► │ Settlement (trait)         │
//! └──────────────┘          │   ├─ FacilitatorSettlement │──► facilitator /settle
//!                           │   └─ SimulatedSettlement   │
//!                           └────────────────────────────┘
//! ```

mod config;
mod error;
mod facilitator;
mod retry;
mod simulated;
mod traits;
pub mod types;

pub use config::{duration_millis, RetryConfig, SettleConfig, DEFAULT_SETTLE_TIMEOUT};
pub use error::{SettleError, SettleResult};
pub use facilitator::FacilitatorSettlement;
pub use retry::RetryPolicy;
pub use simulated::SimulatedSettlement;
pub use traits::Settlement;
pub use types::{Payout, PayoutReceipt, TransactionId, SIMULATED_TX_PREFIX};
