//! Shared test utilities for Stackwork.
//!
//! - [`MockSettler`]: in-memory x402 settler with failure injection
//! - [`MockSettlement`]: in-memory payout backend with failure injection
//! - [`RecordingNotifier`]: captures engine events
//! - [`helpers`]: addresses, engine construction and lifecycle shortcuts

pub mod helpers;
pub mod mock_settlement;
pub mod mock_settler;
pub mod recording_notifier;

pub use helpers::*;
pub use mock_settlement::MockSettlement;
pub use mock_settler::MockSettler;
pub use recording_notifier::RecordingNotifier;
