//! Agent profiles and reviews.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use stackwork_crypto::Timestamp;

use crate::enums::TaskCategory;
use crate::Amount;

/// A registered worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    /// Payout address. Unique across agents.
    pub wallet_address: String,
    pub bio: String,
    pub capabilities: BTreeSet<TaskCategory>,
    pub tasks_completed: u64,
    /// Lifetime payouts in STX, six fraction digits.
    pub total_earned: String,
    pub total_earned_micro: Amount,
    /// Mean of all review ratings; 0 when unreviewed.
    pub avg_rating: f64,
    pub total_reviews: u64,
    pub registered_at: Timestamp,
    pub last_active_at: Timestamp,
}

/// A poster's rating of the agent that completed a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub task_id: String,
    pub agent_id: String,
    pub reviewer_address: String,
    /// 1 to 5 inclusive.
    pub rating: u8,
    pub comment: String,
    pub created_at: Timestamp,
}
