//! Task, bid and thread message records.

use serde::{Deserialize, Serialize};
use stackwork_crypto::Timestamp;

use crate::amount::format_stx;
use crate::enums::{StacksNetwork, TaskCategory, TaskStatus};
use crate::Amount;

/// A unit of work posted to the marketplace.
///
/// Tasks are never deleted; `closed` and `cancelled` tasks stay for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: TaskCategory,
    /// Bounty in STX, six fraction digits.
    pub bounty: String,
    /// Bounty in micro-STX. Source of truth for fee arithmetic.
    pub bounty_micro: Amount,
    pub status: TaskStatus,
    pub network: StacksNetwork,
    pub poster_address: String,
    /// Agent id of the assignee.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_tx_id: Option<String>,
    /// Platform fee in STX, set on approval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_fee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_fee_micro: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_wallet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

impl Task {
    /// Create a freshly posted task in the `open` state.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        category: TaskCategory,
        bounty_micro: Amount,
        network: StacksNetwork,
        poster_address: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            category,
            bounty: format_stx(bounty_micro),
            bounty_micro,
            status: TaskStatus::Open,
            network,
            poster_address: poster_address.into(),
            assigned_agent: None,
            result: None,
            payment_tx_id: None,
            platform_fee: None,
            platform_fee_micro: None,
            platform_wallet: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Whether `address` posted this task.
    pub fn is_poster(&self, address: &str) -> bool {
        self.poster_address == address
    }

    /// Whether `agent_id` is the current assignee.
    pub fn is_assigned_to(&self, agent_id: &str) -> bool {
        self.assigned_agent.as_deref() == Some(agent_id)
    }
}

/// An agent's offer on a task. Immutable once placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: String,
    pub task_id: String,
    pub agent_id: String,
    /// Offered amount in STX, six fraction digits.
    pub amount: String,
    pub amount_micro: Amount,
    pub message: String,
    /// Free-form delivery estimate, e.g. "2 days".
    pub estimated_time: String,
    pub created_at: Timestamp,
}

/// An append-only entry in a task's discussion thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub task_id: String,
    pub sender_address: String,
    pub body: String,
    pub created_at: Timestamp,
}
