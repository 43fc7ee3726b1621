//! Query and aggregate types used by the stores.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stackwork_types::{Amount, StacksNetwork, TaskCategory, TaskStatus};

/// Filter for listing tasks. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub category: Option<TaskCategory>,
    pub poster: Option<String>,
    pub assigned_agent: Option<String>,
    pub network: Option<StacksNetwork>,
    pub limit: Option<u32>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_poster(mut self, poster: impl Into<String>) -> Self {
        self.poster = Some(poster.into());
        self
    }

    pub fn with_assigned_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.assigned_agent = Some(agent_id.into());
        self
    }

    pub fn with_network(mut self, network: StacksNetwork) -> Self {
        self.network = Some(network);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Payment metadata written when a task completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub agent_id: String,
    pub fee_micro: Amount,
    pub payout_micro: Amount,
    pub platform_wallet: String,
    pub tx_id: String,
}

/// Aggregates over the whole market.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStats {
    /// Task count keyed by status name; every status is present.
    pub tasks_by_status: BTreeMap<String, u64>,
    pub total_tasks: u64,
    pub total_agents: u64,
    pub total_bids: u64,
    pub total_reviews: u64,
    /// Sum of bounties over every task ever posted.
    pub posted_volume_micro: Amount,
    /// Sum of bounties over completed and closed tasks.
    pub paid_volume_micro: Amount,
    pub fees_collected_micro: Amount,
}
