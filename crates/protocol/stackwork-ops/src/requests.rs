//! Caller-supplied inputs for engine operations.
//!
//! Amounts arrive as decimal STX strings and are parsed by the engine.

use std::collections::BTreeSet;

use serde::Deserialize;
use stackwork_types::{StacksNetwork, TaskCategory};

/// A task to post.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: TaskCategory,
    /// Bounty in STX, e.g. `"0.020"`.
    pub bounty: String,
    pub poster_address: String,
    /// Defaults to the engine's network.
    #[serde(default)]
    pub network: Option<StacksNetwork>,
}

impl NewTask {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        bounty: impl Into<String>,
        poster_address: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: TaskCategory::default(),
            bounty: bounty.into(),
            poster_address: poster_address.into(),
            network: None,
        }
    }

    pub fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_network(mut self, network: StacksNetwork) -> Self {
        self.network = Some(network);
        self
    }
}

/// A bid on a task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBid {
    pub agent_id: String,
    /// Offered price in STX.
    pub amount: String,
    #[serde(default)]
    pub message: String,
    /// Free-form estimate, e.g. `"2h"`.
    #[serde(default)]
    pub estimated_time: String,
}

impl NewBid {
    pub fn new(agent_id: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            amount: amount.into(),
            message: String::new(),
            estimated_time: String::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_estimated_time(mut self, estimate: impl Into<String>) -> Self {
        self.estimated_time = estimate.into();
        self
    }
}

/// An agent registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAgent {
    pub name: String,
    pub wallet_address: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub capabilities: BTreeSet<TaskCategory>,
}

impl NewAgent {
    pub fn new(name: impl Into<String>, wallet_address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wallet_address: wallet_address.into(),
            bio: String::new(),
            capabilities: BTreeSet::new(),
        }
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }

    pub fn with_capabilities(mut self, capabilities: impl IntoIterator<Item = TaskCategory>) -> Self {
        self.capabilities = capabilities.into_iter().collect();
        self
    }
}

/// Profile fields to replace; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub capabilities: Option<BTreeSet<TaskCategory>>,
}

/// A poster's review of the agent that did a task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub agent_id: String,
    pub reviewer_address: String,
    /// Kept wide so out-of-range input is reported, not truncated.
    pub rating: i64,
    pub comment: String,
}

impl NewReview {
    pub fn new(
        agent_id: impl Into<String>,
        reviewer_address: impl Into<String>,
        rating: i64,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            reviewer_address: reviewer_address.into(),
            rating,
            comment: comment.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_from_json() {
        let task: NewTask = serde_json::from_str(
            r#"{"title":"t","description":"d","category":"data-analysis",
                "bounty":"0.5","posterAddress":"ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM"}"#,
        )
        .unwrap();
        assert_eq!(task.category, TaskCategory::DataAnalysis);
        assert_eq!(task.network, None);
    }

    #[test]
    fn test_agent_update_partial() {
        let update: AgentUpdate = serde_json::from_str(r#"{"bio":"new"}"#).unwrap();
        assert_eq!(update.bio.as_deref(), Some("new"));
        assert!(update.name.is_none());
        assert!(update.capabilities.is_none());
    }
}
