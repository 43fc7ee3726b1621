//! Enumeration types for the marketplace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Lifecycle state of a task.
///
/// ```text
/// open → bidding → assigned → in-progress → submitted → completed → closed
/// open/bidding → cancelled
/// submitted → assigned   (poster rejection)
/// ```
///
/// `closed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Posted, no bids yet
    #[default]
    Open,
    /// At least one bid received
    Bidding,
    /// An agent has been assigned
    Assigned,
    /// The assigned agent started work
    InProgress,
    /// A result awaits the poster's decision
    Submitted,
    /// Approved and paid
    Completed,
    /// Archived by the poster after completion
    Closed,
    /// Withdrawn before assignment
    Cancelled,
}

impl TaskStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [TaskStatus; 8] = [
        TaskStatus::Open,
        TaskStatus::Bidding,
        TaskStatus::Assigned,
        TaskStatus::InProgress,
        TaskStatus::Submitted,
        TaskStatus::Completed,
        TaskStatus::Closed,
        TaskStatus::Cancelled,
    ];

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::Bidding => "bidding",
            TaskStatus::Assigned => "assigned",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Submitted => "submitted",
            TaskStatus::Completed => "completed",
            TaskStatus::Closed => "closed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    ///
    /// `bidding → bidding` is allowed so that the promotion on a new bid
    /// stays idempotent.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Open, Bidding)
                | (Open, Assigned)
                | (Open, Cancelled)
                | (Bidding, Bidding)
                | (Bidding, Assigned)
                | (Bidding, Cancelled)
                | (Assigned, InProgress)
                | (Assigned, Submitted)
                | (InProgress, Submitted)
                | (Submitted, Completed)
                | (Submitted, Assigned)
                | (Completed, Closed)
        )
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Closed | TaskStatus::Cancelled)
    }

    /// Whether new bids and assignments are accepted.
    pub fn is_accepting_bids(&self) -> bool {
        matches!(self, TaskStatus::Open | TaskStatus::Bidding)
    }

    /// Whether the task can receive a review.
    pub fn is_reviewable(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Closed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TypesError::UnknownStatus(s.to_string()))
    }
}

/// Kind of work a task asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskCategory {
    Research,
    Writing,
    Coding,
    DataAnalysis,
    Design,
    Translation,
    Testing,
    #[default]
    Other,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 8] = [
        TaskCategory::Research,
        TaskCategory::Writing,
        TaskCategory::Coding,
        TaskCategory::DataAnalysis,
        TaskCategory::Design,
        TaskCategory::Translation,
        TaskCategory::Testing,
        TaskCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Research => "research",
            TaskCategory::Writing => "writing",
            TaskCategory::Coding => "coding",
            TaskCategory::DataAnalysis => "data-analysis",
            TaskCategory::Design => "design",
            TaskCategory::Translation => "translation",
            TaskCategory::Testing => "testing",
            TaskCategory::Other => "other",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskCategory {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| TypesError::UnknownCategory(s.to_string()))
    }
}

/// Stacks network a task settles on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StacksNetwork {
    Mainnet,
    #[default]
    Testnet,
}

impl StacksNetwork {
    /// Short name stored on tasks (`mainnet` / `testnet`).
    pub fn as_str(&self) -> &'static str {
        match self {
            StacksNetwork::Mainnet => "mainnet",
            StacksNetwork::Testnet => "testnet",
        }
    }

    /// Network identifier used in payment requirements.
    pub fn payment_network(&self) -> &'static str {
        match self {
            StacksNetwork::Mainnet => crate::NETWORK_STACKS_MAINNET,
            StacksNetwork::Testnet => crate::NETWORK_STACKS_TESTNET,
        }
    }

    /// Chain id of the network.
    pub fn chain_id(&self) -> u32 {
        match self {
            StacksNetwork::Mainnet => crate::CHAIN_ID_MAINNET,
            StacksNetwork::Testnet => crate::CHAIN_ID_TESTNET,
        }
    }

    /// Version characters accepted at position 1 of an address.
    pub(crate) fn address_versions(&self) -> [char; 2] {
        match self {
            StacksNetwork::Mainnet => ['P', 'M'],
            StacksNetwork::Testnet => ['T', 'N'],
        }
    }
}

impl fmt::Display for StacksNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StacksNetwork {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" | "stacks:mainnet" => Ok(StacksNetwork::Mainnet),
            "testnet" | "stacks:testnet" => Ok(StacksNetwork::Testnet),
            other => Err(TypesError::UnknownNetwork(other.to_string())),
        }
    }
}
