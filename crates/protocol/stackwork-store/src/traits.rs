//! Trait definitions for storage components.
//!
//! Writes that must hold across rows (bid + promotion, completion + agent
//! counters, review + rating recompute) are single trait methods so that an
//! implementation can run them in one transaction.

use stackwork_crypto::Timestamp;
use stackwork_types::{Agent, Bid, Message, Review, Task, TaskCategory, TaskStatus};
use std::collections::BTreeSet;

use crate::error::Result;
use crate::types::{Completion, MarketStats, TaskFilter};

// =============================================================================
// Tasks
// =============================================================================

pub trait TaskStore {
    fn insert_task(&self, task: &Task) -> Result<()>;

    fn get_task(&self, id: &str) -> Result<Option<Task>>;

    /// Tasks matching `filter`, newest first.
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// Move a task to `to` if its status is one of `from`.
    ///
    /// Fails with `StatusConflict` when the stored status is not in `from`
    /// at the time of the write.
    fn transition(
        &self,
        id: &str,
        from: &[TaskStatus],
        to: TaskStatus,
        now: Timestamp,
    ) -> Result<Task>;

    /// Assign the task to `agent_id` if its status is one of `from`.
    fn assign(&self, id: &str, from: &[TaskStatus], agent_id: &str, now: Timestamp)
        -> Result<Task>;

    /// Store a result from the assignee and move to `submitted`.
    fn submit_result(&self, id: &str, agent_id: &str, result: &str, now: Timestamp)
        -> Result<Task>;

    /// Send a submitted task back to `assigned`, clearing the result.
    fn reject_result(&self, id: &str, reason: &str, now: Timestamp) -> Result<Task>;

    /// Atomically complete a submitted task and credit the agent.
    fn complete(&self, id: &str, completion: &Completion, now: Timestamp) -> Result<Task>;

    fn stats(&self) -> Result<MarketStats>;
}

// =============================================================================
// Bids
// =============================================================================

pub trait BidStore {
    /// Insert a bid and promote an `open` task to `bidding`.
    ///
    /// Returns the task after promotion. Fails with `Duplicate` on a second
    /// bid by the same agent and with `StatusConflict` when the task no
    /// longer accepts bids.
    fn place_bid(&self, bid: &Bid, now: Timestamp) -> Result<Task>;

    fn get_bid(&self, id: &str) -> Result<Option<Bid>>;

    /// Bids on a task, oldest first.
    fn list_bids(&self, task_id: &str) -> Result<Vec<Bid>>;
}

// =============================================================================
// Agents
// =============================================================================

pub trait AgentStore {
    fn insert_agent(&self, agent: &Agent) -> Result<()>;

    fn get_agent(&self, id: &str) -> Result<Option<Agent>>;

    fn get_agent_by_wallet(&self, wallet_address: &str) -> Result<Option<Agent>>;

    /// Agents ordered by rating, then completed tasks.
    fn list_agents(&self, limit: Option<u32>) -> Result<Vec<Agent>>;

    /// Replace the editable profile fields.
    fn update_profile(
        &self,
        id: &str,
        name: &str,
        bio: &str,
        capabilities: &BTreeSet<TaskCategory>,
        now: Timestamp,
    ) -> Result<Agent>;

    /// Bump `last_active_at`.
    fn touch(&self, id: &str, now: Timestamp) -> Result<()>;
}

// =============================================================================
// Reviews
// =============================================================================

pub trait ReviewStore {
    /// Insert a review and recompute the agent's rating from every review row.
    fn insert_review(&self, review: &Review) -> Result<Agent>;

    fn list_reviews_for_agent(&self, agent_id: &str) -> Result<Vec<Review>>;

    fn list_reviews_for_task(&self, task_id: &str) -> Result<Vec<Review>>;
}

// =============================================================================
// Messages
// =============================================================================

pub trait MessageStore {
    fn insert_message(&self, message: &Message) -> Result<()>;

    /// Thread of a task, oldest first.
    fn list_messages(&self, task_id: &str) -> Result<Vec<Message>>;
}
