//! The `TaskEngine` struct and the checks shared by its operations.
//!
//! Operations live in sibling modules as `impl TaskEngine` blocks. Each one
//! reads the current entity, checks actor and status, then performs a single
//! conditional store write so that a concurrent change surfaces as
//! [`OpsError::WrongStatus`] instead of being overwritten.

use std::sync::Arc;

use stackwork_settle::Settlement;
use stackwork_store::{AgentStore, MarketState, TaskStore};
use stackwork_types::{Agent, Task, TaskStatus};

use crate::config::EngineConfig;
use crate::error::{OpsError, OpsResult};
use crate::events::{EventNotifier, MarketEvent, TracingNotifier};

/// Drives tasks through their lifecycle and triggers payouts on approval.
///
/// The engine holds no entity state of its own; the store is the single
/// source of truth and the engine is safe to share behind an `Arc`.
pub struct TaskEngine {
    pub(crate) state: MarketState,
    pub(crate) settlement: Arc<dyn Settlement>,
    pub(crate) notifier: Arc<dyn EventNotifier>,
    pub(crate) config: EngineConfig,
}

impl TaskEngine {
    /// Create an engine that logs events through `tracing`.
    pub fn new(
        state: MarketState,
        settlement: Arc<dyn Settlement>,
        config: EngineConfig,
    ) -> OpsResult<Self> {
        config.validate()?;
        Ok(Self {
            state,
            settlement,
            notifier: Arc::new(TracingNotifier),
            config,
        })
    }

    /// Replace the event notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn EventNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn state(&self) -> &MarketState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn settlement(&self) -> &Arc<dyn Settlement> {
        &self.settlement
    }

    // =========================================================================
    // Shared checks
    // =========================================================================

    pub(crate) fn load_task(&self, task_id: &str) -> OpsResult<Task> {
        self.state
            .tasks
            .get_task(task_id)?
            .ok_or_else(|| OpsError::TaskNotFound(task_id.to_string()))
    }

    pub(crate) fn load_agent(&self, agent_id: &str) -> OpsResult<Agent> {
        self.state
            .agents
            .get_agent(agent_id)?
            .ok_or_else(|| OpsError::AgentNotFound(agent_id.to_string()))
    }

    pub(crate) fn emit(&self, event: MarketEvent) {
        self.notifier.notify(event);
    }

    /// Best-effort `last_active_at` bump.
    pub(crate) fn touch_agent(&self, agent_id: &str, now: u64) {
        if let Err(e) = self.state.agents.touch(agent_id, now) {
            tracing::debug!(agent_id, error = %e, "Failed to update agent activity");
        }
    }
}

pub(crate) fn require_poster(task: &Task, caller: &str, action: &str) -> OpsResult<()> {
    if task.is_poster(caller) {
        Ok(())
    } else {
        Err(OpsError::wrong_actor(format!(
            "Only the task poster can {}",
            action
        )))
    }
}

pub(crate) fn require_assignee(task: &Task, agent_id: &str, action: &str) -> OpsResult<()> {
    if task.is_assigned_to(agent_id) {
        Ok(())
    } else {
        Err(OpsError::wrong_actor(format!(
            "Only the assigned agent can {}",
            action
        )))
    }
}

pub(crate) fn require_status(task: &Task, allowed: &[TaskStatus]) -> OpsResult<()> {
    if allowed.contains(&task.status) {
        Ok(())
    } else {
        Err(OpsError::wrong_status(&task.id, task.status, allowed))
    }
}

/// Trimmed, non-empty text no longer than `max` characters.
pub(crate) fn required_text(value: &str, field: &str, max: usize) -> OpsResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(OpsError::validation(format!("{} is required", field)));
    }
    bounded_text(trimmed, field, max)
}

/// Trimmed text no longer than `max` characters; may be empty.
pub(crate) fn bounded_text(value: &str, field: &str, max: usize) -> OpsResult<String> {
    let trimmed = value.trim();
    if trimmed.chars().count() > max {
        return Err(OpsError::validation(format!(
            "{} exceeds {} characters",
            field, max
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackwork_types::{StacksNetwork, TaskCategory};

    fn task() -> Task {
        let mut task = Task::new(
            "task_1",
            "t",
            "d",
            TaskCategory::Other,
            1_000,
            StacksNetwork::Testnet,
            "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM",
            0,
        );
        task.assigned_agent = Some("agent_1".into());
        task
    }

    #[test]
    fn test_actor_checks() {
        let task = task();
        assert!(require_poster(&task, "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM", "approve").is_ok());
        let err = require_poster(&task, "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG", "approve")
            .unwrap_err();
        assert_eq!(err.to_string(), "Only the task poster can approve");
        assert!(require_assignee(&task, "agent_1", "start").is_ok());
        assert_eq!(
            require_assignee(&task, "agent_2", "start").unwrap_err().http_status(),
            403
        );
    }

    #[test]
    fn test_status_check() {
        let task = task();
        assert!(require_status(&task, &[TaskStatus::Open]).is_ok());
        assert!(matches!(
            require_status(&task, &[TaskStatus::Submitted]),
            Err(OpsError::WrongStatus { actual: TaskStatus::Open, .. })
        ));
    }

    #[test]
    fn test_text_checks() {
        assert_eq!(required_text("  hi ", "Title", 10).unwrap(), "hi");
        assert_eq!(
            required_text("   ", "Title", 10).unwrap_err().to_string(),
            "Title is required"
        );
        assert!(bounded_text("abcdef", "Bio", 5).is_err());
        assert_eq!(bounded_text("", "Bio", 5).unwrap(), "");
    }
}
