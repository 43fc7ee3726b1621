//! Work on an assigned task: start, submit, reject.

use stackwork_crypto::current_timestamp;
use stackwork_store::TaskStore;
use stackwork_types::{Task, TaskStatus, MAX_MESSAGE_LENGTH, MAX_RESULT_LENGTH};
use tracing::info;

use crate::engine::{require_assignee, require_poster, require_status, required_text, TaskEngine};
use crate::error::{OpsError, OpsResult};
use crate::events::MarketEvent;

const SUBMITTABLE: [TaskStatus; 2] = [TaskStatus::Assigned, TaskStatus::InProgress];

impl TaskEngine {
    pub fn start_task(&self, task_id: &str, agent_id: &str) -> OpsResult<Task> {
        let task = self.load_task(task_id)?;
        require_assignee(&task, agent_id, "start this task")?;
        require_status(&task, &[TaskStatus::Assigned])?;

        let now = current_timestamp();
        let task = self
            .state
            .tasks
            .transition(task_id, &[TaskStatus::Assigned], TaskStatus::InProgress, now)
            .map_err(|e| OpsError::from_store(e, &[TaskStatus::Assigned]))?;
        self.touch_agent(agent_id, now);

        info!(task_id, agent_id, "Task started");
        self.emit(MarketEvent::TaskStarted { task: task.clone() });
        Ok(task)
    }

    /// Store the assignee's result and hand the task to the poster.
    pub fn submit_result(&self, task_id: &str, agent_id: &str, result: &str) -> OpsResult<Task> {
        let result = required_text(result, "Result", MAX_RESULT_LENGTH)?;
        let task = self.load_task(task_id)?;
        require_assignee(&task, agent_id, "submit a result")?;
        require_status(&task, &SUBMITTABLE)?;

        let now = current_timestamp();
        let task = self
            .state
            .tasks
            .submit_result(task_id, agent_id, &result, now)
            .map_err(|e| OpsError::from_store(e, &SUBMITTABLE))?;
        self.touch_agent(agent_id, now);

        info!(task_id, agent_id, bytes = result.len(), "Result submitted");
        self.emit(MarketEvent::ResultSubmitted { task: task.clone() });
        Ok(task)
    }

    /// Send a submitted result back. The task returns to `assigned` with the
    /// result cleared and the reason recorded.
    pub fn reject_result(&self, task_id: &str, poster_address: &str, reason: &str) -> OpsResult<Task> {
        let reason = required_text(reason, "Rejection reason", MAX_MESSAGE_LENGTH)?;
        let task = self.load_task(task_id)?;
        require_poster(&task, poster_address, "reject a result")?;
        require_status(&task, &[TaskStatus::Submitted])?;

        let task = self
            .state
            .tasks
            .reject_result(task_id, &reason, current_timestamp())
            .map_err(|e| OpsError::from_store(e, &[TaskStatus::Submitted]))?;

        info!(task_id, reason = %reason, "Result rejected");
        self.emit(MarketEvent::ResultRejected { task: task.clone() });
        Ok(task)
    }
}
