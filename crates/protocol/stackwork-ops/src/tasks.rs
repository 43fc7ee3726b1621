//! Posting, browsing and retiring tasks.

use stackwork_crypto::{current_timestamp, random_id};
use stackwork_store::{MarketStats, TaskFilter, TaskStore};
use stackwork_types::{
    format_stx, parse_stx, validate_address, Task, TaskStatus, MAX_BOUNTY_MICRO,
    MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, TASK_ID_PREFIX,
};
use tracing::info;

use crate::engine::{require_poster, require_status, required_text, TaskEngine};
use crate::error::{OpsError, OpsResult};
use crate::events::MarketEvent;
use crate::requests::NewTask;

const CANCELLABLE: [TaskStatus; 2] = [TaskStatus::Open, TaskStatus::Bidding];

impl TaskEngine {
    /// Post a task. It starts `open`.
    pub fn create_task(&self, request: NewTask) -> OpsResult<Task> {
        let title = required_text(&request.title, "Title", MAX_TITLE_LENGTH)?;
        let description = required_text(&request.description, "Description", MAX_DESCRIPTION_LENGTH)?;
        let network = request.network.unwrap_or(self.config.network);
        validate_address(&request.poster_address, Some(network))?;

        let bounty_micro = parse_stx(&request.bounty)?;
        if bounty_micro == 0 {
            return Err(OpsError::validation("Bounty must be greater than zero"));
        }
        if bounty_micro > MAX_BOUNTY_MICRO {
            return Err(OpsError::validation(format!(
                "Bounty cannot exceed {} STX",
                format_stx(MAX_BOUNTY_MICRO)
            )));
        }

        let task = Task::new(
            random_id(TASK_ID_PREFIX),
            title,
            description,
            request.category,
            bounty_micro,
            network,
            request.poster_address,
            current_timestamp(),
        );
        self.state.tasks.insert_task(&task)?;

        info!(task_id = %task.id, bounty = %task.bounty, category = %task.category, "Task created");
        self.emit(MarketEvent::TaskCreated { task: task.clone() });
        Ok(task)
    }

    pub fn get_task(&self, task_id: &str) -> OpsResult<Task> {
        self.load_task(task_id)
    }

    /// Tasks matching `filter`, newest first.
    pub fn list_tasks(&self, filter: &TaskFilter) -> OpsResult<Vec<Task>> {
        Ok(self.state.tasks.list_tasks(filter)?)
    }

    /// Archive a completed task.
    pub fn close_task(&self, task_id: &str, poster_address: &str) -> OpsResult<Task> {
        let task = self.load_task(task_id)?;
        require_poster(&task, poster_address, "close this task")?;
        require_status(&task, &[TaskStatus::Completed])?;

        let task = self
            .state
            .tasks
            .transition(task_id, &[TaskStatus::Completed], TaskStatus::Closed, current_timestamp())
            .map_err(|e| OpsError::from_store(e, &[TaskStatus::Completed]))?;

        info!(task_id, "Task closed");
        self.emit(MarketEvent::TaskClosed { task: task.clone() });
        Ok(task)
    }

    /// Withdraw a task nobody has been assigned to.
    pub fn cancel_task(&self, task_id: &str, poster_address: &str) -> OpsResult<Task> {
        let task = self.load_task(task_id)?;
        require_poster(&task, poster_address, "cancel this task")?;
        require_status(&task, &CANCELLABLE)?;

        let task = self
            .state
            .tasks
            .transition(task_id, &CANCELLABLE, TaskStatus::Cancelled, current_timestamp())
            .map_err(|e| OpsError::from_store(e, &CANCELLABLE))?;

        info!(task_id, "Task cancelled");
        self.emit(MarketEvent::TaskCancelled { task: task.clone() });
        Ok(task)
    }

    /// Marketplace totals.
    pub fn platform_stats(&self) -> OpsResult<MarketStats> {
        Ok(self.state.tasks.stats()?)
    }
}
