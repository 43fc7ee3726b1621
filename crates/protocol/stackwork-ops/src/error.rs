//! Error types for the task engine.
//!
//! Every engine operation returns [`OpsResult`]. Variants are grouped the way
//! a transport maps them: not-found (404), wrong actor (403), validation and
//! state conflicts (400), settlement (502) and storage (500).

use stackwork_store::StoreError;
use stackwork_types::{TaskStatus, TypesError};
use thiserror::Error;

/// Result type for engine operations.
pub type OpsResult<T> = std::result::Result<T, OpsError>;

/// Errors that can occur during marketplace operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OpsError {
    // =========================================================================
    // Not Found
    // =========================================================================
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Bid not found: {0}")]
    BidNotFound(String),

    // =========================================================================
    // State Conflicts
    // =========================================================================
    /// The task is not in a status that allows the operation.
    #[error("{}", wrong_status_message(task_id, *actual, expected))]
    WrongStatus {
        task_id: String,
        actual: TaskStatus,
        /// Statuses the operation accepts; empty when unknown.
        expected: Vec<TaskStatus>,
    },

    /// The caller is not allowed to perform the operation.
    #[error("{0}")]
    WrongActor(String),

    #[error("Agent {agent_id} already bid on task {task_id}")]
    DuplicateBid { task_id: String, agent_id: String },

    #[error("Agent {agent_id} was already reviewed for task {task_id}")]
    DuplicateReview { task_id: String, agent_id: String },

    #[error("An agent is already registered for wallet {0}")]
    DuplicateAgent(String),

    // =========================================================================
    // Validation
    // =========================================================================
    #[error("{0}")]
    Validation(String),

    #[error("Rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(i64),

    // =========================================================================
    // Collaborators
    // =========================================================================
    /// Payout settlement failed and simulation fallback is disabled.
    #[error("Settlement failed: {0}")]
    Settlement(String),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl OpsError {
    pub fn validation(msg: impl Into<String>) -> Self {
        OpsError::Validation(msg.into())
    }

    pub fn wrong_actor(msg: impl Into<String>) -> Self {
        OpsError::WrongActor(msg.into())
    }

    pub fn settlement(msg: impl Into<String>) -> Self {
        OpsError::Settlement(msg.into())
    }

    pub fn wrong_status(task_id: impl Into<String>, actual: TaskStatus, expected: &[TaskStatus]) -> Self {
        OpsError::WrongStatus {
            task_id: task_id.into(),
            actual,
            expected: expected.to_vec(),
        }
    }

    /// Convert a store error, naming the statuses the failed write accepted.
    pub fn from_store(err: StoreError, expected: &[TaskStatus]) -> Self {
        match OpsError::from(err) {
            OpsError::WrongStatus {
                task_id, actual, ..
            } => OpsError::wrong_status(task_id, actual, expected),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            OpsError::TaskNotFound(_) | OpsError::AgentNotFound(_) | OpsError::BidNotFound(_)
        )
    }

    /// HTTP status a transport should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            OpsError::TaskNotFound(_) | OpsError::AgentNotFound(_) | OpsError::BidNotFound(_) => {
                404
            }
            OpsError::WrongActor(_) => 403,
            OpsError::WrongStatus { .. }
            | OpsError::DuplicateBid { .. }
            | OpsError::DuplicateReview { .. }
            | OpsError::DuplicateAgent(_)
            | OpsError::Validation(_)
            | OpsError::RatingOutOfRange(_) => 400,
            OpsError::Settlement(_) => 502,
            OpsError::Store(_) => 500,
        }
    }

    /// `{"error": "..."}` response body.
    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.to_string() })
    }
}

impl From<StoreError> for OpsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TaskNotFound(id) => OpsError::TaskNotFound(id),
            StoreError::AgentNotFound(id) => OpsError::AgentNotFound(id),
            StoreError::BidNotFound(id) => OpsError::BidNotFound(id),
            StoreError::StatusConflict { task_id, actual } => OpsError::WrongStatus {
                task_id,
                actual,
                expected: Vec::new(),
            },
            other => OpsError::Store(other),
        }
    }
}

impl From<TypesError> for OpsError {
    fn from(err: TypesError) -> Self {
        OpsError::Validation(err.to_string())
    }
}

fn wrong_status_message(task_id: &str, actual: TaskStatus, expected: &[TaskStatus]) -> String {
    if expected.is_empty() {
        return format!("Task {} is {}", task_id, actual);
    }
    let expected: Vec<&str> = expected.iter().map(|s| s.as_str()).collect();
    format!(
        "Task {} is {}, expected {}",
        task_id,
        actual,
        expected.join(" or ")
    )
}
