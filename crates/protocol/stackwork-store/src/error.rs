//! Error types for the storage layer.

use stackwork_types::TaskStatus;
use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error while preparing the data directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Bid not found: {0}")]
    BidNotFound(String),

    /// A uniqueness constraint rejected the write.
    #[error("Duplicate {0}")]
    Duplicate(String),

    /// A conditional status update found the task in another state.
    #[error("Task {task_id} is {actual}")]
    StatusConflict { task_id: String, actual: TaskStatus },

    /// Schema initialization error.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Invalid data format.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Lock poisoning error.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StoreError {
    pub fn duplicate(what: impl Into<String>) -> Self {
        StoreError::Duplicate(what.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        StoreError::Schema(msg.into())
    }

    pub fn invalid_data(msg: impl Into<String>) -> Self {
        StoreError::InvalidData(msg.into())
    }

    pub fn lock_poisoned(msg: impl Into<String>) -> Self {
        StoreError::LockPoisoned(msg.into())
    }

    /// Map a UNIQUE / PRIMARY KEY violation to [`StoreError::Duplicate`].
    pub(crate) fn from_insert(err: rusqlite::Error, what: &str) -> Self {
        if is_unique_violation(&err) {
            StoreError::Duplicate(what.to_string())
        } else {
            StoreError::Database(err)
        }
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && (e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::StatusConflict {
            task_id: "task_1".into(),
            actual: TaskStatus::Assigned,
        };
        assert_eq!(err.to_string(), "Task task_1 is assigned");
        assert_eq!(
            StoreError::duplicate("bid for task_1").to_string(),
            "Duplicate bid for task_1"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let store_err: StoreError = io_err.into();
        assert!(matches!(store_err, StoreError::Io(_)));
    }

    #[test]
    fn test_unique_violation_detected() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (k TEXT PRIMARY KEY, v TEXT UNIQUE)")
            .unwrap();
        conn.execute("INSERT INTO t VALUES ('a', 'x')", []).unwrap();

        let err = conn.execute("INSERT INTO t VALUES ('b', 'x')", []).unwrap_err();
        assert!(matches!(
            StoreError::from_insert(err, "value"),
            StoreError::Duplicate(_)
        ));

        let err = conn.execute("INSERT INTO t VALUES ('a', 'y')", []).unwrap_err();
        assert!(matches!(
            StoreError::from_insert(err, "key"),
            StoreError::Duplicate(_)
        ));

        let err = conn.execute("INSERT INTO missing VALUES (1)", []).unwrap_err();
        assert!(matches!(
            StoreError::from_insert(err, "row"),
            StoreError::Database(_)
        ));
    }
}
