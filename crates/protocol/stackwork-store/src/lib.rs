//! SQLite storage for the Stackwork marketplace.
//!
//! One database holds the five record kinds (tasks, bids, agents, reviews,
//! messages). The store is the single source of truth: nothing above it
//! caches entity state between calls.
//!
//! # Storage Layout
//!
//! ```text
//! ~/.stackwork/
//! ├── config.toml      # CLI configuration
//! ├── identity.key     # Platform signing key (hex)
//! └── stackwork.db     # SQLite: tasks, bids, agents, reviews, messages
//! ```
//!
//! # Consistency
//!
//! - Status changes are conditional updates (`WHERE status IN (...)`); a
//!   writer that lost a race gets [`StoreError::StatusConflict`] carrying the
//!   status it found.
//! - Bid placement, task completion and review insertion each run in one
//!   transaction together with the rows they derive (task promotion, agent
//!   counters, agent rating).
//! - `(task, agent)` is unique for bids and for reviews; agent wallets are
//!   unique. Violations surface as [`StoreError::Duplicate`].
//!
//! # Example
//!
//! ```
//! use stackwork_store::{MarketState, TaskStore, TaskFilter};
//! use stackwork_types::{Task, TaskCategory, StacksNetwork};
//!
//! let state = MarketState::open_in_memory().unwrap();
//! let task = Task::new(
//!     "task_1", "Translate", "EN to DE", TaskCategory::Translation, 20_000,
//!     StacksNetwork::Testnet, "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM", 0,
//! );
//! state.tasks.insert_task(&task).unwrap();
//! assert_eq!(state.tasks.list_tasks(&TaskFilter::new()).unwrap().len(), 1);
//! ```

pub mod agents;
pub mod bids;
pub mod error;
pub mod messages;
pub mod reviews;
mod rows;
pub mod schema;
pub mod tasks;
pub mod traits;
pub mod types;

pub use error::{Result, StoreError};
pub use traits::{AgentStore, BidStore, MessageStore, ReviewStore, TaskStore};
pub use types::{Completion, MarketStats, TaskFilter};

pub use agents::SqliteAgentStore;
pub use bids::SqliteBidStore;
pub use messages::SqliteMessageStore;
pub use reviews::SqliteReviewStore;
pub use tasks::SqliteTaskStore;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::Connection;

/// Database file name inside the data directory.
pub const DATABASE_FILE: &str = "stackwork.db";

/// How long a writer waits on a locked database before failing.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Get the default data directory.
///
/// Priority:
/// 1. `STACKWORK_DATA_DIR` environment variable (if set)
/// 2. Platform-specific data directory
/// 3. Fallback to `$HOME/.stackwork`
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("STACKWORK_DATA_DIR") {
        return PathBuf::from(dir);
    }

    directories::ProjectDirs::from("io", "stackwork", "stackwork")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".stackwork")
        })
}

/// Configuration for [`MarketState`].
#[derive(Debug, Clone)]
pub struct MarketStateConfig {
    /// Base directory for all market data.
    pub base_dir: PathBuf,
    /// Database file path (default: base_dir/stackwork.db).
    pub database_path: Option<PathBuf>,
}

impl MarketStateConfig {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            database_path: None,
        }
    }

    pub fn with_database_path(mut self, path: impl AsRef<Path>) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.base_dir.join(DATABASE_FILE))
    }
}

/// All market stores over one shared connection.
pub struct MarketState {
    pub tasks: SqliteTaskStore,
    pub bids: SqliteBidStore,
    pub agents: SqliteAgentStore,
    pub reviews: SqliteReviewStore,
    pub messages: SqliteMessageStore,
    conn: Arc<Mutex<Connection>>,
    config: MarketStateConfig,
}

impl MarketState {
    /// Open (creating if needed) the database described by `config`.
    pub fn open(config: MarketStateConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.base_dir)?;

        let db_path = config.database_path();
        tracing::info!(db_path = %db_path.display(), "Opening market database");
        let conn = Connection::open(&db_path)?;

        Self::from_connection(conn, config)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, MarketStateConfig::new(":memory:"))
    }

    fn from_connection(conn: Connection, config: MarketStateConfig) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        schema::initialize_schema(&conn)?;
        let conn = Arc::new(Mutex::new(conn));

        Ok(Self {
            tasks: SqliteTaskStore::new(Arc::clone(&conn)),
            bids: SqliteBidStore::new(Arc::clone(&conn)),
            agents: SqliteAgentStore::new(Arc::clone(&conn)),
            reviews: SqliteReviewStore::new(Arc::clone(&conn)),
            messages: SqliteMessageStore::new(Arc::clone(&conn)),
            conn,
            config,
        })
    }

    pub fn config(&self) -> &MarketStateConfig {
        &self.config
    }

    /// Get a reference to the shared database connection.
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_database() {
        let temp = TempDir::new().unwrap();
        let config = MarketStateConfig::new(temp.path().join("nested"));
        let state = MarketState::open(config.clone()).unwrap();

        assert!(config.database_path().exists());
        assert_eq!(state.config().database_path(), config.database_path());
    }

    #[test]
    fn test_reopen_preserves_data() {
        use stackwork_types::{StacksNetwork, Task, TaskCategory};

        let temp = TempDir::new().unwrap();
        let task = Task::new(
            "task_persist",
            "Write docs",
            "README",
            TaskCategory::Writing,
            1_000_000,
            StacksNetwork::Testnet,
            "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM",
            1,
        );
        {
            let state = MarketState::open(MarketStateConfig::new(temp.path())).unwrap();
            state.tasks.insert_task(&task).unwrap();
        }
        let state = MarketState::open(MarketStateConfig::new(temp.path())).unwrap();
        assert_eq!(state.tasks.get_task("task_persist").unwrap(), Some(task));
    }

    #[test]
    fn test_custom_database_path() {
        let temp = TempDir::new().unwrap();
        let config =
            MarketStateConfig::new(temp.path()).with_database_path(temp.path().join("other.db"));
        MarketState::open(config).unwrap();
        assert!(temp.path().join("other.db").exists());
    }
}
