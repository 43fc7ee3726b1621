//! SQL schema initialization.

use rusqlite::Connection;

use crate::error::Result;

/// Schema version for migration tracking.
pub const SCHEMA_VERSION: u32 = 1;

/// Initialize the database schema.
///
/// Idempotent. Enables WAL and foreign keys on the connection.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    // WAL for concurrent readers; in-memory databases report "memory" and ignore it.
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let current_version: Option<u32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    match current_version {
        None => {
            create_tables(conn)?;
            conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )?;
        }
        Some(version) if version > SCHEMA_VERSION => {
            return Err(crate::error::StoreError::schema(format!(
                "database schema v{} is newer than supported v{}",
                version, SCHEMA_VERSION
            )));
        }
        Some(_) => {}
    }

    Ok(())
}

fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS agents (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            wallet_address TEXT NOT NULL UNIQUE,
            bio TEXT NOT NULL,
            capabilities TEXT NOT NULL,
            tasks_completed INTEGER NOT NULL DEFAULT 0,
            total_earned_micro INTEGER NOT NULL DEFAULT 0,
            avg_rating REAL NOT NULL DEFAULT 0,
            total_reviews INTEGER NOT NULL DEFAULT 0,
            registered_at INTEGER NOT NULL,
            last_active_at INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            bounty_micro INTEGER NOT NULL,
            status TEXT NOT NULL,
            network TEXT NOT NULL,
            poster_address TEXT NOT NULL,
            assigned_agent TEXT REFERENCES agents(id),
            result TEXT,
            payment_tx_id TEXT,
            platform_fee_micro INTEGER,
            platform_wallet TEXT,
            rejection_reason TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            completed_at INTEGER
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tasks_poster ON tasks(poster_address)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tasks_assigned ON tasks(assigned_agent)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bids (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL REFERENCES tasks(id),
            agent_id TEXT NOT NULL REFERENCES agents(id),
            amount_micro INTEGER NOT NULL,
            message TEXT NOT NULL,
            estimated_time TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE(task_id, agent_id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS reviews (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL REFERENCES tasks(id),
            agent_id TEXT NOT NULL REFERENCES agents(id),
            reviewer_address TEXT NOT NULL,
            rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
            comment TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE(task_id, agent_id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_reviews_agent ON reviews(agent_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL REFERENCES tasks(id),
            sender_address TEXT NOT NULL,
            body TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_messages_task ON messages(task_id, created_at)",
        [],
    )?;

    Ok(())
}
