//! Agent storage.

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use stackwork_crypto::Timestamp;
use stackwork_types::{Agent, TaskCategory};

use crate::error::{Result, StoreError};
use crate::rows::{agent_from_row, lock, read_agent, AGENT_COLUMNS};
use crate::traits::AgentStore;

/// SQLite-based agent store.
pub struct SqliteAgentStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAgentStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

impl AgentStore for SqliteAgentStore {
    fn insert_agent(&self, agent: &Agent) -> Result<()> {
        let capabilities = serde_json::to_string(&agent.capabilities)?;
        let conn = lock(&self.conn)?;
        conn.execute(
            &format!(
                "INSERT INTO agents ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                AGENT_COLUMNS
            ),
            params![
                agent.id,
                agent.name,
                agent.wallet_address,
                agent.bio,
                capabilities,
                agent.tasks_completed as i64,
                agent.total_earned_micro as i64,
                agent.avg_rating,
                agent.total_reviews as i64,
                agent.registered_at as i64,
                agent.last_active_at as i64,
            ],
        )
        .map_err(|e| {
            StoreError::from_insert(e, &format!("agent for wallet {}", agent.wallet_address))
        })?;
        Ok(())
    }

    fn get_agent(&self, id: &str) -> Result<Option<Agent>> {
        let conn = lock(&self.conn)?;
        read_agent(&conn, id)
    }

    fn get_agent_by_wallet(&self, wallet_address: &str) -> Result<Option<Agent>> {
        let conn = lock(&self.conn)?;
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM agents WHERE wallet_address = ?1", AGENT_COLUMNS),
                [wallet_address],
                agent_from_row,
            )
            .optional()?)
    }

    fn list_agents(&self, limit: Option<u32>) -> Result<Vec<Agent>> {
        let conn = lock(&self.conn)?;
        let mut sql = format!(
            "SELECT {} FROM agents
             ORDER BY avg_rating DESC, tasks_completed DESC, registered_at ASC",
            AGENT_COLUMNS
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        let mut stmt = conn.prepare(&sql)?;
        let agents = stmt
            .query_map([], agent_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(agents)
    }

    fn update_profile(
        &self,
        id: &str,
        name: &str,
        bio: &str,
        capabilities: &BTreeSet<TaskCategory>,
        now: Timestamp,
    ) -> Result<Agent> {
        let capabilities = serde_json::to_string(capabilities)?;
        let conn = lock(&self.conn)?;
        let changed = conn.execute(
            "UPDATE agents SET name = ?1, bio = ?2, capabilities = ?3, last_active_at = ?4
             WHERE id = ?5",
            params![name, bio, capabilities, now as i64, id],
        )?;
        if changed == 0 {
            return Err(StoreError::AgentNotFound(id.to_string()));
        }
        read_agent(&conn, id)?.ok_or_else(|| StoreError::AgentNotFound(id.to_string()))
    }

    fn touch(&self, id: &str, now: Timestamp) -> Result<()> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "UPDATE agents SET last_active_at = MAX(last_active_at, ?1) WHERE id = ?2",
            params![now as i64, id],
        )?;
        Ok(())
    }
}
