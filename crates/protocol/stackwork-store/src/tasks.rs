//! Task storage.

use rusqlite::{params, params_from_iter, Connection};
use std::sync::{Arc, Mutex};

use stackwork_crypto::Timestamp;
use stackwork_types::{Task, TaskStatus};

use crate::error::{Result, StoreError};
use crate::rows::{lock, read_task, status_list, task_conflict, task_from_row, TASK_COLUMNS};
use crate::traits::TaskStore;
use crate::types::{Completion, MarketStats, TaskFilter};

/// SQLite-based task store.
pub struct SqliteTaskStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTaskStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

impl TaskStore for SqliteTaskStore {
    fn insert_task(&self, task: &Task) -> Result<()> {
        let conn = lock(&self.conn)?;
        conn.execute(
            &format!(
                "INSERT INTO tasks ({}) VALUES
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                TASK_COLUMNS
            ),
            params![
                task.id,
                task.title,
                task.description,
                task.category.as_str(),
                task.bounty_micro as i64,
                task.status.as_str(),
                task.network.as_str(),
                task.poster_address,
                task.assigned_agent,
                task.result,
                task.payment_tx_id,
                task.platform_fee_micro.map(|f| f as i64),
                task.platform_wallet,
                task.rejection_reason,
                task.created_at as i64,
                task.updated_at as i64,
                task.completed_at.map(|t| t as i64),
            ],
        )
        .map_err(|e| StoreError::from_insert(e, &format!("task {}", task.id)))?;
        Ok(())
    }

    fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let conn = lock(&self.conn)?;
        read_task(&conn, id)
    }

    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let conn = lock(&self.conn)?;

        let mut clauses = Vec::new();
        let mut values: Vec<String> = Vec::new();
        let mut push = |column: &str, value: String| {
            values.push(value);
            clauses.push(format!("{} = ?{}", column, values.len()));
        };
        if let Some(status) = filter.status {
            push("status", status.as_str().to_string());
        }
        if let Some(category) = filter.category {
            push("category", category.as_str().to_string());
        }
        if let Some(poster) = &filter.poster {
            push("poster_address", poster.clone());
        }
        if let Some(agent) = &filter.assigned_agent {
            push("assigned_agent", agent.clone());
        }
        if let Some(network) = filter.network {
            push("network", network.as_str().to_string());
        }

        let mut sql = format!("SELECT {} FROM tasks", TASK_COLUMNS);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, id ASC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(params_from_iter(values.iter()), task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    fn transition(
        &self,
        id: &str,
        from: &[TaskStatus],
        to: TaskStatus,
        now: Timestamp,
    ) -> Result<Task> {
        let conn = lock(&self.conn)?;
        let changed = conn.execute(
            &format!(
                "UPDATE tasks SET status = ?1, updated_at = ?2
                 WHERE id = ?3 AND status IN ({})",
                status_list(from)
            ),
            params![to.as_str(), now as i64, id],
        )?;
        if changed == 0 {
            return Err(task_conflict(&conn, id));
        }
        read_task(&conn, id)?.ok_or_else(|| StoreError::TaskNotFound(id.to_string()))
    }

    fn assign(
        &self,
        id: &str,
        from: &[TaskStatus],
        agent_id: &str,
        now: Timestamp,
    ) -> Result<Task> {
        let conn = lock(&self.conn)?;
        let changed = conn.execute(
            &format!(
                "UPDATE tasks SET status = ?1, assigned_agent = ?2, updated_at = ?3
                 WHERE id = ?4 AND status IN ({})",
                status_list(from)
            ),
            params![TaskStatus::Assigned.as_str(), agent_id, now as i64, id],
        )?;
        if changed == 0 {
            return Err(task_conflict(&conn, id));
        }
        read_task(&conn, id)?.ok_or_else(|| StoreError::TaskNotFound(id.to_string()))
    }

    fn submit_result(
        &self,
        id: &str,
        agent_id: &str,
        result: &str,
        now: Timestamp,
    ) -> Result<Task> {
        let conn = lock(&self.conn)?;
        let changed = conn.execute(
            &format!(
                "UPDATE tasks SET status = ?1, result = ?2, updated_at = ?3
                 WHERE id = ?4 AND assigned_agent = ?5 AND status IN ({})",
                status_list(&[TaskStatus::Assigned, TaskStatus::InProgress])
            ),
            params![
                TaskStatus::Submitted.as_str(),
                result,
                now as i64,
                id,
                agent_id
            ],
        )?;
        if changed == 0 {
            return Err(task_conflict(&conn, id));
        }
        read_task(&conn, id)?.ok_or_else(|| StoreError::TaskNotFound(id.to_string()))
    }

    fn reject_result(&self, id: &str, reason: &str, now: Timestamp) -> Result<Task> {
        let conn = lock(&self.conn)?;
        let changed = conn.execute(
            "UPDATE tasks SET status = ?1, result = NULL, rejection_reason = ?2, updated_at = ?3
             WHERE id = ?4 AND status = ?5",
            params![
                TaskStatus::Assigned.as_str(),
                reason,
                now as i64,
                id,
                TaskStatus::Submitted.as_str()
            ],
        )?;
        if changed == 0 {
            return Err(task_conflict(&conn, id));
        }
        read_task(&conn, id)?.ok_or_else(|| StoreError::TaskNotFound(id.to_string()))
    }

    fn complete(&self, id: &str, completion: &Completion, now: Timestamp) -> Result<Task> {
        let mut conn = lock(&self.conn)?;
        // Dropping the transaction without commit rolls back both writes.
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE tasks SET status = ?1, platform_fee_micro = ?2, platform_wallet = ?3,
                 payment_tx_id = ?4, completed_at = ?5, updated_at = ?5
             WHERE id = ?6 AND status = ?7 AND assigned_agent = ?8",
            params![
                TaskStatus::Completed.as_str(),
                completion.fee_micro as i64,
                completion.platform_wallet,
                completion.tx_id,
                now as i64,
                id,
                TaskStatus::Submitted.as_str(),
                completion.agent_id,
            ],
        )?;
        if changed == 0 {
            return Err(task_conflict(&tx, id));
        }

        let credited = tx.execute(
            "UPDATE agents SET tasks_completed = tasks_completed + 1,
                 total_earned_micro = total_earned_micro + ?1, last_active_at = ?2
             WHERE id = ?3",
            params![completion.payout_micro as i64, now as i64, completion.agent_id],
        )?;
        if credited == 0 {
            return Err(StoreError::AgentNotFound(completion.agent_id.clone()));
        }

        let task = read_task(&tx, id)?.ok_or_else(|| StoreError::TaskNotFound(id.to_string()))?;
        tx.commit()?;
        Ok(task)
    }

    fn stats(&self) -> Result<MarketStats> {
        let conn = lock(&self.conn)?;
        let mut stats = MarketStats::default();

        for status in TaskStatus::ALL {
            stats.tasks_by_status.insert(status.as_str().to_string(), 0);
        }
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM tasks GROUP BY status")?;
        let counts = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for (status, count) in counts {
            stats.total_tasks += count as u64;
            stats.tasks_by_status.insert(status, count as u64);
        }

        // Summed here rather than with SQL SUM, which errors on i64 overflow.
        let paid_statuses = [TaskStatus::Completed.as_str(), TaskStatus::Closed.as_str()];
        let mut stmt = conn.prepare("SELECT status, bounty_micro, platform_fee_micro FROM tasks")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, Option<i64>>(2)?,
            ))
        })?;
        for row in rows {
            let (status, bounty, fee) = row?;
            let bounty = bounty as u64;
            stats.posted_volume_micro = stats.posted_volume_micro.saturating_add(bounty);
            if paid_statuses.contains(&status.as_str()) {
                stats.paid_volume_micro = stats.paid_volume_micro.saturating_add(bounty);
            }
            stats.fees_collected_micro = stats
                .fees_collected_micro
                .saturating_add(fee.unwrap_or_default() as u64);
        }

        let count = |table: &str| -> Result<u64> {
            let n: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
            Ok(n as u64)
        };
        stats.total_agents = count("agents")?;
        stats.total_bids = count("bids")?;
        stats.total_reviews = count("reviews")?;

        Ok(stats)
    }
}
