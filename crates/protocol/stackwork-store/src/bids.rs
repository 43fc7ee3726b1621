//! Bid storage.

use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

use stackwork_crypto::Timestamp;
use stackwork_types::{Bid, Task, TaskStatus};

use crate::error::{Result, StoreError};
use crate::rows::{bid_from_row, lock, read_task, status_list, BID_COLUMNS};
use crate::traits::BidStore;

/// SQLite-based bid store.
pub struct SqliteBidStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBidStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

impl BidStore for SqliteBidStore {
    fn place_bid(&self, bid: &Bid, now: Timestamp) -> Result<Task> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        let task = read_task(&tx, &bid.task_id)?
            .ok_or_else(|| StoreError::TaskNotFound(bid.task_id.clone()))?;
        if !task.status.is_accepting_bids() {
            return Err(StoreError::StatusConflict {
                task_id: task.id,
                actual: task.status,
            });
        }

        tx.execute(
            &format!(
                "INSERT INTO bids ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                BID_COLUMNS
            ),
            params![
                bid.id,
                bid.task_id,
                bid.agent_id,
                bid.amount_micro as i64,
                bid.message,
                bid.estimated_time,
                bid.created_at as i64,
            ],
        )
        .map_err(|e| {
            StoreError::from_insert(
                e,
                &format!("bid by agent {} on task {}", bid.agent_id, bid.task_id),
            )
        })?;

        // Idempotent: concurrent first bids both land on `bidding`.
        tx.execute(
            &format!(
                "UPDATE tasks SET status = ?1, updated_at = ?2
                 WHERE id = ?3 AND status IN ({})",
                status_list(&[TaskStatus::Open, TaskStatus::Bidding])
            ),
            params![TaskStatus::Bidding.as_str(), now as i64, bid.task_id],
        )?;

        let task = read_task(&tx, &bid.task_id)?
            .ok_or_else(|| StoreError::TaskNotFound(bid.task_id.clone()))?;
        tx.commit()?;
        Ok(task)
    }

    fn get_bid(&self, id: &str) -> Result<Option<Bid>> {
        let conn = lock(&self.conn)?;
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM bids WHERE id = ?1", BID_COLUMNS),
                [id],
                bid_from_row,
            )
            .optional()?)
    }

    fn list_bids(&self, task_id: &str) -> Result<Vec<Bid>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM bids WHERE task_id = ?1 ORDER BY created_at ASC, id ASC",
            BID_COLUMNS
        ))?;
        let bids = stmt
            .query_map([task_id], bid_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(bids)
    }
}
