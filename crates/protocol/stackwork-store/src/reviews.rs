//! Review storage and rating recompute.

use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

use stackwork_types::{Agent, Review};

use crate::error::{Result, StoreError};
use crate::rows::{lock, read_agent, review_from_row, REVIEW_COLUMNS};
use crate::traits::ReviewStore;

/// SQLite-based review store.
pub struct SqliteReviewStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteReviewStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn list_where(&self, column: &str, value: &str) -> Result<Vec<Review>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM reviews WHERE {} = ?1 ORDER BY created_at ASC, id ASC",
            REVIEW_COLUMNS, column
        ))?;
        let reviews = stmt
            .query_map([value], review_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(reviews)
    }
}

impl ReviewStore for SqliteReviewStore {
    fn insert_review(&self, review: &Review) -> Result<Agent> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        tx.execute(
            &format!(
                "INSERT INTO reviews ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                REVIEW_COLUMNS
            ),
            params![
                review.id,
                review.task_id,
                review.agent_id,
                review.reviewer_address,
                review.rating,
                review.comment,
                review.created_at as i64,
            ],
        )
        .map_err(|e| {
            StoreError::from_insert(
                e,
                &format!("review of agent {} on task {}", review.agent_id, review.task_id),
            )
        })?;

        // Recomputed from every row, never incrementally.
        let changed = tx.execute(
            "UPDATE agents SET
                 avg_rating = (SELECT AVG(rating) FROM reviews WHERE agent_id = ?1),
                 total_reviews = (SELECT COUNT(*) FROM reviews WHERE agent_id = ?1)
             WHERE id = ?1",
            [&review.agent_id],
        )?;
        if changed == 0 {
            return Err(StoreError::AgentNotFound(review.agent_id.clone()));
        }

        let agent = read_agent(&tx, &review.agent_id)?
            .ok_or_else(|| StoreError::AgentNotFound(review.agent_id.clone()))?;
        tx.commit()?;
        Ok(agent)
    }

    fn list_reviews_for_agent(&self, agent_id: &str) -> Result<Vec<Review>> {
        self.list_where("agent_id", agent_id)
    }

    fn list_reviews_for_task(&self, task_id: &str) -> Result<Vec<Review>> {
        self.list_where("task_id", task_id)
    }
}
