//! Row mapping shared by the SQLite stores.

use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};
use stackwork_types::{format_stx, Agent, Amount, Bid, Message, Review, Task, TaskStatus};

use crate::error::{Result, StoreError};

pub(crate) const TASK_COLUMNS: &str = "id, title, description, category, bounty_micro, status, \
     network, poster_address, assigned_agent, result, payment_tx_id, platform_fee_micro, \
     platform_wallet, rejection_reason, created_at, updated_at, completed_at";

pub(crate) const AGENT_COLUMNS: &str = "id, name, wallet_address, bio, capabilities, \
     tasks_completed, total_earned_micro, avg_rating, total_reviews, registered_at, last_active_at";

pub(crate) const BID_COLUMNS: &str =
    "id, task_id, agent_id, amount_micro, message, estimated_time, created_at";

pub(crate) const REVIEW_COLUMNS: &str =
    "id, task_id, agent_id, reviewer_address, rating, comment, created_at";

pub(crate) fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))
}

/// SQL list literal for an `IN (...)` clause. Values come from the status enum.
pub(crate) fn status_list(statuses: &[TaskStatus]) -> String {
    statuses
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_text<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn get_u64(row: &Row, idx: usize) -> rusqlite::Result<u64> {
    Ok(row.get::<_, i64>(idx)? as u64)
}

pub(crate) fn task_from_row(row: &Row) -> rusqlite::Result<Task> {
    let bounty_micro: Amount = get_u64(row, 4)?;
    let fee_micro: Option<Amount> = row.get::<_, Option<i64>>(11)?.map(|f| f as Amount);

    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: parse_text(row, 3)?,
        bounty: format_stx(bounty_micro),
        bounty_micro,
        status: parse_text(row, 5)?,
        network: parse_text(row, 6)?,
        poster_address: row.get(7)?,
        assigned_agent: row.get(8)?,
        result: row.get(9)?,
        payment_tx_id: row.get(10)?,
        platform_fee: fee_micro.map(format_stx),
        platform_fee_micro: fee_micro,
        platform_wallet: row.get(12)?,
        rejection_reason: row.get(13)?,
        created_at: get_u64(row, 14)?,
        updated_at: get_u64(row, 15)?,
        completed_at: row.get::<_, Option<i64>>(16)?.map(|t| t as u64),
    })
}

pub(crate) fn agent_from_row(row: &Row) -> rusqlite::Result<Agent> {
    let capabilities_json: String = row.get(4)?;
    let capabilities = serde_json::from_str(&capabilities_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    let total_earned_micro: Amount = get_u64(row, 6)?;

    Ok(Agent {
        id: row.get(0)?,
        name: row.get(1)?,
        wallet_address: row.get(2)?,
        bio: row.get(3)?,
        capabilities,
        tasks_completed: get_u64(row, 5)?,
        total_earned: format_stx(total_earned_micro),
        total_earned_micro,
        avg_rating: row.get(7)?,
        total_reviews: get_u64(row, 8)?,
        registered_at: get_u64(row, 9)?,
        last_active_at: get_u64(row, 10)?,
    })
}

pub(crate) fn bid_from_row(row: &Row) -> rusqlite::Result<Bid> {
    let amount_micro: Amount = get_u64(row, 3)?;
    Ok(Bid {
        id: row.get(0)?,
        task_id: row.get(1)?,
        agent_id: row.get(2)?,
        amount: format_stx(amount_micro),
        amount_micro,
        message: row.get(4)?,
        estimated_time: row.get(5)?,
        created_at: get_u64(row, 6)?,
    })
}

pub(crate) fn review_from_row(row: &Row) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get(0)?,
        task_id: row.get(1)?,
        agent_id: row.get(2)?,
        reviewer_address: row.get(3)?,
        rating: row.get(4)?,
        comment: row.get(5)?,
        created_at: get_u64(row, 6)?,
    })
}

pub(crate) fn message_from_row(row: &Row) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        task_id: row.get(1)?,
        sender_address: row.get(2)?,
        body: row.get(3)?,
        created_at: get_u64(row, 4)?,
    })
}

pub(crate) fn read_task(conn: &Connection, id: &str) -> Result<Option<Task>> {
    let sql = format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS);
    Ok(conn.query_row(&sql, [id], task_from_row).optional()?)
}

pub(crate) fn read_agent(conn: &Connection, id: &str) -> Result<Option<Agent>> {
    let sql = format!("SELECT {} FROM agents WHERE id = ?1", AGENT_COLUMNS);
    Ok(conn.query_row(&sql, [id], agent_from_row).optional()?)
}

/// Explain why a conditional task update matched no row.
pub(crate) fn task_conflict(conn: &Connection, id: &str) -> StoreError {
    match read_task(conn, id) {
        Ok(Some(task)) => StoreError::StatusConflict {
            task_id: task.id,
            actual: task.status,
        },
        Ok(None) => StoreError::TaskNotFound(id.to_string()),
        Err(e) => e,
    }
}
