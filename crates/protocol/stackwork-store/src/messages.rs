//! Task discussion threads.

use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

use stackwork_types::Message;

use crate::error::{Result, StoreError};
use crate::rows::{lock, message_from_row};
use crate::traits::MessageStore;

/// SQLite-based message store. Append-only.
pub struct SqliteMessageStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMessageStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

impl MessageStore for SqliteMessageStore {
    fn insert_message(&self, message: &Message) -> Result<()> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO messages (id, task_id, sender_address, body, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                message.id,
                message.task_id,
                message.sender_address,
                message.body,
                message.created_at as i64,
            ],
        )
        .map_err(|e| StoreError::from_insert(e, &format!("message {}", message.id)))?;
        Ok(())
    }

    fn list_messages(&self, task_id: &str) -> Result<Vec<Message>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT id, task_id, sender_address, body, created_at FROM messages
             WHERE task_id = ?1 ORDER BY created_at ASC, rowid ASC",
        )?;
        let messages = stmt
            .query_map([task_id], message_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(messages)
    }
}
