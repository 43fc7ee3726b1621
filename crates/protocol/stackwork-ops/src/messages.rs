//! Task discussion threads.

use stackwork_crypto::{current_timestamp, random_id};
use stackwork_store::MessageStore;
use stackwork_types::{validate_address, Message, MAX_MESSAGE_LENGTH, MESSAGE_ID_PREFIX};
use tracing::debug;

use crate::engine::{required_text, TaskEngine};
use crate::error::OpsResult;
use crate::events::MarketEvent;

impl TaskEngine {
    /// Append a message to a task's thread.
    pub fn post_message(&self, task_id: &str, sender_address: &str, body: &str) -> OpsResult<Message> {
        let task = self.load_task(task_id)?;
        validate_address(sender_address, Some(task.network))?;
        let body = required_text(body, "Message", MAX_MESSAGE_LENGTH)?;

        let message = Message {
            id: random_id(MESSAGE_ID_PREFIX),
            task_id: task.id,
            sender_address: sender_address.to_string(),
            body,
            created_at: current_timestamp(),
        };
        self.state.messages.insert_message(&message)?;

        debug!(task_id, message_id = %message.id, "Message posted");
        self.emit(MarketEvent::MessagePosted {
            message: message.clone(),
        });
        Ok(message)
    }

    /// A task's thread, oldest first.
    pub fn list_messages(&self, task_id: &str) -> OpsResult<Vec<Message>> {
        self.load_task(task_id)?;
        Ok(self.state.messages.list_messages(task_id)?)
    }
}
