//! Notifications emitted after engine mutations.
//!
//! Notifiers are fire-and-forget: [`EventNotifier::notify`] never blocks and
//! never reports failure back to the engine. [`WebhookNotifier`] posts each
//! event to one URL on a spawned task and only logs delivery problems.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use stackwork_crypto::{current_timestamp, Timestamp};
use stackwork_types::{Agent, Bid, Message, Review, Task};
use tracing::{debug, info, warn};

use crate::error::{OpsError, OpsResult};

/// Default delivery timeout of [`WebhookNotifier`].
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// A committed marketplace change.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MarketEvent {
    TaskCreated { task: Task },
    BidPlaced { bid: Bid },
    TaskAssigned { task: Task },
    TaskStarted { task: Task },
    ResultSubmitted { task: Task },
    ResultRejected { task: Task },
    TaskCompleted { task: Task, simulated: bool },
    TaskClosed { task: Task },
    TaskCancelled { task: Task },
    ReviewSubmitted { review: Review },
    AgentRegistered { agent: Agent },
    AgentUpdated { agent: Agent },
    MessagePosted { message: Message },
}

impl MarketEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            MarketEvent::TaskCreated { .. } => "task_created",
            MarketEvent::BidPlaced { .. } => "bid_placed",
            MarketEvent::TaskAssigned { .. } => "task_assigned",
            MarketEvent::TaskStarted { .. } => "task_started",
            MarketEvent::ResultSubmitted { .. } => "result_submitted",
            MarketEvent::ResultRejected { .. } => "result_rejected",
            MarketEvent::TaskCompleted { .. } => "task_completed",
            MarketEvent::TaskClosed { .. } => "task_closed",
            MarketEvent::TaskCancelled { .. } => "task_cancelled",
            MarketEvent::ReviewSubmitted { .. } => "review_submitted",
            MarketEvent::AgentRegistered { .. } => "agent_registered",
            MarketEvent::AgentUpdated { .. } => "agent_updated",
            MarketEvent::MessagePosted { .. } => "message_posted",
        }
    }

    /// Task the event concerns, if any.
    pub fn task_id(&self) -> Option<&str> {
        match self {
            MarketEvent::TaskCreated { task }
            | MarketEvent::TaskAssigned { task }
            | MarketEvent::TaskStarted { task }
            | MarketEvent::ResultSubmitted { task }
            | MarketEvent::ResultRejected { task }
            | MarketEvent::TaskCompleted { task, .. }
            | MarketEvent::TaskClosed { task }
            | MarketEvent::TaskCancelled { task } => Some(&task.id),
            MarketEvent::BidPlaced { bid } => Some(&bid.task_id),
            MarketEvent::ReviewSubmitted { review } => Some(&review.task_id),
            MarketEvent::MessagePosted { message } => Some(&message.task_id),
            MarketEvent::AgentRegistered { .. } | MarketEvent::AgentUpdated { .. } => None,
        }
    }
}

/// Receives engine events.
pub trait EventNotifier: Send + Sync {
    fn notify(&self, event: MarketEvent);
}

/// Logs every event at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl EventNotifier for TracingNotifier {
    fn notify(&self, event: MarketEvent) {
        info!(event = event.name(), task_id = ?event.task_id(), "Market event");
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl EventNotifier for NoopNotifier {
    fn notify(&self, _event: MarketEvent) {}
}

/// JSON body posted by [`WebhookNotifier`].
#[derive(Debug, Clone, Serialize)]
pub struct WebhookEnvelope {
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub event: MarketEvent,
}

/// Posts events to a single webhook endpoint.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
    bearer_token: Option<String>,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> OpsResult<Self> {
        Self::with_timeout(url, DEFAULT_WEBHOOK_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> OpsResult<Self> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(OpsError::validation(format!(
                "Webhook URL must be http(s): {}",
                url
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OpsError::validation(format!("Failed to create webhook client: {}", e)))?;
        Ok(Self {
            client,
            url,
            bearer_token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every delivery.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl EventNotifier for WebhookNotifier {
    fn notify(&self, event: MarketEvent) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(event = event.name(), "No async runtime, webhook not delivered");
            return;
        };

        let name = event.name();
        let envelope = WebhookEnvelope {
            timestamp: current_timestamp(),
            event,
        };
        let mut request = self.client.post(&self.url).json(&envelope);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        let url = self.url.clone();

        handle.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(event = name, url = %url, "Webhook delivered");
                }
                Ok(response) => {
                    warn!(event = name, url = %url, status = %response.status(), "Webhook rejected");
                }
                Err(e) => {
                    warn!(event = name, url = %url, error = %e, "Webhook delivery failed");
                }
            }
        });
    }
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("url", &self.url)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
