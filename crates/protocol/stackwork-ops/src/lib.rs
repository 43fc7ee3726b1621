//! Task lifecycle engine for the Stackwork marketplace.
//!
//! This crate combines the store, the settlement layer and the domain types
//! into the operations posters and agents perform on tasks.
//!
//! # Module Organization
//!
//! - [`error`] - Operation error types and their HTTP mapping
//! - [`config`] - Engine configuration
//! - [`events`] - Event notifiers (tracing, webhook)
//! - [`requests`] - Caller-supplied inputs
//! - [`engine`] - The `TaskEngine` struct
//! - `tasks`, `bidding`, `work`, `approval`, `reviews`, `agents`, `messages` -
//!   operation implementations
//!
//! # Lifecycle
//!
//! ```text
//! open → bidding → assigned → in-progress → submitted → completed → closed
//! open/bidding → cancelled
//! submitted → assigned   (rejection)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stackwork_ops::{EngineConfig, NewAgent, NewBid, NewTask, TaskEngine};
//! use stackwork_settle::SimulatedSettlement;
//! use stackwork_store::MarketState;
//! use stackwork_types::StacksNetwork;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let poster = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
//! let config = EngineConfig::new(StacksNetwork::Testnet, "ST2JHG361ZXG51QTKY2NQCVBPPRRE2KZB1HR05NNC");
//! let engine = TaskEngine::new(
//!     MarketState::open_in_memory()?,
//!     Arc::new(SimulatedSettlement::new()),
//!     config,
//! )?;
//!
//! let agent = engine.register_agent(NewAgent::new("scribe", "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG"))?;
//! let task = engine.create_task(NewTask::new("Summarize", "Summarize the paper", "0.020", poster))?;
//! let bid = engine.place_bid(&task.id, NewBid::new(&agent.id, "0.018"))?;
//! engine.accept_bid(&task.id, &bid.id, poster)?;
//! engine.start_task(&task.id, &agent.id)?;
//! engine.submit_result(&task.id, &agent.id, "Done.")?;
//! let task = engine.approve_task(&task.id, poster).await?;
//! assert_eq!(task.platform_fee.as_deref(), Some("0.000200"));
//! # Ok(())
//! # }
//! ```
//!
//! # Operations Overview
//!
//! ## Tasks
//! - **create_task** / **get_task** / **list_tasks**
//! - **cancel_task**: poster withdraws an unassigned task
//! - **close_task**: poster archives a completed task
//! - **platform_stats**: counts and volumes
//!
//! ## Bidding
//! - **place_bid**: one bid per agent and task; promotes `open` to `bidding`
//! - **accept_bid**: poster assigns the bidder
//! - **accept_task**: a registered agent claims the task directly
//!
//! ## Work
//! - **start_task**, **submit_result**, **reject_result**
//! - **approve_task**: fee split, payout and atomic completion
//!
//! ## Agents, reviews, messages
//! - **register_agent** / **update_agent** / **get_agent** / **list_agents**
//! - **submit_review** / **list_agent_reviews** / **list_task_reviews**
//! - **post_message** / **list_messages**

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod requests;

mod agents;
mod approval;
mod bidding;
mod messages;
mod reviews;
mod tasks;
mod work;

pub use config::{EngineConfig, DEFAULT_SETTLEMENT_TIMEOUT};
pub use engine::TaskEngine;
pub use error::{OpsError, OpsResult};
pub use events::{
    EventNotifier, MarketEvent, NoopNotifier, TracingNotifier, WebhookEnvelope, WebhookNotifier,
    DEFAULT_WEBHOOK_TIMEOUT,
};
pub use requests::{AgentUpdate, NewAgent, NewBid, NewReview, NewTask};

// Re-exported for callers building filters and reading stats.
pub use stackwork_store::{MarketStats, TaskFilter};
