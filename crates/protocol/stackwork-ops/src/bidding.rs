//! Bidding and assignment.
//!
//! The first bid on an `open` task promotes it to `bidding` inside the same
//! store transaction as the insert. Assignment is a compare-and-set on
//! `open`/`bidding`, so of two racing accepts exactly one wins.

use stackwork_crypto::{current_timestamp, random_id};
use stackwork_store::{BidStore, StoreError, TaskStore};
use stackwork_types::{
    format_stx, parse_stx, Bid, Task, TaskStatus, BID_ID_PREFIX, MAX_BOUNTY_MICRO,
    MAX_MESSAGE_LENGTH,
};
use tracing::{debug, info};

use crate::engine::{bounded_text, require_poster, require_status, TaskEngine};
use crate::error::{OpsError, OpsResult};
use crate::events::MarketEvent;
use crate::requests::NewBid;

const ASSIGNABLE: [TaskStatus; 2] = [TaskStatus::Open, TaskStatus::Bidding];

/// Longest accepted `estimated_time`.
const MAX_ESTIMATE_LENGTH: usize = 100;

impl TaskEngine {
    /// Place a bid. Each agent may bid once per task.
    pub fn place_bid(&self, task_id: &str, request: NewBid) -> OpsResult<Bid> {
        let task = self.load_task(task_id)?;
        require_status(&task, &ASSIGNABLE)?;
        let agent = self.load_agent(&request.agent_id)?;

        let amount_micro = parse_stx(&request.amount)?;
        if amount_micro == 0 {
            return Err(OpsError::validation("Bid amount must be greater than zero"));
        }
        if amount_micro > MAX_BOUNTY_MICRO {
            return Err(OpsError::validation(format!(
                "Bid cannot exceed {} STX",
                format_stx(MAX_BOUNTY_MICRO)
            )));
        }
        if amount_micro > task.bounty_micro && !self.config.allow_bids_above_bounty {
            return Err(OpsError::validation(format!(
                "Bid of {} STX exceeds the bounty of {} STX",
                format_stx(amount_micro),
                task.bounty
            )));
        }

        let now = current_timestamp();
        let bid = Bid {
            id: random_id(BID_ID_PREFIX),
            task_id: task.id.clone(),
            agent_id: agent.id.clone(),
            amount: format_stx(amount_micro),
            amount_micro,
            message: bounded_text(&request.message, "Message", MAX_MESSAGE_LENGTH)?,
            estimated_time: bounded_text(&request.estimated_time, "Estimated time", MAX_ESTIMATE_LENGTH)?,
            created_at: now,
        };

        let task = self.state.bids.place_bid(&bid, now).map_err(|e| match e {
            StoreError::Duplicate(_) => OpsError::DuplicateBid {
                task_id: bid.task_id.clone(),
                agent_id: bid.agent_id.clone(),
            },
            other => OpsError::from_store(other, &ASSIGNABLE),
        })?;
        self.touch_agent(&agent.id, now);

        info!(
            task_id = %task.id,
            bid_id = %bid.id,
            agent_id = %agent.id,
            amount = %bid.amount,
            status = %task.status,
            "Bid placed"
        );
        self.emit(MarketEvent::BidPlaced { bid: bid.clone() });
        Ok(bid)
    }

    /// Bids on a task, oldest first.
    pub fn list_bids(&self, task_id: &str) -> OpsResult<Vec<Bid>> {
        self.load_task(task_id)?;
        Ok(self.state.bids.list_bids(task_id)?)
    }

    /// Assign the task to the agent behind `bid_id`. Poster only.
    pub fn accept_bid(&self, task_id: &str, bid_id: &str, poster_address: &str) -> OpsResult<Task> {
        let task = self.load_task(task_id)?;
        require_poster(&task, poster_address, "accept bids")?;
        require_status(&task, &ASSIGNABLE)?;

        let bid = self
            .state
            .bids
            .get_bid(bid_id)?
            .ok_or_else(|| OpsError::BidNotFound(bid_id.to_string()))?;
        if bid.task_id != task.id {
            return Err(OpsError::validation(format!(
                "Bid {} does not belong to task {}",
                bid_id, task_id
            )));
        }
        let agent = self.load_agent(&bid.agent_id)?;

        self.assign(&task, &agent.id, Some(&bid))
    }

    /// Direct assignment without a bid. Any registered agent may claim.
    pub fn accept_task(&self, task_id: &str, agent_id: &str) -> OpsResult<Task> {
        let task = self.load_task(task_id)?;
        require_status(&task, &ASSIGNABLE)?;
        let agent = self.load_agent(agent_id)?;

        self.assign(&task, &agent.id, None)
    }

    fn assign(&self, task: &Task, agent_id: &str, bid: Option<&Bid>) -> OpsResult<Task> {
        let now = current_timestamp();
        let task = self
            .state
            .tasks
            .assign(&task.id, &ASSIGNABLE, agent_id, now)
            .map_err(|e| OpsError::from_store(e, &ASSIGNABLE))?;
        self.touch_agent(agent_id, now);

        match bid {
            Some(bid) => info!(task_id = %task.id, agent_id, bid_id = %bid.id, "Bid accepted"),
            None => info!(task_id = %task.id, agent_id, "Task claimed"),
        }
        debug!(task_id = %task.id, status = %task.status, "Task assigned");
        self.emit(MarketEvent::TaskAssigned { task: task.clone() });
        Ok(task)
    }
}
