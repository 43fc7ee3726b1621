//! Agent registration and profiles.

use stackwork_crypto::{current_timestamp, random_id};
use stackwork_store::{AgentStore, StoreError};
use stackwork_types::{
    format_stx, validate_address, Agent, AGENT_ID_PREFIX, MAX_AGENT_NAME_LENGTH, MAX_BIO_LENGTH,
};
use tracing::info;

use crate::engine::{bounded_text, required_text, TaskEngine};
use crate::error::{OpsError, OpsResult};
use crate::events::MarketEvent;
use crate::requests::{AgentUpdate, NewAgent};

impl TaskEngine {
    /// Register an agent. Wallets are unique across agents.
    pub fn register_agent(&self, request: NewAgent) -> OpsResult<Agent> {
        let name = required_text(&request.name, "Name", MAX_AGENT_NAME_LENGTH)?;
        let bio = bounded_text(&request.bio, "Bio", MAX_BIO_LENGTH)?;
        validate_address(&request.wallet_address, Some(self.config.network))?;

        let now = current_timestamp();
        let agent = Agent {
            id: random_id(AGENT_ID_PREFIX),
            name,
            wallet_address: request.wallet_address,
            bio,
            capabilities: request.capabilities,
            tasks_completed: 0,
            total_earned: format_stx(0),
            total_earned_micro: 0,
            avg_rating: 0.0,
            total_reviews: 0,
            registered_at: now,
            last_active_at: now,
        };

        self.state.agents.insert_agent(&agent).map_err(|e| match e {
            StoreError::Duplicate(_) => OpsError::DuplicateAgent(agent.wallet_address.clone()),
            other => other.into(),
        })?;

        info!(agent_id = %agent.id, wallet = %agent.wallet_address, "Agent registered");
        self.emit(MarketEvent::AgentRegistered {
            agent: agent.clone(),
        });
        Ok(agent)
    }

    /// Edit a profile. Only the agent's own wallet may do so.
    pub fn update_agent(
        &self,
        agent_id: &str,
        wallet_address: &str,
        update: AgentUpdate,
    ) -> OpsResult<Agent> {
        let agent = self.load_agent(agent_id)?;
        if agent.wallet_address != wallet_address {
            return Err(OpsError::wrong_actor("Only the agent's own wallet can update its profile"));
        }

        let name = match &update.name {
            Some(name) => required_text(name, "Name", MAX_AGENT_NAME_LENGTH)?,
            None => agent.name,
        };
        let bio = match &update.bio {
            Some(bio) => bounded_text(bio, "Bio", MAX_BIO_LENGTH)?,
            None => agent.bio,
        };
        let capabilities = update.capabilities.unwrap_or(agent.capabilities);

        let agent = self.state.agents.update_profile(
            agent_id,
            &name,
            &bio,
            &capabilities,
            current_timestamp(),
        )?;

        info!(agent_id, "Agent profile updated");
        self.emit(MarketEvent::AgentUpdated {
            agent: agent.clone(),
        });
        Ok(agent)
    }

    pub fn get_agent(&self, agent_id: &str) -> OpsResult<Agent> {
        self.load_agent(agent_id)
    }

    pub fn find_agent_by_wallet(&self, wallet_address: &str) -> OpsResult<Agent> {
        self.state
            .agents
            .get_agent_by_wallet(wallet_address)?
            .ok_or_else(|| OpsError::AgentNotFound(wallet_address.to_string()))
    }

    /// Agents ordered by rating, then completed tasks.
    pub fn list_agents(&self, limit: Option<u32>) -> OpsResult<Vec<Agent>> {
        Ok(self.state.agents.list_agents(limit)?)
    }
}
