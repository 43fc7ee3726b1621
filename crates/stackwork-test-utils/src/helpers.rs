//! Helper functions for creating test fixtures.
//!
//! Provides well-formed testnet addresses, a pre-wired `TaskEngine` over a
//! temporary database, and shortcuts that drive a task to a given status.

use stackwork_ops::{EngineConfig, NewAgent, NewBid, NewTask, TaskEngine};
use stackwork_store::{MarketState, MarketStateConfig};
use stackwork_types::{Agent, StacksNetwork, Task};
use std::sync::Arc;
use tempfile::TempDir;

use crate::{MockSettlement, RecordingNotifier};

/// Task poster used by the helpers.
pub const POSTER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

/// Wallet of the first test agent.
pub const AGENT_WALLET_A: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";

/// Wallet of the second test agent.
pub const AGENT_WALLET_B: &str = "ST2JHG361ZXG51QTKY2NQCVBPPRRE2KZB1HR05NNC";

/// Fee recipient configured on test engines.
pub const PLATFORM_WALLET: &str = "ST3AM1A56AK2C1XAFJ4115ZSV26EB49BVQ10MGCS0";

/// A valid mainnet address, for cross-network checks.
pub const MAINNET_ADDRESS: &str = "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7";

/// Engine configuration used by [`create_test_engine`].
pub fn test_engine_config() -> EngineConfig {
    EngineConfig::new(StacksNetwork::Testnet, PLATFORM_WALLET)
}

/// Everything a lifecycle test needs. Keep `temp_dir` alive for the test.
pub struct TestMarket {
    pub engine: TaskEngine,
    pub settlement: MockSettlement,
    pub events: RecordingNotifier,
    pub temp_dir: TempDir,
}

/// Create an engine on a temporary database with a mock settlement backend.
pub fn create_test_engine() -> TestMarket {
    create_test_engine_with(test_engine_config(), MockSettlement::new())
}

/// Create an engine with a specific configuration and settlement mock.
pub fn create_test_engine_with(config: EngineConfig, settlement: MockSettlement) -> TestMarket {
    let temp_dir = TempDir::new().unwrap();
    let state = MarketState::open(MarketStateConfig::new(temp_dir.path())).unwrap();
    let events = RecordingNotifier::new();
    let engine = TaskEngine::new(state, Arc::new(settlement.clone()), config)
        .unwrap()
        .with_notifier(Arc::new(events.clone()));

    TestMarket {
        engine,
        settlement,
        events,
        temp_dir,
    }
}

/// Register an agent with a default bio.
pub fn register_agent(engine: &TaskEngine, name: &str, wallet: &str) -> Agent {
    engine
        .register_agent(NewAgent::new(name, wallet).with_bio(format!("{} does careful work", name)))
        .unwrap()
}

/// Post a task from [`POSTER`] with the given bounty.
pub fn post_task(engine: &TaskEngine, bounty: &str) -> Task {
    engine
        .create_task(NewTask::new(
            "Summarize a paper",
            "Write a 200 word summary of the attached paper",
            bounty,
            POSTER,
        ))
        .unwrap()
}

/// Drive a fresh task to `submitted` through bid, accept, start and submit.
///
/// Returns the task and the agent that did it.
pub fn submitted_task(engine: &TaskEngine, bounty: &str, wallet: &str) -> (Task, Agent) {
    let agent = register_agent(engine, "worker", wallet);
    let task = post_task(engine, bounty);
    let bid = engine
        .place_bid(&task.id, NewBid::new(&agent.id, bounty))
        .unwrap();
    engine.accept_bid(&task.id, &bid.id, POSTER).unwrap();
    engine.start_task(&task.id, &agent.id).unwrap();
    let task = engine
        .submit_result(&task.id, &agent.id, "Here is the summary.")
        .unwrap();
    (task, agent)
}
