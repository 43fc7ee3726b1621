//! Approval: settlement outcomes and the atomic completion write.

use std::time::Duration;

use stackwork_ops::{MarketEvent, OpsError};
use stackwork_test_utils::*;
use stackwork_types::TaskStatus;

#[tokio::test]
async fn test_settled_payout_records_backend_tx_id() {
    let market = create_test_engine();
    let (task, _) = submitted_task(&market.engine, "0.020", AGENT_WALLET_A);

    let task = market.engine.approve_task(&task.id, POSTER).await.unwrap();
    assert_eq!(
        task.payment_tx_id.as_deref(),
        Some(format!("0x{:064x}", 1).as_str())
    );

    match market.events.events().last() {
        Some(MarketEvent::TaskCompleted { simulated, .. }) => assert!(!simulated),
        other => panic!("unexpected last event {other:?}"),
    }
}

#[tokio::test]
async fn test_unavailable_backend_falls_back_to_simulated() {
    let settlement = MockSettlement::new();
    settlement.set_unavailable(true);
    let market = create_test_engine_with(test_engine_config(), settlement);
    let (task, agent) = submitted_task(&market.engine, "0.020", AGENT_WALLET_A);

    let task = market.engine.approve_task(&task.id, POSTER).await.unwrap();
    let tx_id = task.payment_tx_id.unwrap();
    assert!(tx_id.starts_with("sim_"), "{tx_id}");
    assert_eq!(tx_id.len(), "sim_".len() + 32);
    assert_eq!(task.status, TaskStatus::Completed);

    // Health failed, so no payout was attempted.
    assert_eq!(market.settlement.payout_calls(), 0);
    assert_eq!(market.engine.get_agent(&agent.id).unwrap().tasks_completed, 1);
    match market.events.events().last() {
        Some(MarketEvent::TaskCompleted { simulated, .. }) => assert!(simulated),
        other => panic!("unexpected last event {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_payout_falls_back_to_simulated() {
    let market = create_test_engine_with(test_engine_config(), MockSettlement::new().with_failure());
    let (task, _) = submitted_task(&market.engine, "0.020", AGENT_WALLET_A);

    let task = market.engine.approve_task(&task.id, POSTER).await.unwrap();
    assert!(task.payment_tx_id.unwrap().starts_with("sim_"));
    assert_eq!(market.settlement.payout_calls(), 1);
}

#[tokio::test]
async fn test_slow_backend_times_out_to_simulated() {
    let settlement = MockSettlement::new();
    settlement.set_delay(Duration::from_secs(2));
    let config = test_engine_config().with_settlement_timeout(Duration::from_millis(50));
    let market = create_test_engine_with(config, settlement);
    let (task, _) = submitted_task(&market.engine, "0.020", AGENT_WALLET_A);

    let started = std::time::Instant::now();
    let task = market.engine.approve_task(&task.id, POSTER).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(task.payment_tx_id.unwrap().starts_with("sim_"));
    assert!(market.settlement.payouts().is_empty());
}

#[tokio::test]
async fn test_failure_without_fallback_leaves_task_submitted() {
    let config = test_engine_config().with_simulate_on_failure(false);
    let market = create_test_engine_with(config, MockSettlement::new().with_failure());
    let (task, agent) = submitted_task(&market.engine, "0.020", AGENT_WALLET_A);

    let err = market.engine.approve_task(&task.id, POSTER).await.unwrap_err();
    assert!(matches!(err, OpsError::Settlement(_)));
    assert_eq!(err.http_status(), 502);

    let task = market.engine.get_task(&task.id).unwrap();
    assert_eq!(task.status, TaskStatus::Submitted);
    assert_eq!(task.payment_tx_id, None);
    assert_eq!(market.engine.get_agent(&agent.id).unwrap().tasks_completed, 0);

    // Once the backend recovers, approval goes through.
    market.settlement.set_should_fail(false);
    let task = market.engine.approve_task(&task.id, POSTER).await.unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_timeout_without_fallback_is_settlement_error() {
    let settlement = MockSettlement::new();
    settlement.set_delay(Duration::from_secs(2));
    let config = test_engine_config()
        .with_settlement_timeout(Duration::from_millis(50))
        .with_simulate_on_failure(false);
    let market = create_test_engine_with(config, settlement);
    let (task, _) = submitted_task(&market.engine, "0.020", AGENT_WALLET_A);

    let err = market.engine.approve_task(&task.id, POSTER).await.unwrap_err();
    assert!(err.to_string().contains("timed out"), "{err}");
    assert_eq!(
        market.engine.get_task(&task.id).unwrap().status,
        TaskStatus::Submitted
    );
}

#[tokio::test]
async fn test_agent_credit_failure_rolls_back_completion() {
    let market = create_test_engine();
    let (task, agent) = submitted_task(&market.engine, "0.020", AGENT_WALLET_A);

    {
        let conn = market.engine.state().connection();
        let conn = conn.lock().unwrap();
        conn.execute_batch(
            "CREATE TRIGGER fail_credit BEFORE UPDATE OF tasks_completed ON agents
             BEGIN SELECT RAISE(ABORT, 'forced credit failure'); END;",
        )
        .unwrap();
    }

    let err = market.engine.approve_task(&task.id, POSTER).await.unwrap_err();
    assert!(matches!(err, OpsError::Store(_)), "{err:?}");
    assert_eq!(err.http_status(), 500);

    let stored = market.engine.get_task(&task.id).unwrap();
    assert_eq!(stored.status, TaskStatus::Submitted);
    assert_eq!(stored.payment_tx_id, None);
    assert_eq!(stored.platform_fee_micro, None);

    let agent = market.engine.get_agent(&agent.id).unwrap();
    assert_eq!(agent.tasks_completed, 0);
    assert_eq!(agent.total_earned_micro, 0);
    assert!(!market.events.names().contains(&"task_completed"));
}
