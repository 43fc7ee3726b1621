//! FacilitatorSettlement against a mock facilitator.

use std::sync::Arc;
use std::time::Duration;

use stackwork_crypto::generate_identity;
use stackwork_settle::{FacilitatorSettlement, Payout, RetryPolicy, SettleError, Settlement};
use stackwork_test_utils::{MockSettler, AGENT_WALLET_A};
use stackwork_types::StacksNetwork;
use stackwork_x402::{verify_signature, PaymentSigner};

fn settlement(settler: &MockSettler) -> FacilitatorSettlement {
    FacilitatorSettlement::new(
        Arc::new(settler.clone()),
        PaymentSigner::new(generate_identity().0),
    )
    .with_retry(RetryPolicy::new(
        3,
        Duration::from_millis(1),
        Duration::from_millis(5),
    ))
    .with_timeout(Duration::from_secs(2))
}

fn payout() -> Payout {
    Payout::new("task_1", AGENT_WALLET_A, 19_800, StacksNetwork::Testnet)
}

#[tokio::test]
async fn test_payout_settles_to_agent() {
    let settler = MockSettler::new();
    let settlement = settlement(&settler);

    settlement.health().await.unwrap();
    let receipt = settlement.settle_payout(&payout()).await.unwrap();
    assert_eq!(receipt.tx_id.as_str(), format!("0x{:064x}", 1));
    assert!(!receipt.tx_id.is_simulated());
    assert_eq!(receipt.status, "pending");

    let settled = settler.settled();
    assert_eq!(settled.len(), 1);
    assert_eq!(settled[0].recipient_address, AGENT_WALLET_A);
    assert_eq!(settled[0].amount, "19800");
    assert_eq!(settler.health_calls(), 1);
}

#[tokio::test]
async fn test_transient_failures_retry_with_same_nonce() {
    let settler = MockSettler::new();
    settler.fail_next(2);
    let settlement = settlement(&settler);

    let receipt = settlement.settle_payout(&payout()).await.unwrap();
    assert!(!receipt.tx_id.is_simulated());
    assert_eq!(settler.settle_calls(), 3);

    // Only the final attempt settled, and it carried the original signature.
    let settled = settler.settled();
    assert_eq!(settled.len(), 1);
    assert!(verify_signature(&settled[0]));
}

#[tokio::test]
async fn test_retries_exhausted_is_network_error() {
    let settler = MockSettler::new();
    settler.fail_next(10);
    let settlement = settlement(&settler);

    let err = settlement.settle_payout(&payout()).await.unwrap_err();
    assert!(matches!(err, SettleError::Network(_)), "{err:?}");
    assert_eq!(settler.settle_calls(), 3);
}

#[tokio::test]
async fn test_rejection_is_not_retried() {
    let settler = MockSettler::new();
    settler.set_reject(true);
    let settlement = settlement(&settler);

    let err = settlement.settle_payout(&payout()).await.unwrap_err();
    assert!(matches!(err, SettleError::TransactionFailed(_)), "{err:?}");
    assert_eq!(settler.settle_calls(), 1);
}

#[tokio::test]
async fn test_unhealthy_facilitator_is_unavailable() {
    let settler = MockSettler::new();
    settler.set_unhealthy(true);

    let err = settlement(&settler).health().await.unwrap_err();
    assert!(matches!(err, SettleError::Unavailable(_)));
    assert!(err.to_string().contains("unavailable"));
}

#[tokio::test]
async fn test_slow_facilitator_times_out() {
    let settler = MockSettler::new();
    settler.set_delay(Duration::from_secs(5));
    let settlement = settlement(&settler)
        .with_retry(RetryPolicy::none())
        .with_timeout(Duration::from_millis(50));

    let err = settlement.settle_payout(&payout()).await.unwrap_err();
    assert!(matches!(err, SettleError::Timeout(_)), "{err:?}");
    assert!(settler.settled().is_empty());
}

#[tokio::test]
async fn test_invalid_payout_never_reaches_facilitator() {
    let settler = MockSettler::new();
    let settlement = settlement(&settler);

    let zero = Payout::new("task_1", AGENT_WALLET_A, 0, StacksNetwork::Testnet);
    let err = settlement.settle_payout(&zero).await.unwrap_err();
    assert!(matches!(err, SettleError::InvalidPayout(_)));

    let wrong_network = Payout::new("task_1", AGENT_WALLET_A, 100, StacksNetwork::Mainnet);
    assert!(settlement.settle_payout(&wrong_network).await.is_err());
    assert_eq!(settler.settle_calls(), 0);
}
