//! Facilitator client against a local HTTP facilitator.

use std::time::Duration;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use stackwork_crypto::generate_identity;
use stackwork_types::StacksNetwork;
use stackwork_x402::{
    codec, FacilitatorClient, PaymentRequirement, PaymentSigner, Settler, X402Error,
};

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn payload() -> stackwork_x402::PaymentPayload {
    let signer = PaymentSigner::new(generate_identity().0);
    let requirement = PaymentRequirement::stx(
        StacksNetwork::Testnet,
        "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM",
        "20000",
    );
    signer.sign(&requirement)
}

#[tokio::test]
async fn health_and_settle_success() {
    let router = Router::new()
        .route("/health", get(|| async { Json(json!({"status": "ok"})) }))
        .route(
            "/settle",
            post(|Json(body): Json<Value>| async move {
                // Echo the nonce back so the test can check the header was forwarded.
                let header = body["paymentHeader"].as_str().unwrap_or_default();
                let payload = codec::decode_payload(header).unwrap();
                Json(json!({
                    "success": true,
                    "txId": format!("0x{}", payload.nonce),
                    "status": "pending",
                }))
            }),
        );
    let url = spawn(router).await;
    let client = FacilitatorClient::new(&url).unwrap();

    assert!(client.health().await.unwrap().is_ok());

    let payload = payload();
    let receipt = Settler::settle(&client, &payload).await.unwrap();
    assert_eq!(receipt.tx_id, format!("0x{}", payload.nonce));
    assert_eq!(receipt.status, "pending");
}

#[tokio::test]
async fn settle_reported_failure_is_settlement_error() {
    let router = Router::new().route(
        "/settle",
        post(|| async { Json(json!({"success": false, "error": "insufficient balance"})) }),
    );
    let client = FacilitatorClient::new(&spawn(router).await).unwrap();

    match client.settle(&payload()).await {
        Err(X402Error::SettlementFailed { reason }) => assert_eq!(reason, "insufficient balance"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn verify_round_trip() {
    let router = Router::new().route(
        "/verify",
        post(|Json(body): Json<Value>| async move {
            let ok = body["paymentRequirements"]["amount"] == "20000";
            Json(json!({"isValid": ok}))
        }),
    );
    let client = FacilitatorClient::new(&spawn(router).await).unwrap();
    let payload = payload();
    let requirement = PaymentRequirement::stx(
        StacksNetwork::Testnet,
        "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM",
        "20000",
    );
    assert!(client.verify(&payload, &requirement).await.unwrap().is_valid);
}

#[tokio::test]
async fn slow_facilitator_times_out() {
    let router = Router::new().route(
        "/health",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({"status": "ok"}))
        }),
    );
    let client =
        FacilitatorClient::with_timeout(&spawn(router).await, Duration::from_millis(200)).unwrap();
    let err = client.health().await.unwrap_err();
    assert!(matches!(err, X402Error::FacilitatorNetwork(_)));
}

#[tokio::test]
async fn server_error_on_health_is_reported() {
    let router = Router::new().route(
        "/health",
        get(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "down") }),
    );
    let client = FacilitatorClient::new(&spawn(router).await).unwrap();
    assert!(client.health().await.is_err());
}
