//! HTTP 402 payment protocol for STX on Stacks.
//!
//! A resource server prices routes; clients pay by attaching a signed payment
//! to a retried request. Amounts are integer micro-STX carried as decimal
//! strings and compared with arbitrary precision.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   GET /api/premium     ┌──────────────────────────┐
//! │ PaymentClient│ ──────────────────────→│ PaymentGateLayer         │
//! │              │ ←────────────────────  │   └─ PaymentGate         │
//! │              │ 402 + X-PAYMENT-REQUIRED│       ├─ codec (decode) │
//! │  signer      │                        │       ├─ PaymentVerifier │
//! │              │ GET + X-PAYMENT        │       ├─ nonce registry  │
//! │              │ ──────────────────────→│       └─ Settler ───────────→ facilitator
//! │              │ 200 + X-PAYMENT-RESPONSE│                         │    /health /settle
//! └──────────────┘ ←────────────────────  └──────────────────────────┘
//! ```
//!
//! # Components
//!
//! - **[`types`]**: requirement, payload, receipt and facilitator messages
//! - **[`codec`]**: base64/JSON header codec and micro-STX conversion
//! - **[`verify`]**: pure, order-deterministic payment verification
//! - **[`signer`]**: payer-side payload signing
//! - **[`settler`]** / **[`facilitator`]**: settlement interface and its HTTP client
//! - **[`gate`]** / **[`middleware`]**: route pricing and the tower layer
//! - **[`client`]**: outbound wrapper that auto-pays within a ceiling
//!
//! # Usage
//!
//! ## As a Resource Server
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::{routing::get, Router};
//! use stackwork_types::StacksNetwork;
//! use stackwork_x402::{GateConfig, PaymentGate, PaymentGateLayer};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GateConfig::new(StacksNetwork::Testnet, "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM")
//!     .with_route("GET", "/api/premium", "5000", "Premium market data");
//! let gate = Arc::new(PaymentGate::new(config)?);
//!
//! let app: Router = Router::new()
//!     .route("/api/premium", get(|| async { "paid content" }))
//!     .layer(PaymentGateLayer::new(gate));
//! # Ok(())
//! # }
//! ```
//!
//! ## As a Client
//!
//! ```rust,no_run
//! use stackwork_x402::{OutboundRequest, PaymentClient, PaymentSigner, ReqwestTransport};
//!
//! # async fn example(key_hex: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let signer = PaymentSigner::from_hex(key_hex)?;
//! let client = PaymentClient::new(ReqwestTransport::new()?, signer, "100000")?;
//! let response = client
//!     .fetch(OutboundRequest::get("http://localhost:3000/api/premium"))
//!     .await?;
//! println!("{} {}", response.status, response.text());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod facilitator;
pub mod gate;
pub mod middleware;
pub mod settler;
pub mod signer;
pub mod types;
pub mod verify;

// Re-export main types
pub use client::{HttpTransport, OutboundRequest, OutboundResponse, PaymentClient, ReqwestTransport};
pub use codec::{decode, decode_payload, decode_requirement, encode, to_major_units, to_minor_units, DecodeError};
pub use error::{X402Error, X402Result};
pub use facilitator::FacilitatorClient;
pub use gate::{route_key, GateConfig, GateOutcome, GateStatus, PaymentGate, RoutePrice, VerifiedPayment};
pub use middleware::{PaymentGateLayer, PaymentGateService};
pub use settler::Settler;
pub use signer::PaymentSigner;
pub use types::{
    FacilitatorHealth, PaymentDetails, PaymentPayload, PaymentRequirement, SettlementReceipt,
    VerificationResult, HEADER_PAYMENT, HEADER_PAYMENT_REQUIRED, HEADER_PAYMENT_RESPONSE,
    SCHEME_EXACT, X402_VERSION,
};
pub use verify::{verify_payment, verify_signature, PaymentVerifier, VerifyFailure};
