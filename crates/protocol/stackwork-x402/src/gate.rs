//! Payment gate for paid routes.
//!
//! The `PaymentGate` decides what happens to a request on a route:
//! 1. Check whether `"METHOD PATH"` is priced
//! 2. Produce the requirement when no payment was sent
//! 3. Decode and verify the payment, signature included
//! 4. Reserve the payer's nonce (replay prevention)
//! 5. Settle through the configured [`Settler`] when `settle_immediately` is set
//!
//! It is transport-agnostic; [`crate::middleware`] maps each [`GateOutcome`]
//! onto an HTTP response.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stackwork_crypto::current_timestamp;
use stackwork_types::{validate_address, StacksNetwork};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::codec::{self, parse_minor, DecodeError};
use crate::error::{X402Error, X402Result};
use crate::settler::Settler;
use crate::types::{PaymentDetails, PaymentPayload, PaymentRequirement, SettlementReceipt};
use crate::verify::PaymentVerifier;

/// Default cap on remembered `(publicKey, nonce)` pairs.
pub const DEFAULT_MAX_TRACKED_NONCES: usize = 100_000;

/// Default time budget for immediate settlement.
pub const DEFAULT_SETTLEMENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Reason reported when a payer reuses a nonce.
pub const REASON_NONCE_REUSED: &str = "Nonce already used";

/// Reason reported when every tracked nonce is still live.
pub const REASON_NONCE_CAPACITY: &str = "Too many outstanding payments, retry later";

/// Build the route key used in [`GateConfig::routes`].
pub fn route_key(method: &str, path: &str) -> String {
    format!("{} {}", method.to_ascii_uppercase(), path)
}

/// Price of a guarded route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePrice {
    /// Minimum payment in micro-STX.
    pub price: String,
    pub description: String,
}

/// Gate configuration. Passed explicitly; there is no process-wide state.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub network: StacksNetwork,
    /// Address that receives payments.
    pub recipient_address: String,
    /// `"METHOD PATH"` → price.
    pub routes: HashMap<String, RoutePrice>,
    /// Settle each accepted payment before invoking the handler.
    pub settle_immediately: bool,
    pub settlement_timeout: Duration,
    pub max_tracked_nonces: usize,
}

impl GateConfig {
    pub fn new(network: StacksNetwork, recipient_address: impl Into<String>) -> Self {
        Self {
            network,
            recipient_address: recipient_address.into(),
            routes: HashMap::new(),
            settle_immediately: false,
            settlement_timeout: DEFAULT_SETTLEMENT_TIMEOUT,
            max_tracked_nonces: DEFAULT_MAX_TRACKED_NONCES,
        }
    }

    /// Guard `method path` behind a payment of `price` micro-STX.
    pub fn with_route(
        mut self,
        method: &str,
        path: &str,
        price: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.routes.insert(
            route_key(method, path),
            RoutePrice {
                price: price.into(),
                description: description.into(),
            },
        );
        self
    }

    pub fn with_immediate_settlement(mut self, enabled: bool) -> Self {
        self.settle_immediately = enabled;
        self
    }

    pub fn with_settlement_timeout(mut self, timeout: Duration) -> Self {
        self.settlement_timeout = timeout;
        self
    }

    /// Look up the price of a route.
    pub fn route(&self, method: &str, path: &str) -> Option<&RoutePrice> {
        self.routes.get(&route_key(method, path))
    }

    /// Check the recipient address and every route price.
    pub fn validate(&self) -> X402Result<()> {
        validate_address(&self.recipient_address, Some(self.network))
            .map_err(|e| X402Error::Internal(format!("gate recipient: {}", e)))?;
        for (key, route) in &self.routes {
            if parse_minor(&route.price).is_none() {
                return Err(X402Error::InvalidAmount {
                    value: format!("{} for route {}", route.price, key),
                });
            }
        }
        Ok(())
    }
}

/// A payment the gate accepted. Inserted into request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayment {
    /// Route key the payment was made for.
    pub route: String,
    pub payload: PaymentPayload,
    pub details: PaymentDetails,
    /// Present when the payment was settled before the handler ran.
    pub receipt: Option<SettlementReceipt>,
}

/// What the gate decided for one request.
#[derive(Debug, Clone)]
pub enum GateOutcome {
    /// Route is not priced; pass through untouched.
    Unprotected,
    /// Priced route, no payment header.
    PaymentRequired(PaymentRequirement),
    /// Header present but undecodable.
    InvalidHeader {
        requirement: PaymentRequirement,
        error: DecodeError,
    },
    /// Payment decoded but rejected.
    Rejected {
        requirement: PaymentRequirement,
        reason: String,
    },
    /// Payment verified but settlement failed; the nonce is released.
    SettlementFailed {
        requirement: PaymentRequirement,
        reason: String,
    },
    /// Payment accepted.
    Accepted(VerifiedPayment),
}

/// Result of reserving a nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reservation {
    Reserved,
    Reused,
    Full,
}

/// Remembers consumed `(publicKey, nonce)` pairs.
///
/// Entries keep the payload's expiry so that, at capacity, expired pairs are
/// dropped first. Expired payloads are rejected by the verifier anyway. Live
/// entries are never evicted; a full registry refuses new payments instead.
#[derive(Debug)]
struct NonceRegistry {
    used: RwLock<HashMap<(String, u64), u64>>,
    capacity: usize,
}

impl NonceRegistry {
    fn new(capacity: usize) -> Self {
        Self {
            used: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Atomically reserve a nonce.
    async fn try_reserve(&self, public_key: &str, nonce: u64, expires_at: Option<u64>) -> Reservation {
        let mut used = self.used.write().await;
        let key = (public_key.to_string(), nonce);
        if used.contains_key(&key) {
            return Reservation::Reused;
        }

        if used.len() >= self.capacity {
            let now = current_timestamp();
            used.retain(|_, expiry| *expiry >= now);
            if used.len() >= self.capacity {
                warn!(capacity = self.capacity, "Nonce registry full of unexpired entries");
                return Reservation::Full;
            }
            debug!(remaining = used.len(), "Pruned expired nonces");
        }

        used.insert(key, expires_at.unwrap_or(u64::MAX));
        Reservation::Reserved
    }

    async fn release(&self, public_key: &str, nonce: u64) {
        self.used
            .write()
            .await
            .remove(&(public_key.to_string(), nonce));
    }

    async fn len(&self) -> usize {
        self.used.read().await.len()
    }
}

/// Gate counters for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateStatus {
    pub guarded_routes: usize,
    pub settle_immediately: bool,
    pub accepted: u64,
    pub rejected: u64,
    pub settled: u64,
    pub tracked_nonces: usize,
}

/// Payment gate shared by every request of a server.
pub struct PaymentGate {
    config: GateConfig,
    verifier: PaymentVerifier,
    settler: Option<Arc<dyn Settler>>,
    nonces: NonceRegistry,
    accepted: AtomicU64,
    rejected: AtomicU64,
    settled: AtomicU64,
}

impl PaymentGate {
    /// Create a gate from configuration.
    pub fn new(config: GateConfig) -> X402Result<Self> {
        config.validate()?;

        // Nonces are keyed by the payer's key, so both must be authenticated.
        Ok(Self {
            nonces: NonceRegistry::new(config.max_tracked_nonces),
            config,
            verifier: PaymentVerifier::new().with_signature_check(),
            settler: None,
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            settled: AtomicU64::new(0),
        })
    }

    /// Attach the settler used when `settle_immediately` is enabled.
    pub fn with_settler(mut self, settler: Arc<dyn Settler>) -> Self {
        self.settler = Some(settler);
        self
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// The requirement advertised for a priced route.
    pub fn requirement_for(&self, method: &str, path: &str) -> Option<PaymentRequirement> {
        let key = route_key(method, path);
        self.config
            .routes
            .get(&key)
            .map(|route| self.build_requirement(&key, route))
    }

    fn build_requirement(&self, key: &str, route: &RoutePrice) -> PaymentRequirement {
        PaymentRequirement::stx(
            self.config.network,
            self.config.recipient_address.clone(),
            route.price.clone(),
        )
        .with_description(route.description.clone())
        .with_resource(key)
    }

    /// Decide what to do with a request.
    pub async fn evaluate(&self, method: &str, path: &str, header: Option<&str>) -> GateOutcome {
        let key = route_key(method, path);
        let Some(route) = self.config.routes.get(&key) else {
            return GateOutcome::Unprotected;
        };
        let requirement = self.build_requirement(&key, route);

        let Some(header) = header else {
            debug!(route = %key, "Payment required");
            return GateOutcome::PaymentRequired(requirement);
        };

        let payload = match codec::decode_payload(header) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(route = %key, error = %error, "Undecodable payment header");
                self.rejected.fetch_add(1, Ordering::Relaxed);
                return GateOutcome::InvalidHeader { requirement, error };
            }
        };

        let result = self.verifier.verify(&payload, &requirement).await;
        let details = match result.details {
            Some(details) if result.valid => details,
            _ => {
                let reason = result
                    .reason
                    .unwrap_or_else(|| "Payment verification failed".to_string());
                warn!(route = %key, reason = %reason, "Payment rejected");
                self.rejected.fetch_add(1, Ordering::Relaxed);
                return GateOutcome::Rejected {
                    requirement,
                    reason,
                };
            }
        };

        let reason = match self
            .nonces
            .try_reserve(&payload.public_key, payload.nonce, payload.expires_at)
            .await
        {
            Reservation::Reserved => None,
            Reservation::Reused => {
                warn!(route = %key, nonce = payload.nonce, "Payment nonce replayed");
                Some(REASON_NONCE_REUSED)
            }
            Reservation::Full => Some(REASON_NONCE_CAPACITY),
        };
        if let Some(reason) = reason {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            return GateOutcome::Rejected {
                requirement,
                reason: reason.to_string(),
            };
        }

        let receipt = if self.config.settle_immediately {
            match self.settle(&payload).await {
                Ok(receipt) => Some(receipt),
                Err(e) => {
                    self.nonces.release(&payload.public_key, payload.nonce).await;
                    warn!(route = %key, error = %e, "Payment settlement failed");
                    return GateOutcome::SettlementFailed {
                        requirement,
                        reason: e.to_string(),
                    };
                }
            }
        } else {
            None
        };

        self.accepted.fetch_add(1, Ordering::Relaxed);
        info!(
            route = %key,
            amount = %details.amount,
            nonce = details.nonce,
            tx_id = ?receipt.as_ref().map(|r| r.tx_id.as_str()),
            "Payment accepted"
        );

        GateOutcome::Accepted(VerifiedPayment {
            route: key,
            payload,
            details,
            receipt,
        })
    }

    async fn settle(&self, payload: &PaymentPayload) -> X402Result<SettlementReceipt> {
        let settler = self.settler.as_ref().ok_or_else(|| X402Error::SettlementFailed {
            reason: "no settler configured".to_string(),
        })?;

        let timeout = self.config.settlement_timeout;
        let receipt = tokio::time::timeout(timeout, settler.settle(payload))
            .await
            .map_err(|_| X402Error::Timeout(timeout))??;

        self.settled.fetch_add(1, Ordering::Relaxed);
        Ok(receipt)
    }

    /// Gate status summary.
    pub async fn status(&self) -> GateStatus {
        GateStatus {
            guarded_routes: self.config.routes.len(),
            settle_immediately: self.config.settle_immediately,
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            settled: self.settled.load(Ordering::Relaxed),
            tracked_nonces: self.nonces.len().await,
        }
    }
}

impl std::fmt::Debug for PaymentGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentGate")
            .field("config", &self.config)
            .field("has_settler", &self.settler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::PaymentSigner;
    use crate::types::FacilitatorHealth;
    use async_trait::async_trait;
    use stackwork_crypto::generate_identity;

    const RECIPIENT: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

    struct FixedSettler {
        fail: bool,
    }

    #[async_trait]
    impl Settler for FixedSettler {
        async fn health(&self) -> X402Result<FacilitatorHealth> {
            Ok(FacilitatorHealth {
                status: "ok".into(),
            })
        }

        async fn settle(&self, _payload: &PaymentPayload) -> X402Result<SettlementReceipt> {
            if self.fail {
                return Err(X402Error::SettlementFailed {
                    reason: "node unavailable".into(),
                });
            }
            Ok(SettlementReceipt {
                tx_id: "0xabc".into(),
                status: "pending".into(),
            })
        }
    }

    fn config() -> GateConfig {
        GateConfig::new(StacksNetwork::Testnet, RECIPIENT).with_route(
            "GET",
            "/api/premium",
            "5000",
            "Premium data",
        )
    }

    fn signed_header(gate: &PaymentGate, signer: &PaymentSigner, nonce: u64) -> String {
        let req = gate.requirement_for("GET", "/api/premium").unwrap();
        let payload = signer.sign_with(&req, nonce, current_timestamp());
        codec::encode(&payload).unwrap()
    }

    fn signer() -> PaymentSigner {
        PaymentSigner::new(generate_identity().0)
    }

    #[test]
    fn test_route_key_normalizes_method() {
        assert_eq!(route_key("get", "/a"), "GET /a");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad_recipient = GateConfig::new(StacksNetwork::Testnet, "nope");
        assert!(PaymentGate::new(bad_recipient).is_err());

        let bad_price = GateConfig::new(StacksNetwork::Testnet, RECIPIENT)
            .with_route("GET", "/x", "0.5", "half");
        assert!(matches!(
            PaymentGate::new(bad_price),
            Err(X402Error::InvalidAmount { .. })
        ));
    }

    #[tokio::test]
    async fn test_unguarded_and_other_method() {
        let gate = PaymentGate::new(config()).unwrap();
        assert!(matches!(
            gate.evaluate("GET", "/api/free", None).await,
            GateOutcome::Unprotected
        ));
        assert!(matches!(
            gate.evaluate("POST", "/api/premium", None).await,
            GateOutcome::Unprotected
        ));
    }

    #[tokio::test]
    async fn test_missing_header_requires_payment() {
        let gate = PaymentGate::new(config()).unwrap();
        match gate.evaluate("GET", "/api/premium", None).await {
            GateOutcome::PaymentRequired(req) => {
                assert_eq!(req.amount, "5000");
                assert_eq!(req.recipient_address, RECIPIENT);
                assert_eq!(req.resource.as_deref(), Some("GET /api/premium"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_garbage_header_is_invalid_not_rejected() {
        let gate = PaymentGate::new(config()).unwrap();
        assert!(matches!(
            gate.evaluate("GET", "/api/premium", Some("%%%")).await,
            GateOutcome::InvalidHeader { .. }
        ));
    }

    #[tokio::test]
    async fn test_valid_payment_accepted_once() {
        let gate = PaymentGate::new(config()).unwrap();
        let signer = signer();
        let header = signed_header(&gate, &signer, 1);

        match gate.evaluate("GET", "/api/premium", Some(&header)).await {
            GateOutcome::Accepted(payment) => {
                assert_eq!(payment.details.amount, "5000");
                assert!(payment.receipt.is_none());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        match gate.evaluate("GET", "/api/premium", Some(&header)).await {
            GateOutcome::Rejected { reason, .. } => assert_eq!(reason, REASON_NONCE_REUSED),
            other => panic!("unexpected outcome: {:?}", other),
        }

        let status = gate.status().await;
        assert_eq!(status.accepted, 1);
        assert_eq!(status.rejected, 1);
        assert_eq!(status.tracked_nonces, 1);
    }

    #[tokio::test]
    async fn test_same_nonce_different_payers_both_accepted() {
        // Each payload carries its own valid signature.
        let gate = PaymentGate::new(config()).unwrap();
        let a = signed_header(&gate, &signer(), 7);
        let b = signed_header(&gate, &signer(), 7);
        assert!(matches!(
            gate.evaluate("GET", "/api/premium", Some(&a)).await,
            GateOutcome::Accepted(_)
        ));
        assert!(matches!(
            gate.evaluate("GET", "/api/premium", Some(&b)).await,
            GateOutcome::Accepted(_)
        ));
    }

    #[tokio::test]
    async fn test_underpayment_rejected_with_reason() {
        let gate = PaymentGate::new(config()).unwrap();
        let signer = signer();
        let mut req = gate.requirement_for("GET", "/api/premium").unwrap();
        req.amount = "4999".into();
        let header = codec::encode(&signer.sign(&req)).unwrap();

        match gate.evaluate("GET", "/api/premium", Some(&header)).await {
            GateOutcome::Rejected { reason, .. } => {
                assert_eq!(reason, "Insufficient amount: got 4999, need 5000")
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_immediate_settlement_attaches_receipt() {
        let gate = PaymentGate::new(config().with_immediate_settlement(true))
            .unwrap()
            .with_settler(Arc::new(FixedSettler { fail: false }));
        let header = signed_header(&gate, &signer(), 3);

        match gate.evaluate("GET", "/api/premium", Some(&header)).await {
            GateOutcome::Accepted(payment) => {
                assert_eq!(payment.receipt.unwrap().tx_id, "0xabc");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(gate.status().await.settled, 1);
    }

    #[tokio::test]
    async fn test_settlement_failure_releases_nonce() {
        let signer = signer();
        let failing = PaymentGate::new(config().with_immediate_settlement(true))
            .unwrap()
            .with_settler(Arc::new(FixedSettler { fail: true }));
        let header = signed_header(&failing, &signer, 11);

        assert!(matches!(
            failing.evaluate("GET", "/api/premium", Some(&header)).await,
            GateOutcome::SettlementFailed { .. }
        ));
        assert_eq!(failing.status().await.tracked_nonces, 0);
    }

    #[tokio::test]
    async fn test_settle_without_settler_fails() {
        let gate = PaymentGate::new(config().with_immediate_settlement(true)).unwrap();
        let header = signed_header(&gate, &signer(), 4);
        assert!(matches!(
            gate.evaluate("GET", "/api/premium", Some(&header)).await,
            GateOutcome::SettlementFailed { .. }
        ));
    }

    #[tokio::test]
    async fn test_tampered_amount_fails_signature_check() {
        let gate = PaymentGate::new(config()).unwrap();
        let signer = signer();
        let req = gate.requirement_for("GET", "/api/premium").unwrap();
        let mut payload = signer.sign(&req);
        payload.amount = "9999999".into();
        let header = codec::encode(&payload).unwrap();

        match gate.evaluate("GET", "/api/premium", Some(&header)).await {
            GateOutcome::Rejected { reason, .. } => assert_eq!(reason, "Invalid signature"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_replay_with_swapped_key_or_nonce_rejected() {
        let gate = PaymentGate::new(config()).unwrap();
        let req = gate.requirement_for("GET", "/api/premium").unwrap();
        let payload = signer().sign_with(&req, 21, current_timestamp());
        let header = codec::encode(&payload).unwrap();
        assert!(matches!(
            gate.evaluate("GET", "/api/premium", Some(&header)).await,
            GateOutcome::Accepted(_)
        ));

        let mut other_key = payload.clone();
        other_key.public_key = "00".repeat(32);
        let mut other_nonce = payload.clone();
        other_nonce.nonce = 22;
        let mut fresh_key = payload;
        fresh_key.public_key = signer().public_key().to_hex();

        for replay in [other_key, other_nonce, fresh_key] {
            let header = codec::encode(&replay).unwrap();
            match gate.evaluate("GET", "/api/premium", Some(&header)).await {
                GateOutcome::Rejected { reason, .. } => assert_eq!(reason, "Invalid signature"),
                other => panic!("unexpected outcome: {:?}", other),
            }
        }
        assert_eq!(gate.status().await.accepted, 1);
    }

    #[tokio::test]
    async fn test_nonce_registry_prunes_expired_at_capacity() {
        let registry = NonceRegistry::new(2);
        assert_eq!(registry.try_reserve("pk", 1, Some(1)).await, Reservation::Reserved);
        assert_eq!(registry.try_reserve("pk", 2, None).await, Reservation::Reserved);
        // At capacity: the expired entry (expiry 1 ms) is dropped.
        assert_eq!(registry.try_reserve("pk", 3, None).await, Reservation::Reserved);
        assert_eq!(registry.len().await, 2);
        assert_eq!(registry.try_reserve("pk", 2, None).await, Reservation::Reused);
    }

    #[tokio::test]
    async fn test_full_registry_refuses_instead_of_forgetting() {
        let registry = NonceRegistry::new(2);
        assert_eq!(registry.try_reserve("pk", 1, None).await, Reservation::Reserved);
        assert_eq!(registry.try_reserve("pk", 2, None).await, Reservation::Reserved);

        assert_eq!(registry.try_reserve("pk", 3, None).await, Reservation::Full);
        // Earlier nonces are still remembered.
        assert_eq!(registry.try_reserve("pk", 1, None).await, Reservation::Reused);
        assert_eq!(registry.len().await, 2);

        registry.release("pk", 2).await;
        assert_eq!(registry.try_reserve("pk", 3, None).await, Reservation::Reserved);
    }

    #[tokio::test]
    async fn test_full_gate_rejects_new_payments() {
        let mut config = config();
        config.max_tracked_nonces = 1;
        let gate = PaymentGate::new(config).unwrap();
        let signer = signer();

        let first = signed_header(&gate, &signer, 1);
        assert!(matches!(
            gate.evaluate("GET", "/api/premium", Some(&first)).await,
            GateOutcome::Accepted(_)
        ));

        let second = signed_header(&gate, &signer, 2);
        match gate.evaluate("GET", "/api/premium", Some(&second)).await {
            GateOutcome::Rejected { reason, .. } => assert_eq!(reason, REASON_NONCE_CAPACITY),
            other => panic!("unexpected outcome: {:?}", other),
        }

        match gate.evaluate("GET", "/api/premium", Some(&first)).await {
            GateOutcome::Rejected { reason, .. } => assert_eq!(reason, REASON_NONCE_REUSED),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
