//! Payment protocol message types.
//!
//! Every monetary field is a decimal string of micro-STX so that values
//! beyond 2^53 survive JSON round-trips through any client.

use serde::{Deserialize, Serialize};
use stackwork_types::{StacksNetwork, ASSET_STX};

/// Protocol version sent to facilitators.
pub const X402_VERSION: u32 = 1;

/// HTTP header carrying the signed payment (client → server).
pub const HEADER_PAYMENT: &str = "X-PAYMENT";

/// HTTP header carrying the encoded requirement with a 402 (server → client).
pub const HEADER_PAYMENT_REQUIRED: &str = "X-PAYMENT-REQUIRED";

/// HTTP header carrying the settlement receipt (server → client).
pub const HEADER_PAYMENT_RESPONSE: &str = "X-PAYMENT-RESPONSE";

/// The only supported payment scheme.
pub const SCHEME_EXACT: &str = "exact";

/// Default validity window of a signed payment (milliseconds).
pub const DEFAULT_PAYMENT_TTL_MS: u64 = 300_000; // 5 minutes

// =============================================================================
// Requirement (402 Response)
// =============================================================================

/// What a protected resource demands. `amount` is the minimum accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirement {
    /// Payment scheme ("exact").
    pub scheme: String,

    /// Network identifier, e.g. "stacks:testnet".
    pub network: String,

    /// Chain id of the network.
    pub chain_id: u32,

    /// Address that receives the payment.
    pub recipient_address: String,

    /// Minimum amount in micro-STX.
    pub amount: String,

    /// Asset symbol ("STX").
    pub asset: String,

    /// Human-readable description of the resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Route or URL being paid for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

impl PaymentRequirement {
    /// An exact STX payment of `amount` micro-STX to `recipient` on `network`.
    pub fn stx(
        network: StacksNetwork,
        recipient: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            scheme: SCHEME_EXACT.to_string(),
            network: network.payment_network().to_string(),
            chain_id: network.chain_id(),
            recipient_address: recipient.into(),
            amount: amount.into(),
            asset: ASSET_STX.to_string(),
            description: None,
            resource: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }
}

// =============================================================================
// Payload (X-PAYMENT header)
// =============================================================================

/// A payer's signed attempt to satisfy a requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub scheme: String,
    pub network: String,
    pub chain_id: u32,
    pub recipient_address: String,
    pub asset: String,

    /// Amount paid in micro-STX.
    pub amount: String,

    /// Payer-chosen nonce, unique per payer.
    pub nonce: u64,

    /// Hex Ed25519 signature over [`PaymentPayload::signing_message`].
    pub signature: String,

    /// Hex Ed25519 public key of the payer.
    pub public_key: String,

    /// Expiry in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl PaymentPayload {
    /// Canonical bytes covered by the signature.
    ///
    /// Every field except the signature itself, `|`-separated in a fixed order.
    pub fn signing_message(&self) -> Vec<u8> {
        format!(
            "stackwork-x402|{}|{}|{}|{}|{}|{}|{}|{}|{}",
            self.scheme,
            self.network,
            self.chain_id,
            self.recipient_address,
            self.asset,
            self.amount,
            self.nonce,
            self.public_key,
            self.expires_at.map(|t| t.to_string()).unwrap_or_default(),
        )
        .into_bytes()
    }
}

// =============================================================================
// Verification
// =============================================================================

/// Echo of an accepted payment, for the caller's audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub amount: String,
    pub recipient: String,
    pub nonce: u64,
}

/// Outcome of verifying a payload against a requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<PaymentDetails>,
}

impl VerificationResult {
    pub fn accepted(details: PaymentDetails) -> Self {
        Self {
            valid: true,
            reason: None,
            details: Some(details),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
            details: None,
        }
    }
}

// =============================================================================
// Settlement / Facilitator
// =============================================================================

/// Receipt of a settled payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReceipt {
    /// On-chain (or simulated) transaction id.
    pub tx_id: String,
    /// Broadcast status reported by the settler, e.g. "pending".
    pub status: String,
}

/// Facilitator `/health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilitatorHealth {
    pub status: String,
}

impl FacilitatorHealth {
    /// Whether the facilitator reports itself usable.
    pub fn is_ok(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "healthy")
    }
}

/// Request body for the facilitator's `/verify` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub x402_version: u32,
    /// Encoded payment payload, as received in the `X-PAYMENT` header.
    pub payment_header: String,
    pub payment_requirements: PaymentRequirement,
}

/// Response from the facilitator's `/verify` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<String>,
}

/// Request body for the facilitator's `/settle` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleRequest {
    pub x402_version: u32,
    pub payment_header: String,
}

/// Response from the facilitator's `/settle` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// =============================================================================
// Response bodies
// =============================================================================

/// JSON body returned alongside a 402.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequiredBody {
    pub error: String,
    pub message: String,
    pub payment_requirement: PaymentRequirement,
}
