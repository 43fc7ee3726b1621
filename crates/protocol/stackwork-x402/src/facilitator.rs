//! Facilitator client.
//!
//! A facilitator is a remote service that verifies and settles STX payments on
//! behalf of a resource server. It exposes:
//! - `GET /health` → `{status}`
//! - `POST /verify` → `{isValid, invalidReason?}`
//! - `POST /settle` → `{success, txId?, status?, error?}`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::codec;
use crate::error::{X402Error, X402Result};
use crate::settler::Settler;
use crate::types::{
    FacilitatorHealth, PaymentPayload, PaymentRequirement, SettleRequest, SettleResponse,
    SettlementReceipt, VerifyRequest, VerifyResponse, X402_VERSION,
};

/// Default HTTP timeout for facilitator requests.
pub const DEFAULT_FACILITATOR_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for communicating with a payment facilitator.
#[derive(Clone)]
pub struct FacilitatorClient {
    /// HTTP client
    client: Client,
    /// Base URL of the facilitator
    base_url: String,
}

impl FacilitatorClient {
    /// Create a new facilitator client with the default timeout.
    pub fn new(facilitator_url: &str) -> X402Result<Self> {
        Self::with_timeout(facilitator_url, DEFAULT_FACILITATOR_TIMEOUT)
    }

    /// Create a new facilitator client with a per-request timeout.
    pub fn with_timeout(facilitator_url: &str, timeout: Duration) -> X402Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            X402Error::FacilitatorNetwork(format!("failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: facilitator_url.trim_end_matches('/').to_string(),
        })
    }

    /// Query facilitator health.
    pub async fn health(&self) -> X402Result<FacilitatorHealth> {
        let url = format!("{}/health", self.base_url);
        debug!(url = %url, "Checking facilitator health");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(X402Error::FacilitatorNetwork(format!(
                "facilitator /health returned {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            X402Error::FacilitatorNetwork(format!("failed to parse health response: {}", e))
        })
    }

    /// Ask the facilitator to verify a payment against a requirement.
    pub async fn verify(
        &self,
        payload: &PaymentPayload,
        requirement: &PaymentRequirement,
    ) -> X402Result<VerifyResponse> {
        let url = format!("{}/verify", self.base_url);
        debug!(url = %url, nonce = payload.nonce, "Verifying payment with facilitator");

        let request = VerifyRequest {
            x402_version: X402_VERSION,
            payment_header: codec::encode(payload)?,
            payment_requirements: requirement.clone(),
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(X402Error::FacilitatorNetwork(format!(
                "facilitator /verify returned {}: {}",
                status, body
            )));
        }

        let verify_response: VerifyResponse = response.json().await.map_err(|e| {
            X402Error::FacilitatorNetwork(format!("failed to parse verify response: {}", e))
        })?;

        if !verify_response.is_valid {
            warn!(reason = ?verify_response.invalid_reason, "Facilitator rejected payment");
        }

        Ok(verify_response)
    }

    /// Settle a verified payment.
    pub async fn settle(&self, payload: &PaymentPayload) -> X402Result<SettlementReceipt> {
        let url = format!("{}/settle", self.base_url);
        debug!(url = %url, nonce = payload.nonce, "Settling payment with facilitator");

        let request = SettleRequest {
            x402_version: X402_VERSION,
            payment_header: codec::encode(payload)?,
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(X402Error::SettlementFailed {
                reason: format!("facilitator returned {}: {}", status, body),
            });
        }

        let settle_response: SettleResponse =
            response
                .json()
                .await
                .map_err(|e| X402Error::SettlementFailed {
                    reason: format!("failed to parse settle response: {}", e),
                })?;

        match settle_response {
            SettleResponse {
                success: true,
                tx_id: Some(tx_id),
                status,
                ..
            } => {
                info!(tx_id = %tx_id, amount = %payload.amount, "Payment settled");
                Ok(SettlementReceipt {
                    tx_id,
                    status: status.unwrap_or_else(|| "pending".to_string()),
                })
            }
            SettleResponse { success: true, .. } => Err(X402Error::SettlementFailed {
                reason: "facilitator reported success without a transaction id".to_string(),
            }),
            SettleResponse { error, .. } => {
                warn!(error = ?error, "Payment settlement failed");
                Err(X402Error::SettlementFailed {
                    reason: error.unwrap_or_else(|| "unknown settlement failure".to_string()),
                })
            }
        }
    }

    /// Get the facilitator's base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Settler for FacilitatorClient {
    async fn health(&self) -> X402Result<FacilitatorHealth> {
        FacilitatorClient::health(self).await
    }

    async fn settle(&self, payload: &PaymentPayload) -> X402Result<SettlementReceipt> {
        FacilitatorClient::settle(self, payload).await
    }
}

impl std::fmt::Debug for FacilitatorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacilitatorClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = FacilitatorClient::new("https://facilitator.example.com/v1").unwrap();
        assert_eq!(client.base_url(), "https://facilitator.example.com/v1");
    }

    #[test]
    fn test_client_url_normalization() {
        let client = FacilitatorClient::new("https://facilitator.example.com/v1/").unwrap();
        assert_eq!(client.base_url(), "https://facilitator.example.com/v1");
    }

    #[test]
    fn test_client_debug() {
        let client = FacilitatorClient::new("https://example.com/v1").unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("example.com"));
    }

    #[tokio::test]
    async fn test_unreachable_facilitator_is_network_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP.
        let client =
            FacilitatorClient::with_timeout("http://127.0.0.1:9", Duration::from_millis(500))
                .unwrap();
        let err = client.health().await.unwrap_err();
        assert!(err.is_transient());
    }
}
