//! Outbound client that pays 402 responses automatically.
//!
//! [`PaymentClient::fetch`] sends a request; when the server answers 402 with
//! a decodable `X-PAYMENT-REQUIRED` header whose amount is within the
//! configured ceiling, it signs a payment and repeats the identical request
//! with an `X-PAYMENT` header. Anything it cannot pay is handed back
//! unchanged.

use std::time::Duration;

use async_trait::async_trait;
use num_bigint::BigUint;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::codec::{self, parse_minor};
use crate::error::{X402Error, X402Result};
use crate::signer::PaymentSigner;
use crate::types::{HEADER_PAYMENT, HEADER_PAYMENT_REQUIRED};

/// Default timeout of [`ReqwestTransport`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A transport-neutral HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl OutboundRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A transport-neutral HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl OutboundResponse {
    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends one HTTP request.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &OutboundRequest) -> X402Result<OutboundResponse>;
}

/// [`HttpTransport`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> X402Result<Self> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> X402Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| X402Error::Transport(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &OutboundRequest) -> X402Result<OutboundResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| X402Error::Transport(format!("invalid method {}: {}", request.method, e)))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| X402Error::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| X402Error::Transport(e.to_string()))?
            .to_vec();

        Ok(OutboundResponse {
            status,
            headers,
            body,
        })
    }
}

/// HTTP client wrapper that makes the 402 protocol transparent.
pub struct PaymentClient<T: HttpTransport> {
    transport: T,
    signer: PaymentSigner,
    max_auto_pay: BigUint,
}

impl<T: HttpTransport> PaymentClient<T> {
    /// `max_auto_pay` is the largest requirement paid without asking, in micro-STX.
    pub fn new(transport: T, signer: PaymentSigner, max_auto_pay: &str) -> X402Result<Self> {
        let max_auto_pay = parse_minor(max_auto_pay).ok_or_else(|| X402Error::InvalidAmount {
            value: max_auto_pay.to_string(),
        })?;
        Ok(Self {
            transport,
            signer,
            max_auto_pay,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request`, paying a 402 once if the requirement allows it.
    pub async fn fetch(&self, request: OutboundRequest) -> X402Result<OutboundResponse> {
        let response = self.transport.send(&request).await?;
        if response.status != 402 {
            return Ok(response);
        }

        let Some(header) = response.header(HEADER_PAYMENT_REQUIRED) else {
            debug!(url = %request.url, "402 without a payment requirement header");
            return Ok(response);
        };

        let requirement = match codec::decode_requirement(header) {
            Ok(requirement) => requirement,
            Err(e) => {
                warn!(url = %request.url, error = %e, "Undecodable payment requirement, not paying");
                return Ok(response);
            }
        };

        // decode_requirement guarantees a digit-only amount.
        let Some(amount) = parse_minor(&requirement.amount) else {
            return Ok(response);
        };
        if amount > self.max_auto_pay {
            warn!(
                url = %request.url,
                amount = %requirement.amount,
                ceiling = %self.max_auto_pay,
                "Payment requirement above auto-pay ceiling"
            );
            return Ok(response);
        }

        let payload = self.signer.sign(&requirement);
        let paid = request.with_header(HEADER_PAYMENT, codec::encode(&payload)?);

        info!(
            url = %paid.url,
            amount = %requirement.amount,
            recipient = %requirement.recipient_address,
            nonce = payload.nonce,
            "Retrying request with payment"
        );
        self.transport.send(&paid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentRequirement;
    use stackwork_crypto::generate_identity;
    use stackwork_types::StacksNetwork;
    use std::sync::Mutex;

    /// Replays canned responses and records every request.
    struct ScriptedTransport {
        responses: Mutex<Vec<OutboundResponse>>,
        seen: Mutex<Vec<OutboundRequest>>,
    }

    impl ScriptedTransport {
        fn new(mut responses: Vec<OutboundResponse>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<OutboundRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn send(&self, request: &OutboundRequest) -> X402Result<OutboundResponse> {
            self.seen.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| X402Error::Transport("no scripted response".into()))
        }
    }

    fn ok(body: &str) -> OutboundResponse {
        OutboundResponse {
            status: 200,
            headers: vec![],
            body: body.as_bytes().to_vec(),
        }
    }

    fn payment_required(amount: &str) -> OutboundResponse {
        let req = PaymentRequirement::stx(
            StacksNetwork::Testnet,
            "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM",
            amount,
        );
        OutboundResponse {
            status: 402,
            headers: vec![(
                "x-payment-required".into(),
                codec::encode(&req).unwrap(),
            )],
            body: b"{}".to_vec(),
        }
    }

    fn client(transport: ScriptedTransport, ceiling: &str) -> PaymentClient<ScriptedTransport> {
        let signer = PaymentSigner::new(generate_identity().0);
        PaymentClient::new(transport, signer, ceiling).unwrap()
    }

    #[tokio::test]
    async fn test_non_402_passes_through() {
        let client = client(ScriptedTransport::new(vec![ok("hello")]), "1000");
        let response = client.fetch(OutboundRequest::get("http://x/a")).await.unwrap();
        assert_eq!(response.text(), "hello");
        assert_eq!(client.transport().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_402_without_header_returned_unchanged() {
        let bare = OutboundResponse {
            status: 402,
            headers: vec![],
            body: b"pay up".to_vec(),
        };
        let client = client(ScriptedTransport::new(vec![bare.clone()]), "1000");
        let response = client.fetch(OutboundRequest::get("http://x/a")).await.unwrap();
        assert_eq!(response, bare);
        assert_eq!(client.transport().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_402_with_garbage_header_fails_open() {
        let garbage = OutboundResponse {
            status: 402,
            headers: vec![("X-PAYMENT-REQUIRED".into(), "!!!".into())],
            body: vec![],
        };
        let client = client(ScriptedTransport::new(vec![garbage.clone()]), "1000");
        let response = client.fetch(OutboundRequest::get("http://x/a")).await.unwrap();
        assert_eq!(response, garbage);
        assert_eq!(client.transport().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_above_ceiling_returns_original_402_without_retry() {
        let original = payment_required("5001");
        let client = client(
            ScriptedTransport::new(vec![original.clone(), ok("paid")]),
            "5000",
        );
        let response = client.fetch(OutboundRequest::get("http://x/a")).await.unwrap();
        assert_eq!(response, original);
        assert_eq!(client.transport().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_ceiling_beyond_64_bits() {
        let huge = "100000000000000000000000";
        let client = client(
            ScriptedTransport::new(vec![payment_required(huge), ok("paid")]),
            "99999999999999999999999",
        );
        let response = client.fetch(OutboundRequest::get("http://x/a")).await.unwrap();
        assert_eq!(response.status, 402);
        assert_eq!(client.transport().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_within_ceiling_retries_with_identical_request_plus_payment() {
        let client = client(
            ScriptedTransport::new(vec![payment_required("5000"), ok("paid")]),
            "5000",
        );
        let request = OutboundRequest::new("POST", "http://x/api/premium")
            .with_header("Authorization", "Bearer t")
            .with_header("Content-Type", "application/json")
            .with_body(br#"{"q":1}"#.to_vec());

        let response = client.fetch(request.clone()).await.unwrap();
        assert_eq!(response.text(), "paid");

        let calls = client.transport().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], request);

        let retry = &calls[1];
        assert_eq!(retry.method, "POST");
        assert_eq!(retry.url, request.url);
        assert_eq!(retry.body, request.body);
        assert_eq!(&retry.headers[..2], &request.headers[..]);
        let (name, value) = &retry.headers[2];
        assert_eq!(name, HEADER_PAYMENT);

        let payload = codec::decode_payload(value).unwrap();
        assert_eq!(payload.amount, "5000");
        assert!(crate::verify::verify_signature(&payload));
    }

    #[test]
    fn test_invalid_ceiling_rejected() {
        let signer = PaymentSigner::new(generate_identity().0);
        assert!(PaymentClient::new(ScriptedTransport::new(vec![]), signer, "1.5").is_err());
    }
}
