//! Tower middleware that puts a [`PaymentGate`] in front of an axum service.
//!
//! | Gate outcome       | Response                                              |
//! |--------------------|-------------------------------------------------------|
//! | `Unprotected`      | inner service, untouched                              |
//! | `PaymentRequired`  | 402 + `X-PAYMENT-REQUIRED` + requirement JSON body    |
//! | `InvalidHeader`    | 400 `Invalid payment header format`                   |
//! | `Rejected`         | 402 `Payment verification failed` + reason            |
//! | `SettlementFailed` | 502 `Payment settlement failed`                       |
//! | `Accepted`         | inner service, [`VerifiedPayment`] in extensions,     |
//! |                    | `X-PAYMENT-RESPONSE` when settled                     |

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderValue, StatusCode};
use axum::response::Response;
use serde_json::json;
use tower::{Layer, Service};
use tracing::error;

use crate::codec;
use crate::gate::{GateOutcome, PaymentGate, VerifiedPayment};
use crate::types::{
    PaymentRequiredBody, PaymentRequirement, HEADER_PAYMENT, HEADER_PAYMENT_REQUIRED,
    HEADER_PAYMENT_RESPONSE,
};

/// Layer wrapping services in a [`PaymentGateService`].
#[derive(Clone)]
pub struct PaymentGateLayer {
    gate: Arc<PaymentGate>,
}

impl PaymentGateLayer {
    pub fn new(gate: Arc<PaymentGate>) -> Self {
        Self { gate }
    }
}

impl<S> Layer<S> for PaymentGateLayer {
    type Service = PaymentGateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        PaymentGateService {
            inner,
            gate: Arc::clone(&self.gate),
        }
    }
}

/// Payment gate middleware service.
#[derive(Clone)]
pub struct PaymentGateService<S> {
    inner: S,
    gate: Arc<PaymentGate>,
}

impl<S> Service<Request> for PaymentGateService<S>
where
    S: Service<Request, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let gate = Arc::clone(&self.gate);
        // Take the service that was driven to readiness; leave a clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let method = req.method().as_str().to_string();
            let path = req.uri().path().to_string();
            // A non-ASCII header value is treated as an empty, undecodable one.
            let header = req
                .headers()
                .get(HEADER_PAYMENT)
                .map(|v| v.to_str().unwrap_or_default().to_string());

            match gate.evaluate(&method, &path, header.as_deref()).await {
                GateOutcome::Unprotected => inner.call(req).await,
                GateOutcome::PaymentRequired(requirement) => {
                    Ok(payment_required_response(&requirement))
                }
                GateOutcome::InvalidHeader { error, .. } => Ok(json_response(
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "Invalid payment header format",
                        "details": error.to_string(),
                    }),
                )),
                GateOutcome::Rejected {
                    requirement,
                    reason,
                } => {
                    let mut response = json_response(
                        StatusCode::PAYMENT_REQUIRED,
                        json!({
                            "error": "Payment verification failed",
                            "reason": reason,
                        }),
                    );
                    attach_requirement(&mut response, &requirement);
                    Ok(response)
                }
                GateOutcome::SettlementFailed { reason, .. } => Ok(json_response(
                    StatusCode::BAD_GATEWAY,
                    json!({
                        "error": "Payment settlement failed",
                        "reason": reason,
                    }),
                )),
                GateOutcome::Accepted(payment) => {
                    let receipt_header = payment
                        .receipt
                        .as_ref()
                        .and_then(|receipt| codec::encode(receipt).ok());

                    let (mut parts, body) = req.into_parts();
                    parts.extensions.insert::<VerifiedPayment>(payment);
                    let mut response = inner.call(Request::from_parts(parts, body)).await?;

                    if let Some(value) = receipt_header.and_then(|h| HeaderValue::from_str(&h).ok()) {
                        response.headers_mut().insert(HEADER_PAYMENT_RESPONSE, value);
                    }
                    Ok(response)
                }
            }
        })
    }
}

fn payment_required_response(requirement: &PaymentRequirement) -> Response {
    let message = match codec::to_major_units(&requirement.amount) {
        Ok(major) => format!("This resource requires a payment of {} {}", major, requirement.asset),
        Err(_) => "This resource requires payment".to_string(),
    };
    let body = PaymentRequiredBody {
        error: "Payment required".to_string(),
        message,
        payment_requirement: requirement.clone(),
    };

    let mut response = json_response(
        StatusCode::PAYMENT_REQUIRED,
        serde_json::to_value(&body).unwrap_or_default(),
    );
    attach_requirement(&mut response, requirement);
    response
}

fn attach_requirement(response: &mut Response, requirement: &PaymentRequirement) {
    match codec::encode(requirement).map(|h| HeaderValue::from_str(&h)) {
        Ok(Ok(value)) => {
            response.headers_mut().insert(HEADER_PAYMENT_REQUIRED, value);
        }
        _ => error!("Failed to encode payment requirement header"),
    }
}

fn json_response(status: StatusCode, body: serde_json::Value) -> Response {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}
