//! x402 payment header commands.

use stackwork_types::{validate_address, StacksNetwork};
use stackwork_x402::{
    decode_payload, decode_requirement, encode, to_minor_units, OutboundRequest, PaymentClient,
    PaymentRequirement, PaymentSigner, PaymentVerifier, ReqwestTransport, HEADER_PAYMENT,
    HEADER_PAYMENT_REQUIRED, HEADER_PAYMENT_RESPONSE,
};
use tracing::debug;

use crate::cli::PayCommand;
use crate::config::CliConfig;
use crate::context::load_payment_key;
use crate::error::{CliError, CliResult};
use crate::output::{
    DecodedOutput, EncodedHeaderOutput, FetchOutput, OutputFormat, Render, VerifyOutput,
};

/// Execute a pay subcommand.
pub async fn pay(config: CliConfig, format: OutputFormat, command: PayCommand) -> CliResult<String> {
    match command {
        PayCommand::EncodeRequirement {
            recipient,
            amount,
            network,
            description,
            resource,
        } => {
            let network = StacksNetwork::from(network);
            validate_address(&recipient, Some(network))?;

            let mut requirement = PaymentRequirement::stx(network, recipient, to_minor_units(&amount)?);
            if let Some(description) = description {
                requirement = requirement.with_description(description);
            }
            if let Some(resource) = resource {
                requirement = requirement.with_resource(resource);
            }

            let output = EncodedHeaderOutput {
                header: HEADER_PAYMENT_REQUIRED.to_string(),
                value: encode(&requirement)?,
            };
            Ok(output.render(format))
        }
        PayCommand::Decode { header } => {
            let header = header.trim();
            let output = match decode_payload(header) {
                Ok(payload) => DecodedOutput {
                    kind: "payment".to_string(),
                    value: serde_json::to_value(payload)?,
                },
                Err(payload_err) => {
                    debug!(error = %payload_err, "Not a payment payload, trying requirement");
                    DecodedOutput {
                        kind: "requirement".to_string(),
                        value: serde_json::to_value(decode_requirement(header)?)?,
                    }
                }
            };
            Ok(output.render(format))
        }
        PayCommand::Verify {
            payment,
            requirement,
            check_signature,
        } => {
            let payload = decode_payload(payment.trim())?;
            let requirement = decode_requirement(requirement.trim())?;

            let mut verifier = PaymentVerifier::new();
            if check_signature {
                verifier = verifier.with_signature_check();
            }
            let result = verifier.verify(&payload, &requirement).await;
            let (amount, nonce) = match &result.details {
                Some(details) => (Some(details.amount.clone()), Some(details.nonce)),
                None => (None, None),
            };

            let output = VerifyOutput {
                valid: result.valid,
                reason: result.reason,
                amount,
                nonce,
            };
            Ok(output.render(format))
        }
        PayCommand::Fetch {
            url,
            method,
            headers,
            data,
            max_pay,
        } => {
            let mut request = OutboundRequest::new(method.to_uppercase(), url);
            for header in &headers {
                let (name, value) = parse_header(header)?;
                request = request.with_header(name, value);
            }
            if let Some(data) = data {
                request = request.with_body(data.into_bytes());
            }

            let ceiling = max_pay.unwrap_or_else(|| config.payment.max_auto_pay.clone());
            let signer = PaymentSigner::new(load_payment_key(&config)?);
            let transport = ReqwestTransport::with_timeout(config.payment.timeout)?;
            let client = PaymentClient::new(transport, signer, &to_minor_units(&ceiling)?)?;

            let response = client.fetch(request).await?;
            let payment_response = response.header(HEADER_PAYMENT_RESPONSE).map(str::to_string);

            let output = FetchOutput {
                status: response.status,
                paid: payment_response.is_some(),
                payment_response,
                body: response.text(),
            };
            Ok(output.render(format))
        }
    }
}

/// Split a `Name: value` header argument.
fn parse_header(raw: &str) -> CliResult<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| CliError::user(format!("Header '{}' is not in 'Name: value' form", raw)))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::user(format!("Header '{}' has no name", raw)));
    }
    if name.eq_ignore_ascii_case(HEADER_PAYMENT) {
        return Err(CliError::user("X-PAYMENT is added automatically"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::NetworkArg;
    use crate::commands::test_support::{setup_config, PLATFORM_WALLET};
    use stackwork_crypto::generate_identity;
    use tempfile::TempDir;

    async fn encode_requirement(config: &CliConfig, amount: &str) -> String {
        let output = pay(
            config.clone(),
            OutputFormat::Json,
            PayCommand::EncodeRequirement {
                recipient: PLATFORM_WALLET.into(),
                amount: amount.into(),
                network: NetworkArg::Testnet,
                description: Some("Premium search".into()),
                resource: Some("/api/search".into()),
            },
        )
        .await
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["header"], "X-PAYMENT-REQUIRED");
        value["value"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_encode_then_decode_requirement() {
        let temp_dir = TempDir::new().unwrap();
        let config = setup_config(&temp_dir);
        let header = encode_requirement(&config, "0.001").await;

        let output = pay(config, OutputFormat::Json, PayCommand::Decode { header })
            .await
            .unwrap();
        let decoded: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(decoded["kind"], "requirement");
        assert_eq!(decoded["value"]["amount"], "1000");
        assert_eq!(decoded["value"]["recipientAddress"], PLATFORM_WALLET);
    }

    #[tokio::test]
    async fn test_verify_signed_payment() {
        let temp_dir = TempDir::new().unwrap();
        let config = setup_config(&temp_dir);
        let requirement_header = encode_requirement(&config, "0.001").await;

        let requirement = decode_requirement(&requirement_header).unwrap();
        let payload = PaymentSigner::new(generate_identity().0).sign(&requirement);
        let payment_header = encode(&payload).unwrap();

        let output = pay(
            config.clone(),
            OutputFormat::Json,
            PayCommand::Verify {
                payment: payment_header.clone(),
                requirement: requirement_header,
                check_signature: true,
            },
        )
        .await
        .unwrap();
        let verified: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(verified["valid"], true);
        assert_eq!(verified["amount"], "1000");

        // A higher price is not covered by the same payment.
        let pricier = encode_requirement(&config, "0.002").await;
        let output = pay(
            config,
            OutputFormat::Json,
            PayCommand::Verify {
                payment: payment_header,
                requirement: pricier,
                check_signature: false,
            },
        )
        .await
        .unwrap();
        let rejected: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(rejected["valid"], false);
        assert!(rejected["reason"].as_str().unwrap().contains("Insufficient amount"));
    }

    #[tokio::test]
    async fn test_decode_garbage_is_decode_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = pay(
            setup_config(&temp_dir),
            OutputFormat::Json,
            PayCommand::Decode {
                header: "not base64!".into(),
            },
        )
        .await;
        assert!(matches!(result, Err(CliError::Decode(_))));
    }

    #[tokio::test]
    async fn test_encode_rejects_mainnet_recipient_on_testnet() {
        let temp_dir = TempDir::new().unwrap();
        let result = pay(
            setup_config(&temp_dir),
            OutputFormat::Json,
            PayCommand::EncodeRequirement {
                recipient: "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7".into(),
                amount: "1".into(),
                network: NetworkArg::Testnet,
                description: None,
                resource: None,
            },
        )
        .await;
        assert!(matches!(result, Err(CliError::Types(_))));
    }

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Accept: application/json").unwrap(),
            ("Accept".to_string(), "application/json".to_string())
        );
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header(": value").is_err());
        assert!(parse_header("x-payment: abc").is_err());
    }

    #[tokio::test]
    async fn test_fetch_requires_payment_key() {
        let temp_dir = TempDir::new().unwrap();
        let result = pay(
            setup_config(&temp_dir),
            OutputFormat::Json,
            PayCommand::Fetch {
                url: "http://127.0.0.1:9/".into(),
                method: "GET".into(),
                headers: vec![],
                data: None,
                max_pay: None,
            },
        )
        .await;
        assert!(matches!(result, Err(CliError::KeyNotInitialized)));
    }
}
