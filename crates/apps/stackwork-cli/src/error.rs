//! CLI error types.

use stackwork_ops::OpsError;
use thiserror::Error;

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error enum wrapping all crate errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Marketplace operation error.
    #[error("{0}")]
    Ops(#[from] OpsError),

    /// Payment protocol error.
    #[error("{0}")]
    Payment(#[from] stackwork_x402::X402Error),

    /// Undecodable payment header.
    #[error("Invalid payment header: {0}")]
    Decode(#[from] stackwork_x402::DecodeError),

    /// Settlement setup error.
    #[error("{0}")]
    Settlement(#[from] stackwork_settle::SettleError),

    /// Store error.
    #[error("{0}")]
    Store(#[from] stackwork_store::StoreError),

    /// Key parsing error.
    #[error("{0}")]
    Crypto(#[from] stackwork_crypto::CryptoError),

    /// Amount, address or enum parsing error.
    #[error("{0}")]
    Types(#[from] stackwork_types::TypesError),

    /// IO error.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// User-facing error with actionable message.
    #[error("{0}")]
    User(String),

    /// Payment key not created yet.
    #[error("Payment key not found. Run 'stackwork init' first.")]
    KeyNotInitialized,

    /// Payment key already present.
    #[error("Payment key already exists. Use 'stackwork init --force' to replace it.")]
    KeyExists,
}

impl CliError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a user-facing error.
    pub fn user(msg: impl Into<String>) -> Self {
        Self::User(msg.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors: 1
            Self::User(_) | Self::KeyNotInitialized | Self::KeyExists | Self::Types(_) => 1,
            // Not found: 2
            Self::Ops(e) if e.is_not_found() => 2,
            // Config errors: 3
            Self::Config(_) | Self::Toml(_) | Self::Crypto(_) => 3,
            // Payment protocol errors: 4
            Self::Payment(_) | Self::Decode(_) => 4,
            // Store errors: 6
            Self::Store(_) => 6,
            // Settlement errors: 7
            Self::Settlement(_) | Self::Ops(OpsError::Settlement(_)) => 7,
            // Operations errors: 8
            Self::Ops(_) => 8,
            // IO errors: 9
            Self::Io(_) => 9,
            // JSON/format errors: 10
            Self::Json(_) => 10,
        }
    }

    /// A recovery suggestion, when one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::KeyNotInitialized => Some("Run 'stackwork init' to create a payment key."),
            Self::Config(_) | Self::Toml(_) => {
                Some("Check config.toml, or pass --config to use another file.")
            }
            Self::Ops(OpsError::WrongStatus { .. }) => {
                Some("Run 'stackwork task show <id>' to see the current status.")
            }
            Self::Ops(OpsError::WrongActor(_)) => {
                Some("Pass the poster's or assigned agent's identity for this step.")
            }
            Self::Ops(OpsError::AgentNotFound(_)) => {
                Some("Register with 'stackwork agent register' first.")
            }
            Self::Ops(OpsError::Settlement(_)) | Self::Settlement(_) => {
                Some("Check [settlement] facilitator_url, or enable engine.simulate_on_failure.")
            }
            Self::Decode(_) => Some("Header values are base64-encoded JSON."),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackwork_types::TaskStatus;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::user("nope").exit_code(), 1);
        assert_eq!(
            CliError::from(OpsError::TaskNotFound("task_1".into())).exit_code(),
            2
        );
        assert_eq!(CliError::config("bad").exit_code(), 3);
        assert_eq!(
            CliError::from(OpsError::settlement("facilitator down")).exit_code(),
            7
        );
        assert_eq!(
            CliError::from(OpsError::wrong_status("task_1", TaskStatus::Open, &[TaskStatus::Submitted]))
                .exit_code(),
            8
        );
    }

    #[test]
    fn test_ops_message_passes_through() {
        let err = CliError::from(OpsError::wrong_actor("Only the task poster can approve"));
        assert_eq!(err.to_string(), "Only the task poster can approve");
        assert!(err.hint().is_some());
    }

    #[test]
    fn test_key_hint() {
        assert!(CliError::KeyNotInitialized
            .hint()
            .unwrap()
            .contains("stackwork init"));
        assert!(CliError::Io(std::io::Error::other("disk")).hint().is_none());
    }
}
