//! Payout and receipt types.

use std::fmt;

use serde::{Deserialize, Serialize};
use stackwork_crypto::random_id;
use stackwork_types::{format_stx, validate_address, Amount, StacksNetwork};

use crate::error::{SettleError, SettleResult};

/// Prefix of transaction ids recorded without an on-chain transfer.
pub const SIMULATED_TX_PREFIX: &str = "sim";

/// Transaction identifier returned by a settlement backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh `sim_<hex>` identifier.
    pub fn simulated() -> Self {
        Self(random_id(SIMULATED_TX_PREFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_simulated(&self) -> bool {
        self.0
            .strip_prefix(SIMULATED_TX_PREFIX)
            .is_some_and(|rest| rest.starts_with('_'))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A transfer of an approved task's payout to its agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub task_id: String,
    pub recipient_address: String,
    /// Micro-STX sent to the recipient (bounty minus platform fee).
    pub amount: Amount,
    pub network: StacksNetwork,
}

impl Payout {
    pub fn new(
        task_id: impl Into<String>,
        recipient_address: impl Into<String>,
        amount: Amount,
        network: StacksNetwork,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            recipient_address: recipient_address.into(),
            amount,
            network,
        }
    }

    /// Payout amount in STX, six fraction digits.
    pub fn amount_stx(&self) -> String {
        format_stx(self.amount)
    }

    pub fn validate(&self) -> SettleResult<()> {
        if self.amount == 0 {
            return Err(SettleError::invalid_payout("amount must be positive"));
        }
        validate_address(&self.recipient_address, Some(self.network))
            .map_err(|e| SettleError::invalid_payout(e.to_string()))
    }
}

/// Result of a settled payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutReceipt {
    pub tx_id: TransactionId,
    /// Backend-reported status, e.g. `pending` or `simulated`.
    pub status: String,
}

impl PayoutReceipt {
    pub fn simulated() -> Self {
        Self {
            tx_id: TransactionId::simulated(),
            status: "simulated".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGENT: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

    #[test]
    fn test_simulated_tx_id() {
        let tx = TransactionId::simulated();
        assert!(tx.as_str().starts_with("sim_"));
        assert_eq!(tx.as_str().len(), 4 + 32);
        assert!(tx.is_simulated());
        assert!(!TransactionId::new("0xsimulated").is_simulated());
        assert!(!TransactionId::new("simple").is_simulated());
    }

    #[test]
    fn test_payout_validation() {
        assert!(Payout::new("task_1", AGENT, 19_800, StacksNetwork::Testnet)
            .validate()
            .is_ok());
        assert!(Payout::new("task_1", AGENT, 0, StacksNetwork::Testnet)
            .validate()
            .is_err());
        // Testnet address on a mainnet payout.
        assert!(Payout::new("task_1", AGENT, 1, StacksNetwork::Mainnet)
            .validate()
            .is_err());
    }

    #[test]
    fn test_amount_stx() {
        let payout = Payout::new("task_1", AGENT, 19_800, StacksNetwork::Testnet);
        assert_eq!(payout.amount_stx(), "0.019800");
    }
}
