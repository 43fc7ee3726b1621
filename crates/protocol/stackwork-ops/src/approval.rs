//! Approval: the payment trigger.
//!
//! 1. Check poster and `submitted` status
//! 2. Split the bounty into platform fee and payout (integer micro-STX)
//! 3. Obtain a transaction id from the settlement backend, bounded by
//!    `settlement_timeout`, falling back to a simulated id when enabled
//! 4. Complete the task and credit the agent in one store transaction

use stackwork_crypto::current_timestamp;
use stackwork_settle::{Payout, SettleError, TransactionId};
use stackwork_store::{Completion, TaskStore};
use stackwork_types::{format_stx, split_fee, Agent, Task, TaskStatus};
use tracing::{error, info, warn};

use crate::engine::{require_poster, require_status, TaskEngine};
use crate::error::{OpsError, OpsResult};
use crate::events::MarketEvent;

impl TaskEngine {
    /// Approve a submitted result and pay the assigned agent.
    ///
    /// On any failure the task stays `submitted` and the agent's counters
    /// are untouched.
    pub async fn approve_task(&self, task_id: &str, poster_address: &str) -> OpsResult<Task> {
        let task = self.load_task(task_id)?;
        require_poster(&task, poster_address, "approve this task")?;
        require_status(&task, &[TaskStatus::Submitted])?;

        let agent_id = task
            .assigned_agent
            .clone()
            .ok_or_else(|| OpsError::validation(format!("Task {} has no assigned agent", task_id)))?;
        let agent = self.load_agent(&agent_id)?;

        let (fee_micro, payout_micro) = split_fee(task.bounty_micro, self.config.fee_bps);
        let tx_id = self.pay_agent(&task, &agent, payout_micro).await?;
        let simulated = tx_id.is_simulated();

        let completion = Completion {
            agent_id: agent.id.clone(),
            fee_micro,
            payout_micro,
            platform_wallet: self.config.platform_wallet.clone(),
            tx_id: tx_id.into_inner(),
        };
        let task = self
            .state
            .tasks
            .complete(task_id, &completion, current_timestamp())
            .map_err(|e| {
                error!(
                    task_id,
                    tx_id = %completion.tx_id,
                    error = %e,
                    "Payout issued but completion was not recorded"
                );
                OpsError::from_store(e, &[TaskStatus::Submitted])
            })?;

        info!(
            task_id,
            agent_id = %agent.id,
            fee = %format_stx(fee_micro),
            payout = %format_stx(payout_micro),
            tx_id = %completion.tx_id,
            simulated,
            "Task approved"
        );
        self.emit(MarketEvent::TaskCompleted {
            task: task.clone(),
            simulated,
        });
        Ok(task)
    }

    async fn pay_agent(&self, task: &Task, agent: &Agent, amount: u64) -> OpsResult<TransactionId> {
        let payout = Payout::new(&task.id, &agent.wallet_address, amount, task.network);
        let limit = self.config.settlement_timeout;
        let backend = self.settlement.name();

        let attempt = async {
            self.settlement.health().await?;
            self.settlement.settle_payout(&payout).await
        };
        let outcome = match tokio::time::timeout(limit, attempt).await {
            Ok(result) => result,
            Err(_) => Err(SettleError::elapsed("payout settlement", limit)),
        };

        match outcome {
            Ok(receipt) => {
                info!(
                    task_id = %task.id,
                    backend,
                    tx_id = %receipt.tx_id,
                    status = %receipt.status,
                    "Payout settled"
                );
                Ok(receipt.tx_id)
            }
            Err(e) if self.config.simulate_on_failure => {
                let tx_id = TransactionId::simulated();
                warn!(
                    task_id = %task.id,
                    backend,
                    error = %e,
                    tx_id = %tx_id,
                    "Settlement unavailable, recording simulated payout"
                );
                Ok(tx_id)
            }
            Err(e) => {
                warn!(task_id = %task.id, backend, error = %e, "Settlement failed");
                Err(OpsError::settlement(e.to_string()))
            }
        }
    }
}
