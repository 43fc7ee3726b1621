//! Output formatting for CLI.

use colored::Colorize;
use serde::Serialize;
use stackwork_ops::MarketStats;
use stackwork_types::{format_stx, Agent, Bid, Message, Review, Task};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Trait for renderable output.
pub trait Render {
    /// Render as human-readable string.
    fn render_human(&self) -> String;

    /// Render as JSON string.
    fn render_json(&self) -> String;

    /// Render in the specified format.
    fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Human => self.render_human(),
            OutputFormat::Json => self.render_json(),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Display an amount with its unit.
pub fn stx(amount: &str) -> String {
    format!("{} STX", amount)
}

fn short_time(ms: u64) -> String {
    // Seconds are enough for a terminal listing.
    format!("{}s", ms / 1000)
}

// =============================================================================
// Setup Output
// =============================================================================

/// Output for `init`.
#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub data_dir: String,
    pub config_path: String,
    pub public_key: String,
    pub key_created: bool,
}

impl Render for InitOutput {
    fn render_human(&self) -> String {
        let key_line = if self.key_created {
            format!("{} {}", "Payment key created:".green().bold(), self.public_key)
        } else {
            format!("{} {}", "Payment key kept:".yellow(), self.public_key)
        };
        format!(
            "{}\n{} {}\n{} {}",
            key_line,
            "Data directory:".green(),
            self.data_dir,
            "Configuration saved to:".green(),
            self.config_path
        )
    }

    fn render_json(&self) -> String {
        to_json(self)
    }
}

/// Output for `keygen`.
#[derive(Debug, Serialize)]
pub struct KeygenOutput {
    pub private_key: String,
    pub public_key: String,
}

impl Render for KeygenOutput {
    fn render_human(&self) -> String {
        format!(
            "{} {}\n{} {}",
            "Private Key:".bold(),
            self.private_key,
            "Public Key:".bold(),
            self.public_key
        )
    }

    fn render_json(&self) -> String {
        to_json(self)
    }
}

// =============================================================================
// Market Output
// =============================================================================

/// A single task, optionally with its bids.
#[derive(Debug, Serialize)]
pub struct TaskOutput {
    #[serde(flatten)]
    pub task: Task,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bids: Option<Vec<Bid>>,
}

impl TaskOutput {
    pub fn new(task: Task) -> Self {
        Self { task, bids: None }
    }

    pub fn with_bids(task: Task, bids: Vec<Bid>) -> Self {
        Self {
            task,
            bids: Some(bids),
        }
    }
}

impl Render for TaskOutput {
    fn render_human(&self) -> String {
        let task = &self.task;
        let mut lines = vec![
            format!("{} {}", "Task:".bold(), task.id),
            format!("{} \"{}\"", "Title:".bold(), task.title),
            format!("{} {}", "Status:".bold(), task.status.to_string().cyan()),
            format!("{} {}", "Category:".bold(), task.category),
            format!("{} {} ({})", "Bounty:".bold(), stx(&task.bounty), task.network),
            format!("{} {}", "Poster:".bold(), task.poster_address),
        ];
        if let Some(agent) = &task.assigned_agent {
            lines.push(format!("{} {}", "Assigned:".bold(), agent));
        }
        if let Some(result) = &task.result {
            lines.push(format!("{} {}", "Result:".bold(), result));
        }
        if let Some(reason) = &task.rejection_reason {
            lines.push(format!("{} {}", "Last rejection:".bold(), reason));
        }
        if let Some(tx_id) = &task.payment_tx_id {
            lines.push(format!("{} {}", "Payment tx:".bold(), tx_id));
        }
        if let Some(fee) = &task.platform_fee {
            lines.push(format!("{} {}", "Platform fee:".bold(), stx(fee)));
        }
        if let Some(bids) = &self.bids {
            if bids.is_empty() {
                lines.push(format!("{}", "No bids yet.".dimmed()));
            } else {
                lines.push(format!("{} ({})", "Bids:".bold(), bids.len()));
                for bid in bids {
                    lines.push(format!(
                        "  {} {} by {} {}",
                        bid.id,
                        stx(&bid.amount),
                        bid.agent_id,
                        bid.estimated_time.dimmed()
                    ));
                }
            }
        }
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        to_json(self)
    }
}

/// Output for `task list`.
#[derive(Debug, Serialize)]
pub struct TaskListOutput {
    pub tasks: Vec<Task>,
    pub total: usize,
}

impl Render for TaskListOutput {
    fn render_human(&self) -> String {
        if self.tasks.is_empty() {
            return "No tasks found.".to_string();
        }
        let mut lines = vec![format!("{} ({})", "Tasks".bold(), self.total)];
        for task in &self.tasks {
            lines.push(format!(
                "  {} [{}] {} \"{}\"",
                task.id,
                task.status.to_string().cyan(),
                stx(&task.bounty),
                task.title
            ));
        }
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        to_json(self)
    }
}

/// Output for `task bid`.
#[derive(Debug, Serialize)]
pub struct BidOutput {
    #[serde(flatten)]
    pub bid: Bid,
}

impl Render for BidOutput {
    fn render_human(&self) -> String {
        format!(
            "{} {}\n{} {}\n{} {}",
            "Bid placed:".green().bold(),
            self.bid.id,
            "Task:".bold(),
            self.bid.task_id,
            "Amount:".bold(),
            stx(&self.bid.amount)
        )
    }

    fn render_json(&self) -> String {
        to_json(self)
    }
}

/// Output for `task approve`.
#[derive(Debug, Serialize)]
pub struct ApproveOutput {
    #[serde(flatten)]
    pub task: Task,
    pub payout: String,
    pub simulated: bool,
}

impl Render for ApproveOutput {
    fn render_human(&self) -> String {
        let tx_id = self.task.payment_tx_id.as_deref().unwrap_or("-");
        let mut lines = vec![
            format!("{} {}", "Task approved:".green().bold(), self.task.id),
            format!("{} {}", "Payout:".bold(), stx(&self.payout)),
            format!(
                "{} {}",
                "Platform fee:".bold(),
                stx(self.task.platform_fee.as_deref().unwrap_or("0.000000"))
            ),
            format!("{} {}", "Transaction:".bold(), tx_id),
        ];
        if self.simulated {
            lines.push(format!(
                "{}",
                "Settlement was simulated; no funds moved.".yellow()
            ));
        }
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        to_json(self)
    }
}

/// A single agent with its reviews.
#[derive(Debug, Serialize)]
pub struct AgentOutput {
    #[serde(flatten)]
    pub agent: Agent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<Review>>,
}

impl Render for AgentOutput {
    fn render_human(&self) -> String {
        let agent = &self.agent;
        let capabilities: Vec<String> = agent.capabilities.iter().map(|c| c.to_string()).collect();
        let mut lines = vec![
            format!("{} {}", "Agent:".bold(), agent.id),
            format!("{} {}", "Name:".bold(), agent.name),
            format!("{} {}", "Wallet:".bold(), agent.wallet_address),
            format!("{} {}", "Completed:".bold(), agent.tasks_completed),
            format!("{} {}", "Earned:".bold(), stx(&agent.total_earned)),
            format!(
                "{} {:.2} ({} reviews)",
                "Rating:".bold(),
                agent.avg_rating,
                agent.total_reviews
            ),
        ];
        if !agent.bio.is_empty() {
            lines.push(format!("{} {}", "Bio:".bold(), agent.bio));
        }
        if !capabilities.is_empty() {
            lines.push(format!("{} {}", "Capabilities:".bold(), capabilities.join(", ")));
        }
        if let Some(reviews) = &self.reviews {
            for review in reviews {
                lines.push(format!(
                    "  {} {} \"{}\"",
                    "★".repeat(review.rating as usize).yellow(),
                    review.task_id,
                    review.comment
                ));
            }
        }
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        to_json(self)
    }
}

/// Output for `agent list`.
#[derive(Debug, Serialize)]
pub struct AgentListOutput {
    pub agents: Vec<Agent>,
    pub total: usize,
}

impl Render for AgentListOutput {
    fn render_human(&self) -> String {
        if self.agents.is_empty() {
            return "No agents registered.".to_string();
        }
        let mut lines = vec![format!("{} ({})", "Agents".bold(), self.total)];
        for agent in &self.agents {
            lines.push(format!(
                "  {} {} {:.2}★ {} done",
                agent.id, agent.name, agent.avg_rating, agent.tasks_completed
            ));
        }
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        to_json(self)
    }
}

/// Output for `task review`.
#[derive(Debug, Serialize)]
pub struct ReviewOutput {
    #[serde(flatten)]
    pub review: Review,
}

impl Render for ReviewOutput {
    fn render_human(&self) -> String {
        format!(
            "{} {}\n{} {}/5",
            "Review submitted:".green().bold(),
            self.review.id,
            "Rating:".bold(),
            self.review.rating
        )
    }

    fn render_json(&self) -> String {
        to_json(self)
    }
}

/// Output for `task message` and `task messages`.
#[derive(Debug, Serialize)]
pub struct MessagesOutput {
    pub task_id: String,
    pub messages: Vec<Message>,
}

impl Render for MessagesOutput {
    fn render_human(&self) -> String {
        if self.messages.is_empty() {
            return format!("No messages on {}.", self.task_id);
        }
        self.messages
            .iter()
            .map(|m| {
                format!(
                    "[{}] {}: {}",
                    short_time(m.created_at).dimmed(),
                    m.sender_address.bold(),
                    m.body
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_json(&self) -> String {
        to_json(self)
    }
}

/// Output for `stats`.
#[derive(Debug, Serialize)]
pub struct StatsOutput {
    #[serde(flatten)]
    pub stats: MarketStats,
}

impl Render for StatsOutput {
    fn render_human(&self) -> String {
        let stats = &self.stats;
        let mut lines = vec![
            format!("{} {}", "Tasks:".bold(), stats.total_tasks),
            format!("{} {}", "Agents:".bold(), stats.total_agents),
            format!("{} {}", "Bids:".bold(), stats.total_bids),
            format!("{} {}", "Reviews:".bold(), stats.total_reviews),
            format!(
                "{} {}",
                "Posted volume:".bold(),
                stx(&format_stx(stats.posted_volume_micro))
            ),
            format!(
                "{} {}",
                "Paid volume:".bold(),
                stx(&format_stx(stats.paid_volume_micro))
            ),
            format!(
                "{} {}",
                "Fees collected:".bold(),
                stx(&format_stx(stats.fees_collected_micro))
            ),
            format!("{}", "By status:".bold()),
        ];
        for (status, count) in &stats.tasks_by_status {
            lines.push(format!("  {:<12} {}", status, count));
        }
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        to_json(self)
    }
}

// =============================================================================
// Payment Output
// =============================================================================

/// Output for `pay encode-requirement`.
#[derive(Debug, Serialize)]
pub struct EncodedHeaderOutput {
    pub header: String,
    pub value: String,
}

impl Render for EncodedHeaderOutput {
    fn render_human(&self) -> String {
        format!("{}: {}", self.header.bold(), self.value)
    }

    fn render_json(&self) -> String {
        to_json(self)
    }
}

/// Output for `pay decode`.
#[derive(Debug, Serialize)]
pub struct DecodedOutput {
    /// `payment` or `requirement`.
    pub kind: String,
    pub value: serde_json::Value,
}

impl Render for DecodedOutput {
    fn render_human(&self) -> String {
        format!(
            "{} {}\n{}",
            "Decoded".bold(),
            self.kind,
            serde_json::to_string_pretty(&self.value).unwrap_or_default()
        )
    }

    fn render_json(&self) -> String {
        to_json(self)
    }
}

/// Output for `pay verify`.
#[derive(Debug, Serialize)]
pub struct VerifyOutput {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
}

impl Render for VerifyOutput {
    fn render_human(&self) -> String {
        if self.valid {
            format!(
                "{} {} micro-STX (nonce {})",
                "Payment valid:".green().bold(),
                self.amount.as_deref().unwrap_or("?"),
                self.nonce.unwrap_or_default()
            )
        } else {
            format!(
                "{} {}",
                "Payment rejected:".red().bold(),
                self.reason.as_deref().unwrap_or("unknown reason")
            )
        }
    }

    fn render_json(&self) -> String {
        to_json(self)
    }
}

/// Output for `pay fetch`.
#[derive(Debug, Serialize)]
pub struct FetchOutput {
    pub status: u16,
    pub paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_response: Option<String>,
    pub body: String,
}

impl Render for FetchOutput {
    fn render_human(&self) -> String {
        let status = if self.status == 402 {
            self.status.to_string().red().bold()
        } else {
            self.status.to_string().green().bold()
        };
        let mut lines = vec![format!("{} {}", "Status:".bold(), status)];
        if self.paid {
            lines.push(format!("{}", "Paid automatically.".yellow()));
        }
        if let Some(receipt) = &self.payment_response {
            lines.push(format!("{} {}", "X-PAYMENT-RESPONSE:".bold(), receipt));
        }
        lines.push(self.body.clone());
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        to_json(self)
    }
}

/// Plain confirmation line.
#[derive(Debug, Serialize)]
pub struct MessageOutput {
    pub message: String,
}

impl Render for MessageOutput {
    fn render_human(&self) -> String {
        self.message.clone()
    }

    fn render_json(&self) -> String {
        to_json(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackwork_types::{StacksNetwork, TaskCategory};

    fn task() -> Task {
        Task::new(
            "task_1",
            "Summarize",
            "Summarize a paper",
            TaskCategory::Writing,
            20_000,
            StacksNetwork::Testnet,
            "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM",
            1_000,
        )
    }

    #[test]
    fn test_task_output_json_is_flat() {
        let json = TaskOutput::new(task()).render(OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["id"], "task_1");
        assert_eq!(value["bounty"], "0.020000");
        assert!(value.get("bids").is_none());
    }

    #[test]
    fn test_task_output_human_lists_bids() {
        let output = TaskOutput::with_bids(task(), vec![]);
        let human = output.render(OutputFormat::Human);
        assert!(human.contains("task_1"));
        assert!(human.contains("0.020000 STX"));
        assert!(human.contains("No bids yet."));
    }

    #[test]
    fn test_empty_task_list() {
        let output = TaskListOutput {
            tasks: vec![],
            total: 0,
        };
        assert_eq!(output.render(OutputFormat::Human), "No tasks found.");
        assert!(output.render(OutputFormat::Json).contains("\"total\": 0"));
    }

    #[test]
    fn test_verify_output() {
        let rejected = VerifyOutput {
            valid: false,
            reason: Some("Payment expired".into()),
            amount: None,
            nonce: None,
        };
        assert!(rejected.render(OutputFormat::Human).contains("Payment expired"));
        let json = rejected.render(OutputFormat::Json);
        assert!(json.contains("\"valid\": false"));
        assert!(!json.contains("amount"));
    }

    #[test]
    fn test_stats_output_formats_volumes() {
        let stats = MarketStats {
            posted_volume_micro: 1_750_000,
            fees_collected_micro: 10_000,
            ..Default::default()
        };
        let human = StatsOutput { stats }.render(OutputFormat::Human);
        assert!(human.contains("1.750000 STX"));
        assert!(human.contains("0.010000 STX"));
    }
}
