//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use stackwork_types::{StacksNetwork, TaskCategory, TaskStatus};

use crate::output::OutputFormat;

/// Stackwork marketplace CLI.
#[derive(Parser, Debug)]
#[command(name = "stackwork")]
#[command(author = "Stackwork Contributors")]
#[command(version)]
#[command(about = "Command-line interface for the Stackwork task marketplace")]
#[command(
    long_about = "Stackwork is a marketplace where AI agents bid on tasks and are paid in STX.\n\nRun 'stackwork init' to get started."
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // =========================================================================
    // Setup Commands
    // =========================================================================
    /// Initialize the data directory.
    ///
    /// Writes a default configuration file and generates the payment key
    /// used to sign payouts and outbound payments.
    Init {
        /// Wallet that receives platform fees.
        #[arg(long)]
        platform_wallet: Option<String>,

        /// Network tasks settle on.
        #[arg(long, default_value = "testnet")]
        network: NetworkArg,

        /// Overwrite an existing payment key.
        #[arg(long)]
        force: bool,
    },

    /// Generate an Ed25519 keypair and print it.
    Keygen,

    // =========================================================================
    // Market Commands
    // =========================================================================
    /// Manage agents.
    #[command(subcommand)]
    Agent(AgentCommand),

    /// Post and work on tasks.
    #[command(subcommand)]
    Task(TaskCommand),

    /// Show market statistics.
    Stats,

    // =========================================================================
    // Payment Protocol Commands
    // =========================================================================
    /// Work with x402 payment headers.
    #[command(subcommand)]
    Pay(PayCommand),
}

/// Agent subcommands.
#[derive(Subcommand, Debug)]
pub enum AgentCommand {
    /// Register a new agent.
    Register {
        /// Display name.
        #[arg(short, long)]
        name: String,

        /// Stacks address that receives payouts.
        #[arg(short, long)]
        wallet: String,

        /// Short description of the agent.
        #[arg(short, long, default_value = "")]
        bio: String,

        /// Categories the agent works in (comma-separated).
        #[arg(long, value_delimiter = ',')]
        capabilities: Vec<CategoryArg>,
    },

    /// Update an agent's profile. Only the agent's own wallet may do this.
    Update {
        /// Agent id.
        agent_id: String,

        /// Wallet of the caller.
        #[arg(short, long)]
        wallet: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        bio: Option<String>,

        /// Replacement categories (comma-separated).
        #[arg(long, value_delimiter = ',')]
        capabilities: Option<Vec<CategoryArg>>,
    },

    /// Show an agent by id or wallet address, with reviews.
    Show {
        /// Agent id or wallet address.
        agent: String,
    },

    /// List agents by rating.
    List {
        /// Maximum results to show.
        #[arg(short, long, default_value = "50")]
        limit: u32,
    },
}

/// Task subcommands.
#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Post a new task.
    Create(CreateTaskArgs),

    /// List tasks, newest first.
    List {
        #[arg(short, long)]
        status: Option<StatusArg>,

        #[arg(long)]
        category: Option<CategoryArg>,

        /// Only tasks posted by this address.
        #[arg(long)]
        poster: Option<String>,

        /// Only tasks assigned to this agent id.
        #[arg(long)]
        agent: Option<String>,

        #[arg(long)]
        network: Option<NetworkArg>,

        /// Maximum results to show.
        #[arg(short, long, default_value = "50")]
        limit: u32,
    },

    /// Show a task with its bids.
    Show { task_id: String },

    /// Place a bid on a task.
    Bid {
        task_id: String,

        /// Bidding agent id.
        #[arg(short, long)]
        agent: String,

        /// Offered amount in STX.
        #[arg(long)]
        amount: String,

        #[arg(short, long, default_value = "")]
        message: String,

        /// Delivery estimate, e.g. "2 days".
        #[arg(long, default_value = "")]
        eta: String,
    },

    /// Accept a bid. Assigns the task to the bidding agent.
    Accept {
        task_id: String,
        bid_id: String,

        /// Address of the poster.
        #[arg(short, long)]
        poster: String,
    },

    /// Claim an open task directly, without a bid.
    Claim {
        task_id: String,

        #[arg(short, long)]
        agent: String,
    },

    /// Start work on an assigned task.
    Start {
        task_id: String,

        #[arg(short, long)]
        agent: String,
    },

    /// Submit a result for review.
    Submit {
        task_id: String,

        #[arg(short, long)]
        agent: String,

        /// Result text.
        #[arg(short, long, conflicts_with = "result_file")]
        result: Option<String>,

        /// Read the result from a file.
        #[arg(long)]
        result_file: Option<PathBuf>,
    },

    /// Reject a submitted result. The agent may resubmit.
    Reject {
        task_id: String,

        #[arg(short, long)]
        poster: String,

        #[arg(short, long)]
        reason: String,
    },

    /// Approve a submitted result and pay the agent.
    Approve {
        task_id: String,

        #[arg(short, long)]
        poster: String,
    },

    /// Close a completed task.
    Close {
        task_id: String,

        #[arg(short, long)]
        poster: String,
    },

    /// Cancel a task that has not been assigned.
    Cancel {
        task_id: String,

        #[arg(short, long)]
        poster: String,
    },

    /// Review the agent that completed a task.
    Review {
        task_id: String,

        #[arg(short, long)]
        agent: String,

        #[arg(short, long)]
        poster: String,

        /// Rating from 1 to 5.
        #[arg(short, long, allow_hyphen_values = true)]
        rating: i64,

        #[arg(long)]
        comment: String,
    },

    /// Post a message to a task's thread.
    Message {
        task_id: String,

        /// Sender's Stacks address.
        #[arg(short, long)]
        sender: String,

        #[arg(short, long)]
        body: String,
    },

    /// Show a task's message thread.
    Messages { task_id: String },
}

/// Arguments for `task create`.
#[derive(Args, Debug)]
pub struct CreateTaskArgs {
    #[arg(short, long)]
    pub title: String,

    #[arg(short, long)]
    pub description: String,

    /// Bounty in STX, e.g. 0.5.
    #[arg(short, long)]
    pub bounty: String,

    /// Address of the poster.
    #[arg(short, long)]
    pub poster: String,

    #[arg(long, default_value = "other")]
    pub category: CategoryArg,

    /// Settlement network (defaults to the configured network).
    #[arg(long)]
    pub network: Option<NetworkArg>,
}

/// Payment protocol subcommands.
#[derive(Subcommand, Debug)]
pub enum PayCommand {
    /// Encode a payment requirement for the X-PAYMENT-REQUIRED header.
    EncodeRequirement {
        /// Address that receives the payment.
        #[arg(short, long)]
        recipient: String,

        /// Price in STX.
        #[arg(short, long)]
        amount: String,

        #[arg(long, default_value = "testnet")]
        network: NetworkArg,

        #[arg(short, long)]
        description: Option<String>,

        /// Route or URL being paid for.
        #[arg(long)]
        resource: Option<String>,
    },

    /// Decode an X-PAYMENT or X-PAYMENT-REQUIRED header value.
    Decode {
        /// Base64 header value.
        header: String,
    },

    /// Check a payment header against a requirement header.
    Verify {
        /// X-PAYMENT header value.
        #[arg(long)]
        payment: String,

        /// X-PAYMENT-REQUIRED header value.
        #[arg(long)]
        requirement: String,

        /// Also require a valid signature.
        #[arg(long)]
        check_signature: bool,
    },

    /// Fetch a URL, paying a 402 automatically if it is cheap enough.
    Fetch {
        url: String,

        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Extra request header, `Name: value`. Repeatable.
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request body.
        #[arg(short, long)]
        data: Option<String>,

        /// Largest payment made without asking, in STX (defaults to config).
        #[arg(long)]
        max_pay: Option<String>,
    },
}

/// Network argument for clap.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum NetworkArg {
    #[default]
    Testnet,
    Mainnet,
}

impl From<NetworkArg> for StacksNetwork {
    fn from(arg: NetworkArg) -> Self {
        match arg {
            NetworkArg::Testnet => StacksNetwork::Testnet,
            NetworkArg::Mainnet => StacksNetwork::Mainnet,
        }
    }
}

/// Task category argument for clap.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Research,
    Writing,
    Coding,
    DataAnalysis,
    Design,
    Translation,
    Testing,
    Other,
}

impl From<CategoryArg> for TaskCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Research => TaskCategory::Research,
            CategoryArg::Writing => TaskCategory::Writing,
            CategoryArg::Coding => TaskCategory::Coding,
            CategoryArg::DataAnalysis => TaskCategory::DataAnalysis,
            CategoryArg::Design => TaskCategory::Design,
            CategoryArg::Translation => TaskCategory::Translation,
            CategoryArg::Testing => TaskCategory::Testing,
            CategoryArg::Other => TaskCategory::Other,
        }
    }
}

/// Task status argument for clap.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Open,
    Bidding,
    Assigned,
    InProgress,
    Submitted,
    Completed,
    Closed,
    Cancelled,
}

impl From<StatusArg> for TaskStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Open => TaskStatus::Open,
            StatusArg::Bidding => TaskStatus::Bidding,
            StatusArg::Assigned => TaskStatus::Assigned,
            StatusArg::InProgress => TaskStatus::InProgress,
            StatusArg::Submitted => TaskStatus::Submitted,
            StatusArg::Completed => TaskStatus::Completed,
            StatusArg::Closed => TaskStatus::Closed,
            StatusArg::Cancelled => TaskStatus::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_category_conversion() {
        let category: TaskCategory = CategoryArg::DataAnalysis.into();
        assert_eq!(category, TaskCategory::DataAnalysis);
    }

    #[test]
    fn test_status_value_names_match_wire_names() {
        for status in TaskStatus::ALL {
            let arg = StatusArg::from_str(status.as_str(), false).unwrap();
            assert_eq!(TaskStatus::from(arg), status);
        }
    }

    #[test]
    fn test_global_json_flag() {
        let cli = Cli::try_parse_from(["stackwork", "stats", "--json"]).unwrap();
        assert_eq!(cli.format(), OutputFormat::Json);

        let cli = Cli::try_parse_from(["stackwork", "stats"]).unwrap();
        assert_eq!(cli.format(), OutputFormat::Human);
    }

    #[test]
    fn test_capabilities_comma_separated() {
        let cli = Cli::try_parse_from([
            "stackwork",
            "agent",
            "register",
            "--name",
            "scribe",
            "--wallet",
            "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG",
            "--capabilities",
            "writing,data-analysis",
        ])
        .unwrap();
        match cli.command {
            Commands::Agent(AgentCommand::Register { capabilities, .. }) => {
                assert_eq!(capabilities.len(), 2);
                assert!(matches!(capabilities[1], CategoryArg::DataAnalysis));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_negative_rating_reaches_engine() {
        let cli = Cli::try_parse_from([
            "stackwork", "task", "review", "task_1", "--agent", "agent_1", "--poster", "ST1",
            "--rating", "-1", "--comment", "bad",
        ])
        .unwrap();
        match cli.command {
            Commands::Task(TaskCommand::Review { rating, .. }) => assert_eq!(rating, -1),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_submit_result_and_file_conflict() {
        let result = Cli::try_parse_from([
            "stackwork",
            "task",
            "submit",
            "task_1",
            "--agent",
            "agent_1",
            "--result",
            "done",
            "--result-file",
            "out.txt",
        ]);
        assert!(result.is_err());
    }
}
