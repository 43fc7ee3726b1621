//! End-to-end flows through the public command API with a config file on disk.

use stackwork_cli::cli::{AgentCommand, CategoryArg, CreateTaskArgs, TaskCommand};
use stackwork_cli::commands;
use stackwork_cli::{CliConfig, CliError, OutputFormat};
use stackwork_types::StacksNetwork;
use tempfile::TempDir;

const PLATFORM_WALLET: &str = "ST3AM1A56AK2C1XAFJ4115ZSV26EB49BVQ10MGCS0";
const POSTER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
const AGENT_WALLET: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";

fn json(output: Result<String, CliError>) -> serde_json::Value {
    serde_json::from_str(&output.unwrap()).unwrap()
}

/// Run `init` against a fresh directory and reload the written config.
fn initialized(temp_dir: &TempDir) -> CliConfig {
    let config_path = temp_dir.path().join("config.toml");
    let mut config = CliConfig::default();
    config.storage.data_dir = Some(temp_dir.path().to_path_buf());
    config.payment.key_path = Some(temp_dir.path().join("identity").join("payment.key"));

    commands::init(
        config,
        &config_path,
        OutputFormat::Json,
        Some(PLATFORM_WALLET.to_string()),
        StacksNetwork::Testnet,
        false,
    )
    .unwrap();
    CliConfig::load(&config_path).unwrap()
}

#[tokio::test]
async fn test_market_round_trip_after_init() {
    let temp_dir = TempDir::new().unwrap();
    let config = initialized(&temp_dir);

    let agent = json(commands::agent(
        config.clone(),
        OutputFormat::Json,
        AgentCommand::Register {
            name: "scribe".into(),
            wallet: AGENT_WALLET.into(),
            bio: String::new(),
            capabilities: vec![CategoryArg::Writing],
        },
    ));
    let agent_id = agent["id"].as_str().unwrap().to_string();

    let task = json(
        commands::task(
            config.clone(),
            OutputFormat::Json,
            TaskCommand::Create(CreateTaskArgs {
                title: "Translate a README".into(),
                description: "English to Spanish".into(),
                bounty: "1.5".into(),
                poster: POSTER.into(),
                category: CategoryArg::Translation,
                network: None,
            }),
        )
        .await,
    );
    let task_id = task["id"].as_str().unwrap().to_string();
    assert_eq!(task["network"], "testnet");

    for command in [
        TaskCommand::Claim {
            task_id: task_id.clone(),
            agent: agent_id.clone(),
        },
        TaskCommand::Submit {
            task_id: task_id.clone(),
            agent: agent_id.clone(),
            result: Some("Hecho".into()),
            result_file: None,
        },
    ] {
        commands::task(config.clone(), OutputFormat::Json, command)
            .await
            .unwrap();
    }

    let approved = json(
        commands::task(
            config.clone(),
            OutputFormat::Json,
            TaskCommand::Approve {
                task_id,
                poster: POSTER.into(),
            },
        )
        .await,
    );
    assert_eq!(approved["payout"], "1.485000");
    assert_eq!(approved["platformWallet"], PLATFORM_WALLET);

    // Counters survive reopening the store.
    let stats = json(commands::stats(config.clone(), OutputFormat::Json));
    assert_eq!(stats["totalTasks"], 1);
    assert_eq!(stats["tasksByStatus"]["completed"], 1);

    let shown = json(commands::agent(
        config,
        OutputFormat::Json,
        AgentCommand::Show { agent: agent_id },
    ));
    assert_eq!(shown["tasksCompleted"], 1);
    assert_eq!(shown["totalEarned"], "1.485000");
}

#[test]
fn test_commands_fail_without_platform_wallet() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = CliConfig::default();
    config.storage.data_dir = Some(temp_dir.path().to_path_buf());

    let err = commands::stats(config, OutputFormat::Human).unwrap_err();
    assert!(matches!(err, CliError::Config(_)));
    assert!(err.hint().is_some());
}
