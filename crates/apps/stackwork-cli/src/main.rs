//! Stackwork CLI binary entry point.

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stackwork_cli::{
    cli::{Cli, Commands},
    commands,
    config::{default_config_path, CliConfig},
    error::{CliError, CliResult},
};

fn main() {
    let cli = Cli::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            let e = CliError::from(e);
            print_error(&e);
            std::process::exit(e.exit_code());
        }
    };
    rt.block_on(async_main(cli));
}

async fn async_main(cli: Cli) {
    // Initialize logging based on --verbose flag or RUST_LOG env var
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if cli.verbose || has_rust_log {
        let mut filter = EnvFilter::from_default_env();
        if cli.verbose {
            if let Ok(directive) = "stackwork=debug".parse() {
                filter = filter.add_directive(directive);
            }
        }
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    match run(cli).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            print_error(&e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Print the error and a recovery hint when one applies.
fn print_error(e: &CliError) {
    eprintln!("{}: {}", "Error".red().bold(), e);
    if let Some(hint) = e.hint() {
        eprintln!("{}: {}", "Hint".cyan(), hint);
    }
}

async fn run(cli: Cli) -> CliResult<String> {
    let format = cli.format();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = CliConfig::load(&config_path)?;

    match cli.command {
        // Setup
        Commands::Init {
            platform_wallet,
            network,
            force,
        } => commands::init(config, &config_path, format, platform_wallet, network.into(), force),
        Commands::Keygen => commands::keygen(format),

        // Market
        Commands::Agent(command) => commands::agent(config, format, command),
        Commands::Task(command) => commands::task(config, format, command).await,
        Commands::Stats => commands::stats(config, format),

        // Payment protocol
        Commands::Pay(command) => commands::pay(config, format, command).await,
    }
}
