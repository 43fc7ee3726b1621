//! Agent commands.

use stackwork_ops::{AgentUpdate, NewAgent};
use stackwork_types::{is_valid_address, TaskCategory};

use crate::cli::{AgentCommand, CategoryArg};
use crate::config::CliConfig;
use crate::context::MarketContext;
use crate::error::CliResult;
use crate::output::{AgentListOutput, AgentOutput, OutputFormat, Render};

fn categories(args: Vec<CategoryArg>) -> impl Iterator<Item = TaskCategory> {
    args.into_iter().map(TaskCategory::from)
}

/// Execute an agent subcommand.
pub fn agent(config: CliConfig, format: OutputFormat, command: AgentCommand) -> CliResult<String> {
    let ctx = MarketContext::open(config)?;
    let engine = &ctx.engine;

    match command {
        AgentCommand::Register {
            name,
            wallet,
            bio,
            capabilities,
        } => {
            let request = NewAgent::new(name, wallet)
                .with_bio(bio)
                .with_capabilities(categories(capabilities));
            let agent = engine.register_agent(request)?;
            Ok(AgentOutput {
                agent,
                reviews: None,
            }
            .render(format))
        }
        AgentCommand::Update {
            agent_id,
            wallet,
            name,
            bio,
            capabilities,
        } => {
            let update = AgentUpdate {
                name,
                bio,
                capabilities: capabilities.map(|c| categories(c).collect()),
            };
            let agent = engine.update_agent(&agent_id, &wallet, update)?;
            Ok(AgentOutput {
                agent,
                reviews: None,
            }
            .render(format))
        }
        AgentCommand::Show { agent } => {
            let agent = if is_valid_address(&agent) {
                engine.find_agent_by_wallet(&agent)?
            } else {
                engine.get_agent(&agent)?
            };
            let reviews = engine.list_agent_reviews(&agent.id)?;
            Ok(AgentOutput {
                agent,
                reviews: Some(reviews),
            }
            .render(format))
        }
        AgentCommand::List { limit } => {
            let agents = engine.list_agents(Some(limit))?;
            let total = agents.len();
            Ok(AgentListOutput { agents, total }.render(format))
        }
    }
}
