//! Task lifecycle commands.

use stackwork_ops::{NewBid, NewReview, NewTask, TaskFilter};
use stackwork_types::{format_stx, StacksNetwork, TaskCategory, TaskStatus};

use crate::cli::{CreateTaskArgs, TaskCommand};
use crate::config::CliConfig;
use crate::context::MarketContext;
use crate::error::{CliError, CliResult};
use crate::output::{
    ApproveOutput, BidOutput, MessageOutput, MessagesOutput, OutputFormat, Render, ReviewOutput,
    TaskListOutput, TaskOutput,
};

/// Execute a task subcommand.
pub async fn task(config: CliConfig, format: OutputFormat, command: TaskCommand) -> CliResult<String> {
    let ctx = MarketContext::open(config)?;
    let engine = &ctx.engine;

    let output = match command {
        TaskCommand::Create(args) => {
            let task = engine.create_task(new_task(args))?;
            TaskOutput::new(task).render(format)
        }
        TaskCommand::List {
            status,
            category,
            poster,
            agent,
            network,
            limit,
        } => {
            let mut filter = TaskFilter::new().with_limit(limit);
            if let Some(status) = status {
                filter = filter.with_status(TaskStatus::from(status));
            }
            if let Some(category) = category {
                filter = filter.with_category(TaskCategory::from(category));
            }
            if let Some(poster) = poster {
                filter = filter.with_poster(poster);
            }
            if let Some(agent) = agent {
                filter = filter.with_assigned_agent(agent);
            }
            if let Some(network) = network {
                filter = filter.with_network(StacksNetwork::from(network));
            }
            let tasks = engine.list_tasks(&filter)?;
            let total = tasks.len();
            TaskListOutput { tasks, total }.render(format)
        }
        TaskCommand::Show { task_id } => {
            let task = engine.get_task(&task_id)?;
            let bids = engine.list_bids(&task_id)?;
            TaskOutput::with_bids(task, bids).render(format)
        }
        TaskCommand::Bid {
            task_id,
            agent,
            amount,
            message,
            eta,
        } => {
            let request = NewBid::new(agent, amount)
                .with_message(message)
                .with_estimated_time(eta);
            let bid = engine.place_bid(&task_id, request)?;
            BidOutput { bid }.render(format)
        }
        TaskCommand::Accept {
            task_id,
            bid_id,
            poster,
        } => TaskOutput::new(engine.accept_bid(&task_id, &bid_id, &poster)?).render(format),
        TaskCommand::Claim { task_id, agent } => {
            TaskOutput::new(engine.accept_task(&task_id, &agent)?).render(format)
        }
        TaskCommand::Start { task_id, agent } => {
            TaskOutput::new(engine.start_task(&task_id, &agent)?).render(format)
        }
        TaskCommand::Submit {
            task_id,
            agent,
            result,
            result_file,
        } => {
            let result = match (result, result_file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)?,
                (None, None) => return Err(CliError::user("Provide --result or --result-file")),
            };
            TaskOutput::new(engine.submit_result(&task_id, &agent, &result)?).render(format)
        }
        TaskCommand::Reject {
            task_id,
            poster,
            reason,
        } => TaskOutput::new(engine.reject_result(&task_id, &poster, &reason)?).render(format),
        TaskCommand::Approve { task_id, poster } => {
            let task = engine.approve_task(&task_id, &poster).await?;
            let fee = task.platform_fee_micro.unwrap_or_default();
            let payout = format_stx(task.bounty_micro.saturating_sub(fee));
            let simulated = task
                .payment_tx_id
                .as_deref()
                .is_some_and(|tx| tx.starts_with("sim_"));
            ApproveOutput {
                task,
                payout,
                simulated,
            }
            .render(format)
        }
        TaskCommand::Close { task_id, poster } => {
            TaskOutput::new(engine.close_task(&task_id, &poster)?).render(format)
        }
        TaskCommand::Cancel { task_id, poster } => {
            TaskOutput::new(engine.cancel_task(&task_id, &poster)?).render(format)
        }
        TaskCommand::Review {
            task_id,
            agent,
            poster,
            rating,
            comment,
        } => {
            let review = engine.submit_review(&task_id, NewReview::new(agent, poster, rating, comment))?;
            ReviewOutput { review }.render(format)
        }
        TaskCommand::Message {
            task_id,
            sender,
            body,
        } => {
            let message = engine.post_message(&task_id, &sender, &body)?;
            match format {
                OutputFormat::Json => MessagesOutput {
                    task_id,
                    messages: vec![message],
                }
                .render(format),
                OutputFormat::Human => MessageOutput {
                    message: format!("Message {} posted to {}", message.id, task_id),
                }
                .render(format),
            }
        }
        TaskCommand::Messages { task_id } => {
            let messages = engine.list_messages(&task_id)?;
            MessagesOutput { task_id, messages }.render(format)
        }
    };

    Ok(output)
}

fn new_task(args: CreateTaskArgs) -> NewTask {
    let request = NewTask::new(args.title, args.description, args.bounty, args.poster)
        .with_category(args.category.into());
    match args.network {
        Some(network) => request.with_network(network.into()),
        None => request,
    }
}
