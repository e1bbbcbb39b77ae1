use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tajiri_core::TransactionKind;
use tajiri_functions::{
    CreateBudgetRequest, CreateGoalRequest, CreateTransactionRequest, DeleteTransactionRequest,
    JobConfig, create_budget, create_goal, create_transaction, delete_abandoned_goals,
    delete_transaction, get_advisory_message, handle_message, process_daily_goals,
    spending_summary, suggest_daily_limit,
};

mod config;
mod state;

#[derive(Parser, Debug)]
#[command(name = "tajiri", version, about = "Tajiri finance backend local runner")]
struct Cli {
    /// Data directory (default: ~/.tajiri)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Acting user id for handler commands
    #[arg(long, global = true, default_value = "local")]
    user: String,

    /// Override the reference instant (RFC3339), e.g. to replay a tick
    #[arg(long, global = true)]
    now: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the scheduled daily goal reconciliation once
    ProcessGoals {
        /// Override the configured goal concurrency
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Run the scheduled abandoned-goal cleanup once
    Cleanup,

    /// Send a free-text message through the assistant router
    Ask { message: Vec<String> },

    /// Ask the AI advisor directly
    Advice { message: Vec<String> },

    /// Spending summary for a timeframe phrase ("this week", "last month", ...)
    Summary { text: Vec<String> },

    /// Suggest a daily limit from the last 30 days of spending
    SuggestLimit,

    /// Record an expense
    AddExpense {
        amount: f64,
        category: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Create a savings goal
    NewGoal {
        name: String,
        target: f64,
        daily_limit: f64,
        /// IANA zone the goal's days are measured in
        #[arg(long)]
        timezone: Option<String>,
    },

    /// Create a monthly category budget
    NewBudget { category: String, amount: f64 },

    /// Delete the most recent transaction matching a description
    DeleteTransaction { text: Vec<String> },

    /// Write the default config.toml
    InitConfig,
}

fn init_tracing() {
    let log_format = std::env::var("TAJIRI_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }
}

fn joined(words: &[String]) -> Result<String> {
    let s = words.join(" ");
    if s.trim().is_empty() {
        bail!("a message is required");
    }
    Ok(s)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let data_dir = state::ensure_data_dir(cli.data.clone())?;
    let cfg = config::load_config(&data_dir)?;
    let llm = config::llm_client(&cfg)?;
    let now = match &cli.now {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("invalid --now '{raw}' (expected RFC3339)"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };
    let store = state::load_store(&data_dir)?;

    match cli.command {
        Command::ProcessGoals { concurrency } => {
            let job = JobConfig {
                concurrency: concurrency.unwrap_or(cfg.scheduler.concurrency),
                goal_timeout: std::time::Duration::from_secs(cfg.scheduler.goal_timeout_secs),
            };
            let report = process_daily_goals(&store, &job, now).await?;
            state::flush_store(&data_dir, &store).await?;
            println!(
                "Reconciled {} goals across {} users: {} success, {} failed, {} skipped, {} completed, {} errors",
                report.goals,
                report.users,
                report.success_days,
                report.failed_days,
                report.skipped_days,
                report.completed_goals,
                report.errors
            );
        }

        Command::Cleanup => {
            let report = delete_abandoned_goals(&store, cfg.scheduler.retention_days, now).await?;
            state::flush_store(&data_dir, &store).await?;
            println!(
                "Deleted {} abandoned goals across {} users ({} errors)",
                report.purged, report.users, report.errors
            );
        }

        Command::Ask { message } => {
            let message = joined(&message)?;
            let reply = handle_message(&store, llm.as_ref(), &cli.user, &message, now).await?;
            state::flush_store(&data_dir, &store).await?;
            println!("{reply}");
        }

        Command::Advice { message } => {
            let message = joined(&message)?;
            let reply = get_advisory_message(
                &store,
                llm.as_ref(),
                &cli.user,
                &message,
                now,
                cfg.advisor.max_context_transactions,
            )
            .await?;
            println!("{reply}");
        }

        Command::Summary { text } => {
            let text = text.join(" ");
            let s = spending_summary(&store, &cli.user, &text, now).await?;
            println!("{}", s.reply);
            for line in &s.by_category {
                println!("  {} {:.2}", line.category, line.amount);
            }
            for b in &s.budgets {
                println!(
                    "  budget {}: {:.2} of {:.2}",
                    b.category, b.spent, b.monthly_amount
                );
            }
        }

        Command::SuggestLimit => {
            let s = suggest_daily_limit(&store, &cli.user, now).await?;
            println!("{}", s.reply);
        }

        Command::AddExpense {
            amount,
            category,
            description,
        } => {
            let r = create_transaction(
                &store,
                &cli.user,
                CreateTransactionRequest {
                    kind: TransactionKind::Expense,
                    amount,
                    category,
                    description,
                    date: None,
                },
                now,
            )
            .await?;
            state::flush_store(&data_dir, &store).await?;
            println!("{} ({})", r.reply, r.id);
        }

        Command::NewGoal {
            name,
            target,
            daily_limit,
            timezone,
        } => {
            let r = create_goal(
                &store,
                &cli.user,
                CreateGoalRequest {
                    name,
                    target_amount: target,
                    daily_limit,
                    start_date: None,
                    timezone,
                },
                now,
            )
            .await?;
            state::flush_store(&data_dir, &store).await?;
            println!("{} ({})", r.reply, r.id);
        }

        Command::NewBudget { category, amount } => {
            let r = create_budget(
                &store,
                &cli.user,
                CreateBudgetRequest {
                    category,
                    monthly_amount: amount,
                },
                now,
            )
            .await?;
            state::flush_store(&data_dir, &store).await?;
            println!("{} ({})", r.reply, r.id);
        }

        Command::DeleteTransaction { text } => {
            let description = joined(&text)?;
            let r = delete_transaction(&store, &cli.user, DeleteTransactionRequest { description })
                .await?;
            state::flush_store(&data_dir, &store).await?;
            println!("{}", r.reply);
        }

        Command::InitConfig => {
            config::init_config(&data_dir)?;
        }
    }

    Ok(())
}
