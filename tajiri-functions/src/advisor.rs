//! The AI advisory handler: gather the user's recent spending and goal
//! progress into context blocks, hand them to the model, return its reply.

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};

use tajiri_core::{Goal, TimeFrame, Transaction};
use tajiri_store::{GoalStore, TransactionStore};

use crate::llm::LlmClient;

pub const ADVISOR_SYSTEM_PROMPT: &str = "You are a friendly and helpful AI financial advisor \
     named Tajiri for an expense tracker app. Your tone is encouraging and non-judgmental. \
     Provide a concise, helpful, and actionable response (max 3-4 sentences). Connect the \
     user's spending habits to their goal progress where relevant. If no data was found, say \
     so. If the question is not related to finance, politely decline to answer.";

/// How many transactions are worth showing the model.
pub const DEFAULT_MAX_CONTEXT: usize = 50;

pub async fn get_advisory_message<S: TransactionStore + GoalStore>(
    store: &S,
    llm: Option<&LlmClient>,
    user_id: &str,
    message: &str,
    now: DateTime<Utc>,
    max_context: usize,
) -> Result<String> {
    let Some(llm) = llm else {
        bail!("advisory messages require a configured LLM provider");
    };
    if message.trim().is_empty() {
        bail!("a message is required");
    }

    let frame = TimeFrame::from_text(message, now);
    let mut expenses = store.expenses_in(user_id, frame.start, frame.end).await?;
    expenses.truncate(max_context.max(1));
    let goals = store.list_goals(user_id).await?;

    let prompt = build_prompt(message, &frame, &expenses, &goals, now);
    llm.complete(ADVISOR_SYSTEM_PROMPT, &prompt).await
}

fn build_prompt(
    message: &str,
    frame: &TimeFrame,
    expenses: &[Transaction],
    goals: &[Goal],
    now: DateTime<Utc>,
) -> String {
    format!(
        "The current date is {}.\n\nUSER'S QUESTION: \"{}\"\n\n\
         1. SPENDING DATA {}:\n{}\n\n\
         2. SAVINGS GOALS:\n{}",
        now.format("%Y-%m-%d"),
        message.trim(),
        frame.label,
        expense_context(expenses),
        goals_context(goals),
    )
}

fn expense_context(expenses: &[Transaction]) -> String {
    if expenses.is_empty() {
        return "No expenses were found for this period.".to_string();
    }
    expenses
        .iter()
        .map(|e| {
            format!(
                "- {}: {:.2} on {}",
                e.label(),
                e.amount,
                e.date.format("%Y-%m-%d")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn goals_context(goals: &[Goal]) -> String {
    if goals.is_empty() {
        return "No active savings goals found.".to_string();
    }
    goals
        .iter()
        .map(|g| {
            format!(
                "- Goal: '{}', Progress: {:.2} / {:.2}",
                g.name, g.saved_amount, g.target_amount
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
