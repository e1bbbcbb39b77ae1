//! The assistant router: turn a free-text message into a handler call.
//!
//! Heuristics first, model second. Most messages ("I spent 5000 on lunch")
//! classify deterministically; only ambiguous ones are worth an LLM round
//! trip, and a model failure falls back to the heuristic guess.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use tajiri_core::{Intent, IntentConfidence, classify};
use tajiri_store::Backend;

use crate::advisor::{DEFAULT_MAX_CONTEXT, get_advisory_message};
use crate::goals::{CreateBudgetRequest, CreateGoalRequest, create_budget, create_goal};
use crate::insights::{spending_summary, suggest_daily_limit};
use crate::llm::LlmClient;
use crate::transactions::{
    CreateTransactionRequest, DeleteTransactionRequest, create_transaction, delete_transaction,
};

const INTENT_SYSTEM_PROMPT: &str = "You classify messages sent to an expense tracker assistant. \
     Respond with a single JSON object and nothing else. The object has an \"action\" field and \
     the action's parameters. Actions: \
     add_transaction {type: \"expense\"|\"income\", amount, category, description}, \
     create_goal {name, target_amount, daily_limit}, \
     create_budget {category, monthly_amount}, \
     delete_transaction {description}, \
     spending_summary {}, suggest_limit {}, advice {}, unknown {}.";

const HELP_REPLY: &str = "I can record expenses (\"I spent 5000 on lunch\"), create goals and \
     budgets, delete transactions, summarize your spending, or suggest a daily limit.";

/// Route one user message and produce the reply text.
pub async fn handle_message<S: Backend>(
    store: &S,
    llm: Option<&LlmClient>,
    user_id: &str,
    message: &str,
    now: DateTime<Utc>,
) -> Result<String> {
    let heuristic = classify(message);
    debug!(user = %user_id, intent = ?heuristic.intent, confidence = ?heuristic.confidence, "classified message");

    let intent = match (heuristic.confidence, llm) {
        (IntentConfidence::High, _) | (_, None) => heuristic.intent,
        (_, Some(client)) => match classify_with_model(client, message).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!("model classification failed, using heuristic intent: {e:#}");
                heuristic.intent
            }
        },
    };

    dispatch(store, llm, user_id, message, intent, now).await
}

async fn classify_with_model(llm: &LlmClient, message: &str) -> Result<Intent> {
    let raw = llm.complete(INTENT_SYSTEM_PROMPT, message).await?;
    parse_intent_reply(&raw)
}

/// Models love to wrap JSON in code fences; strip them before parsing.
fn parse_intent_reply(raw: &str) -> Result<Intent> {
    let trimmed = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    serde_json::from_str(trimmed).context("parse intent reply")
}

async fn dispatch<S: Backend>(
    store: &S,
    llm: Option<&LlmClient>,
    user_id: &str,
    message: &str,
    intent: Intent,
    now: DateTime<Utc>,
) -> Result<String> {
    match intent {
        Intent::AddTransaction {
            kind,
            amount,
            category,
            description,
        } => create_transaction(
            store,
            user_id,
            CreateTransactionRequest {
                kind,
                amount,
                category,
                description,
                date: None,
            },
            now,
        )
        .await
        .map(|r| r.reply),

        Intent::CreateGoal {
            name,
            target_amount,
            daily_limit,
        } => create_goal(
            store,
            user_id,
            CreateGoalRequest {
                name,
                target_amount,
                daily_limit,
                start_date: None,
                timezone: None,
            },
            now,
        )
        .await
        .map(|r| r.reply),

        Intent::CreateBudget {
            category,
            monthly_amount,
        } => create_budget(
            store,
            user_id,
            CreateBudgetRequest {
                category,
                monthly_amount,
            },
            now,
        )
        .await
        .map(|r| r.reply),

        Intent::DeleteTransaction { description } => {
            delete_transaction(store, user_id, DeleteTransactionRequest { description })
                .await
                .map(|r| r.reply)
        }

        Intent::SpendingSummary => spending_summary(store, user_id, message, now)
            .await
            .map(|r| r.reply),

        Intent::SuggestLimit => suggest_daily_limit(store, user_id, now).await.map(|r| r.reply),

        Intent::Advice => {
            get_advisory_message(store, llm, user_id, message, now, DEFAULT_MAX_CONTEXT).await
        }

        Intent::Unknown => match llm {
            // Let the advisor take a swing at open-ended questions.
            Some(_) => {
                get_advisory_message(store, llm, user_id, message, now, DEFAULT_MAX_CONTEXT).await
            }
            None => Ok(HELP_REPLY.to_string()),
        },
    }
}
