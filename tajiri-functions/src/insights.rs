//! Read-only insight handlers: the spending summary and the daily-limit
//! suggestion.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use tajiri_core::{TimeFrame, spending};
use tajiri_store::{BudgetStore, TransactionStore};

#[derive(Debug, Clone, Serialize)]
pub struct CategoryLine {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetLine {
    pub category: String,
    pub spent: f64,
    pub monthly_amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpendingSummaryReply {
    pub label: String,
    pub total: f64,
    pub count: usize,
    pub by_category: Vec<CategoryLine>,
    /// Only populated for month-shaped timeframes.
    pub budgets: Vec<BudgetLine>,
    pub reply: String,
}

/// Summarize spending for whatever timeframe the message mentions.
pub async fn spending_summary<S: TransactionStore + BudgetStore>(
    store: &S,
    user_id: &str,
    message: &str,
    now: DateTime<Utc>,
) -> Result<SpendingSummaryReply> {
    let frame = TimeFrame::from_text(message, now);
    let expenses = store.expenses_in(user_id, frame.start, frame.end).await?;
    let summary = spending::summarize(&expenses);

    let mut budgets = Vec::new();
    if frame.is_monthly() {
        for b in store.list_budgets(user_id).await? {
            let spent = summary
                .by_category
                .iter()
                .find(|(c, _)| *c == b.category)
                .map(|(_, amount)| *amount)
                .unwrap_or(0.0);
            budgets.push(BudgetLine {
                category: b.category,
                spent,
                monthly_amount: b.monthly_amount,
            });
        }
    }

    let reply = if summary.count == 0 {
        format!("No expenses were found {}.", frame.label)
    } else {
        let (top_category, top_amount) = &summary.by_category[0];
        format!(
            "You spent {:.2} {} across {} transactions. Top category: {} ({:.2}).",
            summary.total, frame.label, summary.count, top_category, top_amount
        )
    };

    Ok(SpendingSummaryReply {
        label: frame.label,
        total: summary.total,
        count: summary.count,
        by_category: summary
            .by_category
            .into_iter()
            .map(|(category, amount)| CategoryLine { category, amount })
            .collect(),
        budgets,
        reply,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct LimitSuggestionReply {
    pub suggested: f64,
    pub active_days: usize,
    pub reply: String,
}

/// Recommend a daily limit from the last 30 days of spending.
pub async fn suggest_daily_limit<S: TransactionStore>(
    store: &S,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<LimitSuggestionReply> {
    let start = now - Duration::days(spending::SUGGESTION_WINDOW_DAYS);
    let expenses = store.expenses_in(user_id, start, now).await?;
    let suggestion = spending::suggest_daily_limit(&expenses);
    Ok(LimitSuggestionReply {
        suggested: suggestion.suggested,
        active_days: suggestion.active_days,
        reply: suggestion.reply(),
    })
}
