//! Spending aggregation and the daily-limit suggestion.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::transaction::Transaction;

/// Window over the user's spending history the suggestion averages across.
pub const SUGGESTION_WINDOW_DAYS: i64 = 30;

/// Totals for a set of expense transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingSummary {
    pub total: f64,
    pub count: usize,
    /// (category, total), largest first.
    pub by_category: Vec<(String, f64)>,
}

pub fn summarize(expenses: &[Transaction]) -> SpendingSummary {
    let mut groups: HashMap<&str, f64> = HashMap::new();
    let mut total = 0.0;
    for t in expenses {
        total += t.amount;
        *groups.entry(t.category.as_str()).or_default() += t.amount;
    }

    let mut by_category: Vec<(String, f64)> = groups
        .into_iter()
        .map(|(c, amount)| (c.to_string(), amount))
        .collect();
    // Largest first; name breaks ties so output is stable.
    by_category.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then_with(|| a.0.cmp(&b.0)));

    SpendingSummary {
        total,
        count: expenses.len(),
        by_category,
    }
}

/// A daily-limit recommendation derived from recent spending.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitSuggestion {
    pub suggested: f64,
    pub total_spent: f64,
    /// Distinct days that had at least one expense.
    pub active_days: usize,
}

/// Average daily spend over the distinct days that saw spending. With no
/// history the denominator defaults to the full window so the result is 0
/// rather than a division error.
pub fn suggest_daily_limit(expenses: &[Transaction]) -> LimitSuggestion {
    let mut days: Vec<NaiveDate> = expenses.iter().map(|t| t.date.date_naive()).collect();
    days.sort();
    days.dedup();

    let total_spent: f64 = expenses.iter().map(|t| t.amount).sum();
    let active_days = days.len();
    let denominator = if active_days > 0 {
        active_days as f64
    } else {
        SUGGESTION_WINDOW_DAYS as f64
    };

    LimitSuggestion {
        suggested: total_spent / denominator,
        total_spent,
        active_days,
    }
}

impl LimitSuggestion {
    /// Reply text for the assistant surface.
    pub fn reply(&self) -> String {
        if self.total_spent == 0.0 {
            return "Based on your spending history, I recommend setting a realistic daily \
                    spending limit. You haven't recorded any expenses in the last 30 days, so \
                    start by tracking your usual spending to get a clearer picture."
                .to_string();
        }
        format!(
            "Based on your average daily spending of TZS {:.2} over the last 30 days, a \
             reasonable daily spending limit for your goal could be TZS {:.2}. Remember, \
             setting a slightly lower limit can help you reach your goals faster!",
            self.suggested, self.suggested
        )
    }
}
