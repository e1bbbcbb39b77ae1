//! Intent classification for the assistant's free-text messages.
//!
//! Deliberately non-LLM-first: cheap keyword heuristics handle the common
//! phrasings, and only ambiguous messages are worth a model call. The same
//! `Intent` shape doubles as the JSON contract the model is asked to emit.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::transaction::TransactionKind;

/// What the user wants done. Mirrors the callable surface one-to-one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Intent {
    AddTransaction {
        #[serde(rename = "type", default)]
        kind: TransactionKind,
        amount: f64,
        #[serde(default)]
        category: String,
        #[serde(default)]
        description: String,
    },
    CreateGoal {
        #[serde(default)]
        name: String,
        target_amount: f64,
        daily_limit: f64,
    },
    CreateBudget {
        #[serde(default)]
        category: String,
        monthly_amount: f64,
    },
    DeleteTransaction {
        #[serde(default)]
        description: String,
    },
    SpendingSummary,
    SuggestLimit,
    Advice,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentConfidence {
    /// Unambiguous phrasing; dispatch directly.
    High,
    /// Plausible but worth an LLM pass when one is available.
    Medium,
    /// Heuristics saw nothing usable.
    Low,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub intent: Intent,
    pub confidence: IntentConfidence,
}

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:tzs|usd|kes|\$)?\s*([0-9][0-9,]*(?:\.[0-9]+)?)\b")
            .expect("amount pattern is valid")
    })
}

/// Pull every numeric amount out of a message, largest first.
pub fn extract_amounts(text: &str) -> Vec<f64> {
    let mut out: Vec<f64> = amount_re()
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .filter_map(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .collect();
    out.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    out
}

/// The word following "on"/"for", used as a category guess.
fn category_after(words: &[&str]) -> Option<String> {
    words
        .iter()
        .position(|w| *w == "on" || *w == "for")
        .and_then(|i| words.get(i + 1))
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| !w.is_empty() && w.parse::<f64>().is_err())
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

/// Classify a message with deterministic heuristics only.
pub fn classify(message: &str) -> Classification {
    let lower = message.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    let amounts = extract_amounts(&lower);

    let hit = |intent, confidence| Classification { intent, confidence };

    if contains_any(&lower, &["delete", "remove"])
        && contains_any(&lower, &["transaction", "expense", "entry", "purchase"])
    {
        // Whatever trails the object word is the match fragment.
        let description = words
            .iter()
            .skip_while(|w| !matches!(**w, "transaction" | "expense" | "entry" | "purchase"))
            .skip(1)
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        return hit(Intent::DeleteTransaction { description }, IntentConfidence::High);
    }

    if contains_any(&lower, &["how much", "summary", "overview", "breakdown"]) {
        return hit(Intent::SpendingSummary, IntentConfidence::High);
    }

    if lower.contains("limit")
        && contains_any(&lower, &["suggest", "recommend", "what should", "help me set"])
    {
        return hit(Intent::SuggestLimit, IntentConfidence::High);
    }

    if contains_any(&lower, &["spent", "bought", "paid"]) {
        if let Some(amount) = amounts.first() {
            return hit(
                Intent::AddTransaction {
                    kind: TransactionKind::Expense,
                    amount: *amount,
                    category: category_after(&words).unwrap_or_else(|| "general".to_string()),
                    description: message.trim().to_string(),
                },
                IntentConfidence::High,
            );
        }
        // A spend verb without a number reads like a reporting question.
        return hit(Intent::SpendingSummary, IntentConfidence::Medium);
    }

    if contains_any(&lower, &["earned", "received", "salary", "income"]) {
        if let Some(amount) = amounts.first() {
            return hit(
                Intent::AddTransaction {
                    kind: TransactionKind::Income,
                    amount: *amount,
                    category: category_after(&words).unwrap_or_else(|| "income".to_string()),
                    description: message.trim().to_string(),
                },
                IntentConfidence::High,
            );
        }
    }

    if lower.contains("budget") {
        if let Some(amount) = amounts.first() {
            return hit(
                Intent::CreateBudget {
                    category: category_after(&words).unwrap_or_else(|| "general".to_string()),
                    monthly_amount: *amount,
                },
                IntentConfidence::High,
            );
        }
    }

    if lower.contains("goal") && amounts.len() >= 2 {
        // Largest number is the target, smallest the daily limit. Good
        // enough for "save 100000, limit 10000" phrasings; anything murkier
        // stays Medium so a model can override it.
        let name = category_after(&words)
            .map(|c| format!("{} goal", capitalize(&c)))
            .unwrap_or_else(|| "Savings goal".to_string());
        return hit(
            Intent::CreateGoal {
                name,
                target_amount: amounts[0],
                daily_limit: amounts[amounts.len() - 1],
            },
            IntentConfidence::Medium,
        );
    }

    if contains_any(&lower, &["advice", "advise", "should i", "help me save", "tip"]) {
        return hit(Intent::Advice, IntentConfidence::Medium);
    }

    hit(Intent::Unknown, IntentConfidence::Low)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_with_amount_and_category() {
        let c = classify("I spent 5000 on lunch today");
        assert_eq!(c.confidence, IntentConfidence::High);
        match c.intent {
            Intent::AddTransaction {
                kind,
                amount,
                category,
                ..
            } => {
                assert_eq!(kind, TransactionKind::Expense);
                assert_eq!(amount, 5_000.0);
                assert_eq!(category, "lunch");
            }
            other => panic!("unexpected intent: {other:?}"),
        }
    }

    #[test]
    fn test_income_message() {
        let c = classify("received TZS 250,000 salary");
        match c.intent {
            Intent::AddTransaction { kind, amount, .. } => {
                assert_eq!(kind, TransactionKind::Income);
                assert_eq!(amount, 250_000.0);
            }
            other => panic!("unexpected intent: {other:?}"),
        }
    }

    #[test]
    fn test_how_much_is_a_summary_question() {
        let c = classify("how much did I spend last week?");
        assert_eq!(c.intent, Intent::SpendingSummary);
        assert_eq!(c.confidence, IntentConfidence::High);
    }

    #[test]
    fn test_suggest_limit() {
        let c = classify("can you suggest a daily limit for me?");
        assert_eq!(c.intent, Intent::SuggestLimit);
    }

    #[test]
    fn test_delete_transaction_keeps_the_fragment() {
        let c = classify("please delete the transaction uber ride");
        assert_eq!(
            c.intent,
            Intent::DeleteTransaction {
                description: "uber ride".to_string()
            }
        );
    }

    #[test]
    fn test_goal_with_two_amounts() {
        let c = classify("new goal for vacation: save 300000 with a 10000 daily limit");
        match c.intent {
            Intent::CreateGoal {
                target_amount,
                daily_limit,
                name,
            } => {
                assert_eq!(target_amount, 300_000.0);
                assert_eq!(daily_limit, 10_000.0);
                assert_eq!(name, "Vacation goal");
            }
            other => panic!("unexpected intent: {other:?}"),
        }
        assert_eq!(c.confidence, IntentConfidence::Medium);
    }

    #[test]
    fn test_gibberish_is_unknown() {
        let c = classify("what's the weather like?");
        assert_eq!(c.intent, Intent::Unknown);
        assert_eq!(c.confidence, IntentConfidence::Low);
    }

    #[test]
    fn test_intent_parses_from_model_json() {
        let intent: Intent = serde_json::from_str(
            r#"{"action": "add_transaction", "type": "expense", "amount": 1200, "category": "transport"}"#,
        )
        .unwrap();
        assert_eq!(
            intent,
            Intent::AddTransaction {
                kind: TransactionKind::Expense,
                amount: 1_200.0,
                category: "transport".to_string(),
                description: String::new(),
            }
        );

        let intent: Intent = serde_json::from_str(r#"{"action": "suggest_limit"}"#).unwrap();
        assert_eq!(intent, Intent::SuggestLimit);
    }
}
