//! Callable handlers for recording and deleting transactions. Thin
//! validation over the store; the caller is already authenticated.

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tajiri_core::{Transaction, TransactionKind};
use tajiri_store::TransactionStore;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(rename = "type", default)]
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Defaults to the request instant when absent.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionReply {
    pub id: String,
    pub reply: String,
}

pub async fn create_transaction<S: TransactionStore>(
    store: &S,
    user_id: &str,
    req: CreateTransactionRequest,
    now: DateTime<Utc>,
) -> Result<TransactionReply> {
    if req.amount <= 0.0 {
        bail!("amount must be positive");
    }
    let category = req.category.trim();
    if category.is_empty() {
        bail!("category is required");
    }

    let mut txn = Transaction::new(
        "",
        req.kind,
        req.amount,
        category,
        req.description.trim(),
        req.date.unwrap_or(now),
    );
    txn.created_at = now;

    let stored = store.add_transaction(user_id, txn).await?;
    let verb = match stored.kind {
        TransactionKind::Expense => "spent on",
        TransactionKind::Income => "received as",
    };
    Ok(TransactionReply {
        reply: format!("Recorded {:.2} {verb} {}.", stored.amount, stored.category),
        id: stored.id,
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteTransactionRequest {
    pub description: String,
}

pub async fn delete_transaction<S: TransactionStore>(
    store: &S,
    user_id: &str,
    req: DeleteTransactionRequest,
) -> Result<TransactionReply> {
    let needle = req.description.trim();
    if needle.is_empty() {
        bail!("a description to match is required");
    }

    match store.delete_by_description(user_id, needle).await? {
        Some(deleted) => Ok(TransactionReply {
            reply: format!("Deleted '{}' ({:.2}).", deleted.label(), deleted.amount),
            id: deleted.id,
        }),
        None => bail!("no transaction matching '{needle}' was found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tajiri_store::MemoryStore;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn create_then_delete_round_trip() {
        let store = MemoryStore::new();
        let created = create_transaction(
            &store,
            "asha",
            CreateTransactionRequest {
                kind: TransactionKind::Expense,
                amount: 5_000.0,
                category: "food".to_string(),
                description: "lunch at mama ntilie".to_string(),
                date: None,
            },
            now(),
        )
        .await
        .unwrap();
        assert_eq!(created.id, "txn-1");
        assert!(created.reply.contains("5000.00"));

        let deleted = delete_transaction(
            &store,
            "asha",
            DeleteTransactionRequest {
                description: "mama ntilie".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(deleted.id, "txn-1");
    }

    #[tokio::test]
    async fn rejects_bad_amounts_and_missing_matches() {
        let store = MemoryStore::new();
        let err = create_transaction(
            &store,
            "asha",
            CreateTransactionRequest {
                kind: TransactionKind::Expense,
                amount: 0.0,
                category: "food".to_string(),
                description: String::new(),
                date: None,
            },
            now(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("positive"));

        let err = delete_transaction(
            &store,
            "asha",
            DeleteTransactionRequest {
                description: "nothing here".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("no transaction matching"));
    }
}
