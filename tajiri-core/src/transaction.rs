//! Transaction record types for the expense tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether money left or entered the account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    #[serde(rename = "expense")]
    Expense,
    #[serde(rename = "income")]
    Income,
}

impl Default for TransactionKind {
    fn default() -> Self {
        TransactionKind::Expense
    }
}

/// A single recorded transaction, scoped to one user by storage.
///
/// Amounts are positive magnitudes; the direction lives in `kind`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        kind: TransactionKind,
        amount: f64,
        category: impl Into<String>,
        description: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            amount,
            category: category.into(),
            description: description.into(),
            date,
            created_at: date,
        }
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Label shown in advisory context blocks: description, or category when blank.
    pub fn label(&self) -> &str {
        if self.description.is_empty() {
            &self.category
        } else {
            &self.description
        }
    }
}
