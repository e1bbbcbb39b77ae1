//! Category budgets. Thin: created by a handler, read back by the
//! spending summary for utilization lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: String,
    pub category: String,
    pub monthly_amount: f64,
    pub created_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        monthly_amount: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            monthly_amount,
            created_at,
        }
    }
}
