//! Savings goal documents and their per-day ledger records.

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a goal. `Completed` and `Abandoned` are terminal;
/// the daily job only ever moves a goal from `Active` to `Completed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GoalStatus {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "abandoned")]
    Abandoned,
}

/// A savings goal tracked via a daily spending limit.
///
/// Field names follow the stored document shape (`goal_name`, `goal_status`).
/// Numeric fields default to zero on deserialization so that malformed
/// documents surface as validation errors instead of parse failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: String,
    #[serde(rename = "goal_name")]
    pub name: String,
    #[serde(default)]
    pub target_amount: f64,
    #[serde(default)]
    pub saved_amount: f64,
    #[serde(default)]
    pub daily_limit: f64,
    pub start_date: NaiveDate,
    /// IANA zone name. Absent means the default zone applies.
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(rename = "goal_status")]
    pub status: GoalStatus,
    #[serde(default)]
    pub streak_count: u32,
    #[serde(default)]
    pub grace_days_used: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub abandoned_at: Option<DateTime<Utc>>,
}

impl Goal {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        target_amount: f64,
        daily_limit: f64,
        start_date: NaiveDate,
        timezone: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            target_amount,
            saved_amount: 0.0,
            daily_limit,
            start_date,
            timezone,
            status: GoalStatus::Active,
            streak_count: 0,
            grace_days_used: 0,
            created_at,
            updated_at: created_at,
            abandoned_at: None,
        }
    }

    /// Reject records the daily job cannot reconcile. A zero or negative
    /// limit/target usually means the document was written without the field.
    pub fn reconcilable(&self) -> Result<()> {
        if self.daily_limit <= 0.0 {
            bail!("goal {} has no usable daily_limit", self.id);
        }
        if self.target_amount <= 0.0 {
            bail!("goal {} has no usable target_amount", self.id);
        }
        Ok(())
    }

    /// The cumulative counters as they stand right now.
    pub fn counters(&self) -> DayOpening {
        DayOpening {
            saved_amount: self.saved_amount,
            streak_count: self.streak_count,
            grace_days_used: self.grace_days_used,
        }
    }
}

/// Snapshot of the counters a reconciled day started from.
///
/// Recorded in every ledger entry so a replay of the same date recomputes
/// from the same base instead of re-applying the day on top of itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct DayOpening {
    pub saved_amount: f64,
    pub streak_count: u32,
    pub grace_days_used: u32,
}

/// Outcome of one reconciled day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DailyStatus {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "skipped")]
    Skipped,
}

/// Immutable per-day ledger record, keyed by (goal, local calendar date).
/// Re-running the job for the same date overwrites it deterministically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyLogEntry {
    pub date: NaiveDate,
    pub spent_amount: f64,
    pub saved_amount: f64,
    pub status: DailyStatus,
    pub comment: String,
    pub opening: DayOpening,
}

/// Atomic partial update persisted to the goal document after a day closes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalUpdate {
    pub saved_amount: f64,
    pub streak_count: u32,
    pub grace_days_used: u32,
    #[serde(rename = "goal_status")]
    pub status: GoalStatus,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Apply a reconciliation update, producing the goal as the store would
    /// return it on the next read.
    pub fn with_update(&self, update: &GoalUpdate) -> Goal {
        Goal {
            saved_amount: update.saved_amount,
            streak_count: update.streak_count,
            grace_days_used: update.grace_days_used,
            status: update.status,
            updated_at: update.updated_at,
            ..self.clone()
        }
    }
}
