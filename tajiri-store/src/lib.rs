//! tajiri-store: persistence seams for the Tajiri backend.
//!
//! The functions layer talks to these traits only; the concrete document
//! store behind them is deliberately out of scope. [`MemoryStore`] is the
//! in-process implementation used by tests and the CLI.

pub mod memory;
pub mod seed;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

use tajiri_core::{Budget, DailyLogEntry, Goal, GoalUpdate, Transaction};

pub use memory::{MemoryStore, Snapshot, UserRecord};
pub use seed::parse_seed;

/// Enumerates users for the scheduled jobs. One pass per run.
#[allow(async_fn_in_trait)]
pub trait UserDirectory {
    async fn list_users(&self) -> Result<Vec<String>>;
}

#[allow(async_fn_in_trait)]
pub trait TransactionStore {
    /// Sum of expense amounts dated within the inclusive window. Zero when
    /// there are none (or the user is unknown).
    async fn sum_expenses(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64>;

    /// Expense transactions within the inclusive window, newest first.
    async fn expenses_in(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>>;

    /// Persist a transaction. An empty id is assigned by the store; the
    /// stored record is returned.
    async fn add_transaction(&self, user_id: &str, txn: Transaction) -> Result<Transaction>;

    /// Delete the most recent transaction whose description or category
    /// contains `needle` (case-insensitive). Returns the deleted record.
    async fn delete_by_description(
        &self,
        user_id: &str,
        needle: &str,
    ) -> Result<Option<Transaction>>;
}

#[allow(async_fn_in_trait)]
pub trait GoalStore {
    async fn list_active_goals(&self, user_id: &str) -> Result<Vec<Goal>>;

    async fn list_goals(&self, user_id: &str) -> Result<Vec<Goal>>;

    /// Persist a goal. An empty id is assigned by the store.
    async fn add_goal(&self, user_id: &str, goal: Goal) -> Result<Goal>;

    /// Atomic partial update of one goal document.
    async fn update_goal(&self, user_id: &str, goal_id: &str, update: &GoalUpdate) -> Result<()>;

    /// Idempotent upsert of the ledger entry keyed by local date.
    async fn put_daily_log(
        &self,
        user_id: &str,
        goal_id: &str,
        date: NaiveDate,
        entry: &DailyLogEntry,
    ) -> Result<()>;

    async fn get_daily_log(
        &self,
        user_id: &str,
        goal_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyLogEntry>>;

    /// Delete abandoned goals whose `abandoned_at` is at or before `cutoff`,
    /// along with their ledgers. Returns how many were removed.
    async fn purge_abandoned(&self, user_id: &str, cutoff: DateTime<Utc>) -> Result<usize>;
}

#[allow(async_fn_in_trait)]
pub trait BudgetStore {
    async fn add_budget(&self, user_id: &str, budget: Budget) -> Result<Budget>;
    async fn list_budgets(&self, user_id: &str) -> Result<Vec<Budget>>;
}

/// Everything the functions layer needs, in one bound.
pub trait Backend: UserDirectory + TransactionStore + GoalStore + BudgetStore {}

impl<T: UserDirectory + TransactionStore + GoalStore + BudgetStore> Backend for T {}
