//! In-memory document store. Backs the tests and the local CLI, and is the
//! shape the JSON state file serializes from.

use std::collections::BTreeMap;

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use tajiri_core::{Budget, DailyLogEntry, Goal, GoalStatus, GoalUpdate, Transaction};

use crate::{BudgetStore, GoalStore, TransactionStore, UserDirectory};

/// Everything stored for one user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    /// goal id -> date -> ledger entry.
    #[serde(default)]
    pub daily_logs: BTreeMap<String, BTreeMap<NaiveDate, DailyLogEntry>>,
    /// Monotonic id counter; survives deletes so ids never repeat.
    #[serde(default)]
    pub next_id: u64,
}

/// Serializable view of the whole store, keyed by user id.
pub type Snapshot = BTreeMap<String, UserRecord>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            users: RwLock::new(snapshot),
        }
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.users.read().await.clone()
    }

    /// Create the user's record if it does not exist yet.
    pub async fn ensure_user(&self, user_id: &str) {
        self.users
            .write()
            .await
            .entry(user_id.to_string())
            .or_default();
    }

    fn assign_id(record: &mut UserRecord, prefix: &str) -> String {
        record.next_id += 1;
        format!("{prefix}-{}", record.next_id)
    }
}

impl UserDirectory for MemoryStore {
    async fn list_users(&self) -> Result<Vec<String>> {
        Ok(self.users.read().await.keys().cloned().collect())
    }
}

impl TransactionStore for MemoryStore {
    async fn sum_expenses(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64> {
        let users = self.users.read().await;
        let Some(record) = users.get(user_id) else {
            return Ok(0.0);
        };
        Ok(record
            .transactions
            .iter()
            .filter(|t| t.is_expense() && t.date >= start && t.date <= end)
            .map(|t| t.amount)
            .sum())
    }

    async fn expenses_in(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let users = self.users.read().await;
        let Some(record) = users.get(user_id) else {
            return Ok(Vec::new());
        };
        let mut out: Vec<Transaction> = record
            .transactions
            .iter()
            .filter(|t| t.is_expense() && t.date >= start && t.date <= end)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(out)
    }

    async fn add_transaction(&self, user_id: &str, mut txn: Transaction) -> Result<Transaction> {
        let mut users = self.users.write().await;
        let record = users.entry(user_id.to_string()).or_default();
        if txn.id.is_empty() {
            txn.id = Self::assign_id(record, "txn");
        }
        record.transactions.push(txn.clone());
        Ok(txn)
    }

    async fn delete_by_description(
        &self,
        user_id: &str,
        needle: &str,
    ) -> Result<Option<Transaction>> {
        let needle = needle.to_lowercase();
        let mut users = self.users.write().await;
        let Some(record) = users.get_mut(user_id) else {
            return Ok(None);
        };
        let found = record
            .transactions
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                t.description.to_lowercase().contains(&needle)
                    || t.category.to_lowercase().contains(&needle)
            })
            .max_by_key(|(_, t)| t.date)
            .map(|(idx, _)| idx);
        match found {
            Some(idx) => Ok(Some(record.transactions.remove(idx))),
            None => Ok(None),
        }
    }
}

impl GoalStore for MemoryStore {
    async fn list_active_goals(&self, user_id: &str) -> Result<Vec<Goal>> {
        let users = self.users.read().await;
        let Some(record) = users.get(user_id) else {
            return Ok(Vec::new());
        };
        Ok(record
            .goals
            .iter()
            .filter(|g| g.status == GoalStatus::Active)
            .cloned()
            .collect())
    }

    async fn list_goals(&self, user_id: &str) -> Result<Vec<Goal>> {
        let users = self.users.read().await;
        Ok(users.get(user_id).map(|r| r.goals.clone()).unwrap_or_default())
    }

    async fn add_goal(&self, user_id: &str, mut goal: Goal) -> Result<Goal> {
        let mut users = self.users.write().await;
        let record = users.entry(user_id.to_string()).or_default();
        if goal.id.is_empty() {
            goal.id = Self::assign_id(record, "goal");
        }
        record.goals.push(goal.clone());
        Ok(goal)
    }

    async fn update_goal(&self, user_id: &str, goal_id: &str, update: &GoalUpdate) -> Result<()> {
        let mut users = self.users.write().await;
        let Some(record) = users.get_mut(user_id) else {
            bail!("unknown user: {user_id}");
        };
        let Some(goal) = record.goals.iter_mut().find(|g| g.id == goal_id) else {
            bail!("unknown goal {goal_id} for user {user_id}");
        };
        goal.saved_amount = update.saved_amount;
        goal.streak_count = update.streak_count;
        goal.grace_days_used = update.grace_days_used;
        goal.status = update.status;
        goal.updated_at = update.updated_at;
        Ok(())
    }

    async fn put_daily_log(
        &self,
        user_id: &str,
        goal_id: &str,
        date: NaiveDate,
        entry: &DailyLogEntry,
    ) -> Result<()> {
        let mut users = self.users.write().await;
        let Some(record) = users.get_mut(user_id) else {
            bail!("unknown user: {user_id}");
        };
        record
            .daily_logs
            .entry(goal_id.to_string())
            .or_default()
            .insert(date, entry.clone());
        Ok(())
    }

    async fn get_daily_log(
        &self,
        user_id: &str,
        goal_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyLogEntry>> {
        let users = self.users.read().await;
        Ok(users
            .get(user_id)
            .and_then(|r| r.daily_logs.get(goal_id))
            .and_then(|logs| logs.get(&date))
            .cloned())
    }

    async fn purge_abandoned(&self, user_id: &str, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut users = self.users.write().await;
        let Some(record) = users.get_mut(user_id) else {
            return Ok(0);
        };
        let purgeable: Vec<String> = record
            .goals
            .iter()
            .filter(|g| {
                g.status == GoalStatus::Abandoned
                    && g.abandoned_at.is_some_and(|at| at <= cutoff)
            })
            .map(|g| g.id.clone())
            .collect();
        record.goals.retain(|g| !purgeable.contains(&g.id));
        for id in &purgeable {
            record.daily_logs.remove(id);
        }
        Ok(purgeable.len())
    }
}

impl BudgetStore for MemoryStore {
    async fn add_budget(&self, user_id: &str, mut budget: Budget) -> Result<Budget> {
        let mut users = self.users.write().await;
        let record = users.entry(user_id.to_string()).or_default();
        if budget.id.is_empty() {
            budget.id = Self::assign_id(record, "budget");
        }
        record.budgets.push(budget.clone());
        Ok(budget)
    }

    async fn list_budgets(&self, user_id: &str) -> Result<Vec<Budget>> {
        let users = self.users.read().await;
        Ok(users
            .get(user_id)
            .map(|r| r.budgets.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tajiri_core::{DailyStatus, DayOpening, TransactionKind};

    fn txn(id: &str, kind: TransactionKind, amount: f64, at: DateTime<Utc>) -> Transaction {
        Transaction::new(id, kind, amount, "food", format!("{id} purchase"), at)
    }

    #[tokio::test]
    async fn sum_expenses_is_inclusive_and_skips_income() {
        let store = MemoryStore::new();
        let start = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 10, 23, 59, 59).unwrap();

        store.add_transaction("asha", txn("a", TransactionKind::Expense, 100.0, start)).await.unwrap();
        store.add_transaction("asha", txn("b", TransactionKind::Expense, 50.0, end)).await.unwrap();
        store.add_transaction("asha", txn("c", TransactionKind::Income, 999.0, start)).await.unwrap();
        store
            .add_transaction("asha", txn("d", TransactionKind::Expense, 75.0, end + Duration::seconds(1)))
            .await
            .unwrap();

        let sum = store.sum_expenses("asha", start, end).await.unwrap();
        assert_eq!(sum, 150.0);
        assert_eq!(store.sum_expenses("nobody", start, end).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn delete_by_description_takes_the_most_recent_match() {
        let store = MemoryStore::new();
        let early = Utc.with_ymd_and_hms(2026, 3, 9, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap();

        store.add_transaction("asha", txn("old", TransactionKind::Expense, 10.0, early)).await.unwrap();
        store.add_transaction("asha", txn("new", TransactionKind::Expense, 20.0, late)).await.unwrap();

        let deleted = store
            .delete_by_description("asha", "purchase")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(deleted.id, "new");

        assert!(store.delete_by_description("asha", "no such thing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn daily_log_upsert_overwrites_the_same_date() {
        let store = MemoryStore::new();
        store.ensure_user("asha").await;
        let date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let entry = DailyLogEntry {
            date,
            spent_amount: 1_000.0,
            saved_amount: 9_000.0,
            status: DailyStatus::Success,
            comment: "first".to_string(),
            opening: DayOpening::default(),
        };

        store.put_daily_log("asha", "goal-1", date, &entry).await.unwrap();
        let mut second = entry.clone();
        second.comment = "second".to_string();
        store.put_daily_log("asha", "goal-1", date, &second).await.unwrap();

        let stored = store.get_daily_log("asha", "goal-1", date).await.unwrap().unwrap();
        assert_eq!(stored.comment, "second");
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot["asha"].daily_logs["goal-1"].len(), 1);
    }

    #[tokio::test]
    async fn purge_abandoned_respects_the_cutoff() {
        let store = MemoryStore::new();
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        let mut old = Goal::new("old", "Old", 1_000.0, 100.0, start, None, created);
        old.status = GoalStatus::Abandoned;
        old.abandoned_at = Some(Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap());

        let mut recent = Goal::new("recent", "Recent", 1_000.0, 100.0, start, None, created);
        recent.status = GoalStatus::Abandoned;
        recent.abandoned_at = Some(Utc.with_ymd_and_hms(2026, 3, 9, 0, 0, 0).unwrap());

        let active = Goal::new("live", "Live", 1_000.0, 100.0, start, None, created);

        store.add_goal("asha", old).await.unwrap();
        store.add_goal("asha", recent).await.unwrap();
        store.add_goal("asha", active).await.unwrap();

        let cutoff = Utc.with_ymd_and_hms(2026, 3, 7, 0, 0, 0).unwrap();
        let purged = store.purge_abandoned("asha", cutoff).await.unwrap();
        assert_eq!(purged, 1);

        let ids: Vec<String> = store
            .list_goals("asha")
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.id)
            .collect();
        assert_eq!(ids, vec!["recent".to_string(), "live".to_string()]);
    }

    #[tokio::test]
    async fn store_assigns_ids_that_never_repeat() {
        let store = MemoryStore::new();
        let at = Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap();
        let a = store
            .add_transaction("asha", txn("", TransactionKind::Expense, 10.0, at))
            .await
            .unwrap();
        store.delete_by_description("asha", "purchase").await.unwrap();
        let b = store
            .add_transaction("asha", txn("", TransactionKind::Expense, 10.0, at))
            .await
            .unwrap();
        assert_eq!(a.id, "txn-1");
        assert_eq!(b.id, "txn-2");
    }
}
