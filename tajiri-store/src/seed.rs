//! Seed-file parsing: a hand-editable JSON fixture normalized into store
//! records. Used to stock a local store for development and integration
//! tests without writing full document shapes by hand.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use tajiri_core::{Budget, Goal, Transaction, TransactionKind};

use crate::memory::{MemoryStore, Snapshot, UserRecord};

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    users: BTreeMap<String, SeedUser>,
}

#[derive(Debug, Default, Deserialize)]
struct SeedUser {
    #[serde(default)]
    transactions: Vec<SeedTransaction>,
    #[serde(default)]
    goals: Vec<SeedGoal>,
    #[serde(default)]
    budgets: Vec<SeedBudget>,
}

/// Transaction as written in a seed file: "YYYY-MM-DD HH:MM" dates, UTC.
#[derive(Debug, Deserialize)]
struct SeedTransaction {
    #[serde(rename = "type", default)]
    kind: TransactionKind,
    amount: f64,
    category: String,
    #[serde(default)]
    description: String,
    date: String,
}

#[derive(Debug, Deserialize)]
struct SeedGoal {
    name: String,
    target_amount: f64,
    daily_limit: f64,
    start_date: NaiveDate,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    saved_amount: f64,
    #[serde(default)]
    streak_count: u32,
    #[serde(default)]
    grace_days_used: u32,
}

#[derive(Debug, Deserialize)]
struct SeedBudget {
    category: String,
    monthly_amount: f64,
}

fn parse_seed_date(raw: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    let ndt = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .with_context(|| format!("invalid seed date '{raw}' (expected YYYY-MM-DD HH:MM)"))?;
    Ok(ndt.and_utc())
}

/// Parse a seed file into a store snapshot. Ids are assigned per user in
/// listed order, so seeds produce stable data across runs.
pub fn parse_seed(json: &str) -> Result<Snapshot> {
    let seed: SeedFile = serde_json::from_str(json).context("parse seed file")?;
    let mut snapshot = Snapshot::new();

    for (user_id, user) in seed.users {
        let mut record = UserRecord::default();

        for t in user.transactions {
            record.next_id += 1;
            let date = parse_seed_date(&t.date)
                .with_context(|| format!("user {user_id}"))?;
            record.transactions.push(Transaction::new(
                format!("txn-{}", record.next_id),
                t.kind,
                t.amount,
                t.category,
                t.description,
                date,
            ));
        }

        for g in user.goals {
            record.next_id += 1;
            let created = g.start_date.and_time(NaiveTime::MIN).and_utc();
            let mut goal = Goal::new(
                format!("goal-{}", record.next_id),
                g.name,
                g.target_amount,
                g.daily_limit,
                g.start_date,
                g.timezone,
                created,
            );
            goal.saved_amount = g.saved_amount;
            goal.streak_count = g.streak_count;
            goal.grace_days_used = g.grace_days_used;
            record.goals.push(goal);
        }

        for b in user.budgets {
            record.next_id += 1;
            // Seed budgets carry no timestamp; epoch keeps them deterministic.
            let created = chrono::DateTime::<chrono::Utc>::UNIX_EPOCH;
            record.budgets.push(Budget::new(
                format!("budget-{}", record.next_id),
                b.category,
                b.monthly_amount,
                created,
            ));
        }

        snapshot.insert(user_id, record);
    }

    Ok(snapshot)
}

impl MemoryStore {
    /// Convenience for tests and the CLI: parse a seed file straight into a
    /// working store.
    pub fn from_seed_json(json: &str) -> Result<MemoryStore> {
        Ok(MemoryStore::from_snapshot(parse_seed(json)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GoalStore, TransactionStore};
    use chrono::{TimeZone, Utc};

    const SEED: &str = r#"{
        "users": {
            "asha": {
                "transactions": [
                    {"type": "expense", "amount": 5000, "category": "food", "description": "lunch", "date": "2026-03-10 12:30"},
                    {"type": "income", "amount": 250000, "category": "salary", "date": "2026-03-01 09:00"}
                ],
                "goals": [
                    {"name": "Emergency fund", "target_amount": 100000, "daily_limit": 10000,
                     "start_date": "2026-03-01", "timezone": "Africa/Dar_es_Salaam", "saved_amount": 20000}
                ],
                "budgets": [
                    {"category": "food", "monthly_amount": 150000}
                ]
            }
        }
    }"#;

    #[tokio::test]
    async fn seed_round_trips_into_a_working_store() {
        let store = MemoryStore::from_seed_json(SEED).unwrap();

        let goals = store.list_active_goals("asha").await.unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].name, "Emergency fund");
        assert_eq!(goals[0].saved_amount, 20_000.0);
        assert_eq!(goals[0].timezone.as_deref(), Some("Africa/Dar_es_Salaam"));

        let start = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 10, 23, 59, 59).unwrap();
        // Income is not counted as spend.
        assert_eq!(store.sum_expenses("asha", start, end).await.unwrap(), 5_000.0);
    }

    #[test]
    fn bad_date_is_a_readable_error() {
        let err = parse_seed(r#"{"users": {"u": {"transactions": [
            {"amount": 1, "category": "x", "date": "10/03/2026"}
        ]}}}"#)
        .unwrap_err();
        assert!(format!("{err:#}").contains("invalid seed date"));
    }
}
