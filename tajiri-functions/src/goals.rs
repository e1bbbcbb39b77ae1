//! Callable handlers for creating goals and budgets.

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use tajiri_core::{Budget, DayWindow, Goal};
use tajiri_store::{BudgetStore, GoalStore};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGoalRequest {
    pub name: String,
    pub target_amount: f64,
    pub daily_limit: f64,
    /// Defaults to "today" in the goal's zone.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalReply {
    pub id: String,
    pub reply: String,
}

pub async fn create_goal<S: GoalStore>(
    store: &S,
    user_id: &str,
    req: CreateGoalRequest,
    now: DateTime<Utc>,
) -> Result<GoalReply> {
    let name = req.name.trim();
    if name.is_empty() {
        bail!("goal name is required");
    }
    if req.target_amount <= 0.0 {
        bail!("target amount must be positive");
    }
    if req.daily_limit <= 0.0 {
        bail!("daily limit must be positive");
    }

    // Also validates the zone name before it is persisted.
    let window = DayWindow::resolve(req.timezone.as_deref(), now)?;
    let start_date = req.start_date.unwrap_or(window.date);

    let goal = Goal::new(
        "",
        name,
        req.target_amount,
        req.daily_limit,
        start_date,
        req.timezone,
        now,
    );
    let stored = store.add_goal(user_id, goal).await?;

    Ok(GoalReply {
        reply: format!(
            "Goal '{}' created: save {:.2} by keeping daily spending under {:.2}.",
            stored.name, stored.target_amount, stored.daily_limit
        ),
        id: stored.id,
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBudgetRequest {
    pub category: String,
    pub monthly_amount: f64,
}

pub async fn create_budget<S: BudgetStore>(
    store: &S,
    user_id: &str,
    req: CreateBudgetRequest,
    now: DateTime<Utc>,
) -> Result<GoalReply> {
    let category = req.category.trim().to_lowercase();
    if category.is_empty() {
        bail!("budget category is required");
    }
    if req.monthly_amount <= 0.0 {
        bail!("budget amount must be positive");
    }

    let stored = store
        .add_budget(user_id, Budget::new("", category, req.monthly_amount, now))
        .await?;
    Ok(GoalReply {
        reply: format!(
            "Budget set: {:.2} per month for {}.",
            stored.monthly_amount, stored.category
        ),
        id: stored.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tajiri_core::GoalStatus;
    use tajiri_store::MemoryStore;

    fn now() -> DateTime<Utc> {
        // 23:30 in Dar es Salaam.
        Utc.with_ymd_and_hms(2026, 3, 10, 20, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn new_goal_starts_today_in_its_own_zone() {
        let store = MemoryStore::new();
        create_goal(
            &store,
            "asha",
            CreateGoalRequest {
                name: "Emergency fund".to_string(),
                target_amount: 100_000.0,
                daily_limit: 10_000.0,
                start_date: None,
                timezone: Some("Africa/Dar_es_Salaam".to_string()),
            },
            now(),
        )
        .await
        .unwrap();

        let goals = store.list_active_goals("asha").await.unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].status, GoalStatus::Active);
        assert_eq!(
            goals[0].start_date,
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
        );
        assert_eq!(goals[0].saved_amount, 0.0);
    }

    #[tokio::test]
    async fn invalid_zone_and_amounts_are_rejected() {
        let store = MemoryStore::new();
        let base = CreateGoalRequest {
            name: "Trip".to_string(),
            target_amount: 50_000.0,
            daily_limit: 5_000.0,
            start_date: None,
            timezone: Some("Nowhere/At_All".to_string()),
        };
        assert!(create_goal(&store, "asha", base.clone(), now()).await.is_err());

        let mut bad_limit = base.clone();
        bad_limit.timezone = None;
        bad_limit.daily_limit = -1.0;
        assert!(create_goal(&store, "asha", bad_limit, now()).await.is_err());

        let err = create_budget(
            &store,
            "asha",
            CreateBudgetRequest {
                category: "  ".to_string(),
                monthly_amount: 100.0,
            },
            now(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("category"));
    }
}
