//! The daily goal processing job.
//!
//! Once per scheduled tick, every active goal of every user is reconciled
//! against its own local day: today's spend is compared to the daily limit,
//! the streak/grace counters roll forward, and an immutable ledger entry is
//! written for the date. Goals are independent units, so the work fans out
//! through a bounded-concurrency queue and a failure on one goal never
//! aborts its siblings; only failing to enumerate users kills the run.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use tajiri_core::{DayOutcome, DayPlan, DayWindow, Goal, plan_day};
use tajiri_store::{GoalStore, TransactionStore, UserDirectory};

#[derive(Debug, Clone)]
pub struct JobConfig {
    /// How many goals reconcile at once.
    pub concurrency: usize,
    /// Budget for one goal's queries and writes; a stuck goal is dropped
    /// from the run, not waited on.
    pub goal_timeout: std::time::Duration,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            goal_timeout: std::time::Duration::from_secs(30),
        }
    }
}

/// What a run did, for logs and the operator. Nothing downstream consumes
/// this; the job is fire-and-forget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub users: usize,
    pub goals: usize,
    pub success_days: usize,
    pub failed_days: usize,
    pub skipped_days: usize,
    pub completed_goals: usize,
    pub errors: usize,
}

/// Run one tick at the injected reference instant.
pub async fn process_daily_goals<S>(store: &S, config: &JobConfig, now: DateTime<Utc>) -> Result<RunReport>
where
    S: UserDirectory + GoalStore + TransactionStore,
{
    info!("running daily goal processing");
    let users = store.list_users().await.context("enumerate users")?;

    let mut report = RunReport {
        users: users.len(),
        ..Default::default()
    };

    let mut work: Vec<(String, Goal)> = Vec::new();
    for user_id in users {
        match store.list_active_goals(&user_id).await {
            Ok(goals) => work.extend(goals.into_iter().map(|g| (user_id.clone(), g))),
            Err(e) => {
                warn!(user = %user_id, "listing active goals failed, skipping user: {e:#}");
                report.errors += 1;
            }
        }
    }
    report.goals = work.len();

    let outcomes = stream::iter(work.into_iter().map(|(user_id, goal)| {
        let goal_id = goal.id.clone();
        async move {
            match tokio::time::timeout(config.goal_timeout, reconcile_goal(store, &user_id, goal, now)).await {
                Ok(Ok(plan)) => Ok(plan),
                Ok(Err(e)) => Err((user_id, goal_id, e)),
                Err(_) => Err((
                    user_id,
                    goal_id,
                    anyhow::anyhow!("timed out after {:?}", config.goal_timeout),
                )),
            }
        }
    }))
    .buffer_unordered(config.concurrency.max(1))
    .collect::<Vec<_>>()
    .await;

    for outcome in outcomes {
        match outcome {
            Ok(plan) => {
                match plan.outcome {
                    DayOutcome::Success { .. } => report.success_days += 1,
                    DayOutcome::Failed { .. } => report.failed_days += 1,
                    DayOutcome::Skipped => report.skipped_days += 1,
                }
                if plan.completed() {
                    report.completed_goals += 1;
                }
            }
            Err((user_id, goal_id, e)) => {
                warn!(user = %user_id, goal = %goal_id, "goal skipped this run: {e:#}");
                report.errors += 1;
            }
        }
    }

    info!(
        "daily goal processing finished: {} goals across {} users ({} success, {} failed, {} skipped, {} completed, {} errors)",
        report.goals,
        report.users,
        report.success_days,
        report.failed_days,
        report.skipped_days,
        report.completed_goals,
        report.errors
    );
    Ok(report)
}

/// Reconcile a single goal for its local "today".
async fn reconcile_goal<S>(store: &S, user_id: &str, goal: Goal, now: DateTime<Utc>) -> Result<DayPlan>
where
    S: GoalStore + TransactionStore,
{
    goal.reconcilable()?;
    let window = DayWindow::resolve(goal.timezone.as_deref(), now)?;
    let spent_today = store
        .sum_expenses(user_id, window.start, window.end)
        .await
        .context("sum today's expenses")?;

    // A replay of the same local date reconciles from the opening counters
    // recorded in the existing entry, not from the already-updated goal.
    let opening = match store.get_daily_log(user_id, &goal.id, window.date).await? {
        Some(prior) => prior.opening,
        None => goal.counters(),
    };

    let plan = plan_day(&goal, opening, spent_today, &window, now);

    // Ledger first: if the goal update fails here, the recorded opening
    // still lets the next attempt recompute the same day.
    store
        .put_daily_log(user_id, &goal.id, window.date, &plan.entry)
        .await
        .context("write daily log")?;
    store
        .update_goal(user_id, &goal.id, &plan.update)
        .await
        .context("update goal")?;

    // Push delivery is out of scope; the message is the observable.
    info!(user = %user_id, goal = %goal.id, "{}", notification_message(&goal, &plan));
    Ok(plan)
}

pub(crate) fn notification_message(goal: &Goal, plan: &DayPlan) -> String {
    if plan.completed() {
        return format!(
            "Congrats! You've completed your goal '{}'. Your dedication paid off.",
            goal.name
        );
    }
    match plan.outcome {
        DayOutcome::Success { saved } => {
            let streak = plan.update.streak_count;
            if streak > 0 && streak % 7 == 0 {
                format!(
                    "Awesome consistency! You're on a {streak}-day saving streak for '{}'. Keep it up!",
                    goal.name
                )
            } else {
                format!(
                    "You saved {saved:.2} towards '{}' today. Streak: {streak} days.",
                    goal.name
                )
            }
        }
        DayOutcome::Failed { overspent } => format!(
            "You went {overspent:.2} over your daily limit for '{}'. Grace days used: {}. Let's get back on track tomorrow!",
            goal.name, plan.update.grace_days_used
        ),
        DayOutcome::Skipped => format!("Daily check-in recorded for '{}'.", goal.name),
    }
}
