//! Daily goal reconciliation: given what a user spent in their local day,
//! derive the day's outcome and the goal's next cumulative state.
//!
//! Pure: the reference instant, the day window and the spend total are all
//! injected, so every edge case is testable without touching a clock or a
//! store.

use chrono::{DateTime, Utc};

use crate::day_window::DayWindow;
use crate::goal::{DailyLogEntry, DailyStatus, DayOpening, Goal, GoalStatus, GoalUpdate};

/// Three-way outcome of one local day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DayOutcome {
    /// First day of the goal with no spend recorded: nothing to judge yet.
    Skipped,
    /// Spend stayed at or under the limit; the headroom is credited.
    Success { saved: f64 },
    /// Spend exceeded the limit.
    Failed { overspent: f64 },
}

impl DayOutcome {
    pub fn status(&self) -> DailyStatus {
        match self {
            DayOutcome::Skipped => DailyStatus::Skipped,
            DayOutcome::Success { .. } => DailyStatus::Success,
            DayOutcome::Failed { .. } => DailyStatus::Failed,
        }
    }
}

/// Everything the day produced: the ledger entry to upsert and the goal
/// update to persist, built as new values from the opening state.
#[derive(Debug, Clone, PartialEq)]
pub struct DayPlan {
    pub outcome: DayOutcome,
    pub entry: DailyLogEntry,
    pub update: GoalUpdate,
}

impl DayPlan {
    pub fn completed(&self) -> bool {
        self.update.status == GoalStatus::Completed
    }
}

/// Reconcile one goal against one local day.
///
/// `opening` is the counter state the day starts from: the goal's current
/// counters on a first run, or the opening recorded in the existing ledger
/// entry when the same date is being replayed. Replays therefore converge
/// on identical output instead of double-crediting.
pub fn plan_day(
    goal: &Goal,
    opening: DayOpening,
    spent_today: f64,
    window: &DayWindow,
    now: DateTime<Utc>,
) -> DayPlan {
    let is_first_day = goal.start_date == window.date;

    let outcome = if spent_today == 0.0 && is_first_day {
        // Creation day with no data yet: crediting the full limit here would
        // manufacture savings out of a partial day.
        DayOutcome::Skipped
    } else if spent_today <= goal.daily_limit {
        DayOutcome::Success {
            saved: goal.daily_limit - spent_today,
        }
    } else {
        DayOutcome::Failed {
            overspent: spent_today - goal.daily_limit,
        }
    };

    let (saved_today, streak_count, grace_days_used) = match outcome {
        DayOutcome::Skipped => (0.0, opening.streak_count, opening.grace_days_used),
        DayOutcome::Success { saved } => (saved, opening.streak_count + 1, opening.grace_days_used),
        DayOutcome::Failed { .. } => (0.0, 0, opening.grace_days_used + 1),
    };

    let saved_amount = opening.saved_amount + saved_today;
    let status = if saved_amount >= goal.target_amount {
        GoalStatus::Completed
    } else {
        GoalStatus::Active
    };

    let comment = match outcome {
        DayOutcome::Skipped => "Goal started today; nothing to reconcile yet.".to_string(),
        DayOutcome::Success { saved } => format!("Well done, {saved:.2} saved!"),
        DayOutcome::Failed { overspent } => format!("Overspent by {overspent:.2}."),
    };

    DayPlan {
        outcome,
        entry: DailyLogEntry {
            date: window.date,
            spent_amount: spent_today,
            saved_amount: saved_today,
            status: outcome.status(),
            comment,
            opening,
        },
        update: GoalUpdate {
            saved_amount,
            streak_count,
            grace_days_used,
            status,
            updated_at: now,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn window(date: NaiveDate) -> DayWindow {
        let start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
        DayWindow {
            date,
            start,
            end: start + chrono::Duration::days(1) - chrono::Duration::milliseconds(1),
        }
    }

    fn goal(start_date: NaiveDate, daily_limit: f64) -> Goal {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap();
        let mut g = Goal::new(
            "goal-1",
            "Emergency fund",
            100_000.0,
            daily_limit,
            start_date,
            None,
            created,
        );
        g.saved_amount = 20_000.0;
        g.streak_count = 3;
        g.grace_days_used = 1;
        g
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 21, 5, 0).unwrap()
    }

    #[test]
    fn first_day_without_spend_is_skipped() {
        // Scenario A: start_date == today, no spend.
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let g = goal(today, 15_000.0);
        let plan = plan_day(&g, g.counters(), 0.0, &window(today), now());

        assert_eq!(plan.outcome, DayOutcome::Skipped);
        assert_eq!(plan.entry.status, DailyStatus::Skipped);
        assert_eq!(plan.entry.saved_amount, 0.0);
        // Counters untouched.
        assert_eq!(plan.update.saved_amount, 20_000.0);
        assert_eq!(plan.update.streak_count, 3);
        assert_eq!(plan.update.grace_days_used, 1);
        assert_eq!(plan.update.status, GoalStatus::Active);
    }

    #[test]
    fn zero_spend_on_a_later_day_is_full_credit() {
        // Scenario B: started yesterday, spent nothing today.
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let g = goal(today - chrono::Duration::days(1), 15_000.0);
        let plan = plan_day(&g, g.counters(), 0.0, &window(today), now());

        assert_eq!(plan.outcome, DayOutcome::Success { saved: 15_000.0 });
        assert_eq!(plan.entry.saved_amount, 15_000.0);
        assert_eq!(plan.update.saved_amount, 35_000.0);
        assert_eq!(plan.update.streak_count, 4);
        assert_eq!(plan.update.grace_days_used, 1);
    }

    #[test]
    fn overspend_resets_streak_and_burns_a_grace_day() {
        // Scenario C: limit 10k, spent 12k.
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let g = goal(today - chrono::Duration::days(5), 10_000.0);
        let plan = plan_day(&g, g.counters(), 12_000.0, &window(today), now());

        assert_eq!(
            plan.outcome,
            DayOutcome::Failed {
                overspent: 2_000.0
            }
        );
        assert_eq!(plan.entry.saved_amount, 0.0);
        assert_eq!(plan.entry.spent_amount, 12_000.0);
        assert_eq!(plan.update.saved_amount, 20_000.0);
        assert_eq!(plan.update.streak_count, 0);
        assert_eq!(plan.update.grace_days_used, 2);
        assert!(plan.entry.comment.contains("2000.00"));
    }

    #[test]
    fn spending_exactly_the_limit_still_succeeds() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let g = goal(today - chrono::Duration::days(2), 10_000.0);
        let plan = plan_day(&g, g.counters(), 10_000.0, &window(today), now());

        assert_eq!(plan.outcome, DayOutcome::Success { saved: 0.0 });
        assert_eq!(plan.update.streak_count, 4);
        assert_eq!(plan.update.saved_amount, 20_000.0);
    }

    #[test]
    fn crossing_the_target_completes_the_goal() {
        // Scenario D: 95k saved, 100k target, full-credit day pushes past it.
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let mut g = goal(today - chrono::Duration::days(9), 10_000.0);
        g.saved_amount = 95_000.0;
        let plan = plan_day(&g, g.counters(), 0.0, &window(today), now());

        assert_eq!(plan.update.saved_amount, 105_000.0);
        assert_eq!(plan.update.status, GoalStatus::Completed);
        assert!(plan.completed());
    }

    #[test]
    fn spend_on_the_first_day_is_judged_normally() {
        // First-day exemption only covers the no-data case.
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let g = goal(today, 10_000.0);

        let ok = plan_day(&g, g.counters(), 4_000.0, &window(today), now());
        assert_eq!(ok.outcome, DayOutcome::Success { saved: 6_000.0 });

        let over = plan_day(&g, g.counters(), 11_000.0, &window(today), now());
        assert_eq!(
            over.outcome,
            DayOutcome::Failed {
                overspent: 1_000.0
            }
        );
    }

    #[test]
    fn replay_from_recorded_opening_is_idempotent() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let g = goal(today - chrono::Duration::days(1), 15_000.0);

        let first = plan_day(&g, g.counters(), 3_000.0, &window(today), now());
        // The scheduler fires again: the goal now carries the updated
        // counters, but the replay reconciles from the entry's opening.
        let updated = g.with_update(&first.update);
        let replay = plan_day(&updated, first.entry.opening, 3_000.0, &window(today), now());

        assert_eq!(replay.entry, first.entry);
        assert_eq!(replay.update, first.update);
    }

    #[test]
    fn replay_with_changed_spend_recomputes_from_the_same_base() {
        // A late transaction lands after the first run; the replay flips the
        // day from success to failed without compounding the earlier credit.
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let g = goal(today - chrono::Duration::days(1), 10_000.0);

        let first = plan_day(&g, g.counters(), 8_000.0, &window(today), now());
        assert_eq!(first.update.saved_amount, 22_000.0);

        let updated = g.with_update(&first.update);
        let replay = plan_day(&updated, first.entry.opening, 13_000.0, &window(today), now());

        assert_eq!(replay.entry.status, DailyStatus::Failed);
        assert_eq!(replay.update.saved_amount, 20_000.0);
        assert_eq!(replay.update.streak_count, 0);
        assert_eq!(replay.update.grace_days_used, 2);
    }
}
