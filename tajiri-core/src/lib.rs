//! tajiri-core: domain types and pure logic for the Tajiri finance backend

pub mod budget;
pub mod day_window;
pub mod goal;
pub mod intent;
pub mod reconcile;
pub mod spending;
pub mod timeframe;
pub mod transaction;

pub use budget::Budget;
pub use day_window::{DEFAULT_TIMEZONE, DayWindow};
pub use goal::{DailyLogEntry, DailyStatus, DayOpening, Goal, GoalStatus, GoalUpdate};
pub use intent::{Classification, Intent, IntentConfidence, classify};
pub use reconcile::{DayOutcome, DayPlan, plan_day};
pub use spending::{LimitSuggestion, SpendingSummary, suggest_daily_limit, summarize};
pub use timeframe::{TimeFrame, TimeFrameKind};
pub use transaction::{Transaction, TransactionKind};
