//! tajiri-functions: the Tajiri backend functions (callable handlers, the
//! assistant router, and the scheduled jobs) over the store seams.

pub mod advisor;
pub mod assistant;
pub mod cleanup;
pub mod daily_goals;
pub mod goals;
pub mod insights;
pub mod llm;
pub mod transactions;

pub use advisor::get_advisory_message;
pub use assistant::handle_message;
pub use cleanup::{CleanupReport, DEFAULT_RETENTION_DAYS, delete_abandoned_goals};
pub use daily_goals::{JobConfig, RunReport, process_daily_goals};
pub use goals::{CreateBudgetRequest, CreateGoalRequest, create_budget, create_goal};
pub use insights::{spending_summary, suggest_daily_limit};
pub use llm::{LlmClient, Provider};
pub use transactions::{
    CreateTransactionRequest, DeleteTransactionRequest, create_transaction, delete_transaction,
};
