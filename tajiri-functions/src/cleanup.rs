//! Scheduled sweep that deletes goals abandoned longer than the retention
//! window. A simple filtered delete with per-user error containment.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use tajiri_store::{GoalStore, UserDirectory};

pub const DEFAULT_RETENTION_DAYS: i64 = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub users: usize,
    pub purged: usize,
    pub errors: usize,
}

pub async fn delete_abandoned_goals<S>(
    store: &S,
    retention_days: i64,
    now: DateTime<Utc>,
) -> Result<CleanupReport>
where
    S: UserDirectory + GoalStore,
{
    info!("running abandoned goal cleanup");
    let cutoff = now - Duration::days(retention_days);
    let users = store.list_users().await.context("enumerate users")?;

    let mut report = CleanupReport {
        users: users.len(),
        ..Default::default()
    };
    for user_id in users {
        match store.purge_abandoned(&user_id, cutoff).await {
            Ok(0) => {}
            Ok(n) => {
                info!(user = %user_id, "deleted {n} abandoned goals");
                report.purged += n;
            }
            Err(e) => {
                warn!(user = %user_id, "cleanup failed, skipping user: {e:#}");
                report.errors += 1;
            }
        }
    }

    info!("abandoned goal cleanup finished: {} deleted", report.purged);
    Ok(report)
}
