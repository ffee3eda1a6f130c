use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::traits::{JobResult, SchedulerJob};
use crate::repositories::CacheRepository;

/// Cleanup interval (1 hour)
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Removes expired rows from the cache table.
///
/// Reads already treat expired entries as absent; this job only keeps the
/// table from growing without bound.
pub struct CacheCleanupJob {
    db: SqlitePool,
}

impl CacheCleanupJob {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SchedulerJob for CacheCleanupJob {
    fn name(&self) -> &'static str {
        "CacheCleanup"
    }

    fn interval(&self) -> Duration {
        CLEANUP_INTERVAL
    }

    async fn execute(&self) -> JobResult {
        let purged = CacheRepository::purge_expired(&self.db).await?;
        if purged > 0 {
            tracing::info!("Purged {} expired cache entries", purged);
        }
        Ok(())
    }
}
