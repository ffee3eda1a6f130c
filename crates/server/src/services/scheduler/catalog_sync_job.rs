use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::traits::{JobResult, SchedulerJob};
use crate::services::SyncService;

/// Periodically refreshes the local movie mirror from the catalog origin.
pub struct CatalogSyncJob {
    sync: Arc<SyncService>,
    interval: Duration,
}

impl CatalogSyncJob {
    pub fn new(sync: Arc<SyncService>, interval: Duration) -> Self {
        Self { sync, interval }
    }
}

#[async_trait]
impl SchedulerJob for CatalogSyncJob {
    fn name(&self) -> &'static str {
        "CatalogSync"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn execute(&self) -> JobResult {
        let outcome = self.sync.sync(None).await;
        if outcome.aborted {
            return Err(format!(
                "sync aborted after {} pages ({} synced, {} failed)",
                outcome.pages, outcome.synced, outcome.failed
            )
            .into());
        }
        Ok(())
    }
}
