mod cache_cleanup_job;
mod catalog_sync_job;
mod traits;

use std::sync::Arc;

pub use cache_cleanup_job::CacheCleanupJob;
pub use catalog_sync_job::CatalogSyncJob;
pub use traits::{JobResult, SchedulerJob};

/// Runs registered jobs on their configured intervals.
///
/// Each job gets its own timer task; a slow job delays only itself and missed
/// ticks are skipped rather than bursted.
#[derive(Default)]
pub struct SchedulerService {
    jobs: Vec<Arc<dyn SchedulerJob>>,
}

impl SchedulerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job.
    pub fn with_job(mut self, job: impl SchedulerJob) -> Self {
        self.jobs.push(Arc::new(job));
        self
    }

    /// Register an already shared job.
    pub fn with_arc_job(mut self, job: Arc<dyn SchedulerJob>) -> Self {
        self.jobs.push(job);
        self
    }

    /// Spawn the timer task for every registered job.
    pub fn start(&self) {
        for job in &self.jobs {
            let job = Arc::clone(job);
            tokio::spawn(async move {
                let mut timer = tokio::time::interval(job.interval());
                timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                // The first tick completes immediately; consume it so jobs
                // run one full interval after startup.
                timer.tick().await;

                loop {
                    timer.tick().await;
                    tracing::debug!("Running scheduled job '{}'", job.name());
                    if let Err(e) = job.execute().await {
                        tracing::error!("Job '{}' failed: {}", job.name(), e);
                    }
                }
            });
        }

        tracing::info!("Scheduler started with {} jobs", self.jobs.len());
    }
}
