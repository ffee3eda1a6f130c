use std::time::Duration;

use async_trait::async_trait;

pub type JobResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// A background job executed on a fixed interval.
#[async_trait]
pub trait SchedulerJob: Send + Sync + 'static {
    /// Job name used in logs.
    fn name(&self) -> &'static str;

    /// How often the job runs.
    fn interval(&self) -> Duration;

    /// Execute one run of the job.
    async fn execute(&self) -> JobResult;
}
