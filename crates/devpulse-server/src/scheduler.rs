//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring activity refresh job.

use std::sync::Arc;

use chrono::Utc;
use devpulse_core::resolve_range;
use devpulse_sources::{GithubClient, LeetCodeClient};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::ingest;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    github: Arc<GithubClient>,
    leetcode: Arc<LeetCodeClient>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_refresh_job(&scheduler, pool, github, leetcode).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the nightly activity refresh.
///
/// Runs daily at 03:00 UTC (`0 0 3 * * *`) and re-ingests the trailing
/// 90-day window, which also backfills any days a failed upstream left at
/// zero on a previous run. Errors are logged and the job waits for its next
/// tick; it never takes the process down.
async fn register_refresh_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    github: Arc<GithubClient>,
    leetcode: Arc<LeetCodeClient>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async("0 0 3 * * *", move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let github = Arc::clone(&github);
        let leetcode = Arc::clone(&leetcode);

        Box::pin(async move {
            let range = resolve_range("90d", Utc::now().date_naive());
            tracing::info!(start = %range.start, end = %range.end, "scheduler: starting nightly activity refresh");

            match ingest::refresh_range(&pool, &github, &leetcode, range.start, range.end).await {
                Ok(days) => {
                    tracing::info!(days, "scheduler: nightly activity refresh complete");
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: nightly activity refresh failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
