//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! ```text
//! Scheduler (daily, 03:00 UTC by default)
//!     │
//!     └─► run_cycle()
//!             └─► fetch directory → classify → upsert loans / financings
//! ```
//!
//! At most one cycle runs at a time. A trigger that fires while the previous
//! cycle is still running is skipped.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::rates::run_cycle;
use crate::kernel::JobDeps;

/// Start the daily ingestion task
pub async fn start_scheduler(deps: JobDeps, cron: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;
    let running = Arc::new(Mutex::new(()));

    let ingest_job = Job::new_async(cron, move |_uuid, _lock| {
        let deps = deps.clone();
        let running = running.clone();
        Box::pin(async move {
            let Ok(_guard) = running.try_lock() else {
                tracing::warn!("Previous rates cycle still running, skipping this trigger");
                return;
            };
            run_cycle(&deps).await;
        })
    })?;

    scheduler.add(ingest_job).await?;
    scheduler.start().await?;

    tracing::info!(cron, "Scheduled rates ingestion started");
    Ok(scheduler)
}
