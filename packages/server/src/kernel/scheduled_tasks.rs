//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! ```text
//! Scheduler (every minute by default)
//!     │
//!     └─► NotificationSweep::tick(Utc::now())
//!             └─► for each step in its alert window → notify every member once
//! ```
//!
//! Hub housekeeping runs hourly and drops topics whose SSE clients went away.

use anyhow::{Context, Result};
use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::notifications::NotificationSweep;
use crate::kernel::StreamHub;

/// Start all scheduled tasks
pub async fn start_scheduler(
    sweep: NotificationSweep,
    hub: StreamHub,
    sweep_cron: &str,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let sweep_job = Job::new_async(sweep_cron, move |_uuid, _lock| {
        let sweep = sweep.clone();
        Box::pin(async move {
            sweep.tick(Utc::now()).await;
        })
    })
    .with_context(|| format!("invalid notification sweep schedule '{}'", sweep_cron))?;

    scheduler.add(sweep_job).await?;

    let cleanup_job = Job::new_async("0 0 * * * *", move |_uuid, _lock| {
        let hub = hub.clone();
        Box::pin(async move {
            hub.cleanup().await;
        })
    })?;

    scheduler.add(cleanup_job).await?;
    scheduler.start().await?;

    tracing::info!(schedule = %sweep_cron, "Scheduled tasks started (notification sweep, hourly stream cleanup)");
    Ok(scheduler)
}
