use crate::config::ScheduleConfig;
use crate::service::pipeline::ApodPipeline;
use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use std::future::Future;
use tracing::{error, info};

/// First occurrence of `at` (UTC) strictly after `now`.
///
/// Missed occurrences are never returned, so a late or restarted scheduler
/// does not backfill.
pub fn next_run_after(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(at).and_utc();
    if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    }
}

/// Run the pipeline once a day until `shutdown` resolves.
///
/// A failed run is logged and the scheduler waits for the next occurrence.
pub async fn run_daily<F>(pipeline: &ApodPipeline, cfg: &ScheduleConfig, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    info!(run_at = %cfg.run_at, run_on_start = cfg.run_on_start, "daily scheduler started");

    let mut first = true;
    loop {
        if !(first && cfg.run_on_start) {
            let now = Utc::now();
            let next = next_run_after(now, cfg.run_at);
            let wait = (next - now).to_std().unwrap_or_default();
            info!(next_run = %next, "waiting for next scheduled run");
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = &mut shutdown => break,
            }
        }
        first = false;

        tokio::select! {
            _ = run_logged(pipeline) => {}
            _ = &mut shutdown => {
                info!("shutdown requested during run; aborting");
                break;
            }
        }
    }
    info!("daily scheduler stopped");
}

async fn run_logged(pipeline: &ApodPipeline) {
    if let Err(e) = pipeline.run_once().await {
        error!(stage = e.stage(), error = %e, "scheduled APOD run failed");
    }
}
