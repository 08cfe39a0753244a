use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::services::scoring_service::ScoringDispatcher;

/// One scheduler tick. The `running` flag keeps runs from overlapping: when
/// the previous run is still in flight the tick is skipped, not queued.
pub async fn dispatch_tick(dispatcher: Arc<ScoringDispatcher>, running: Arc<AtomicBool>) {
    if running
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        warn!("Previous scoring run still in flight; skipping this tick");
        return;
    }

    if let Err(e) = dispatcher.run_once().await {
        error!("Scoring run failed: {}", e);
    }

    running.store(false, Ordering::SeqCst);
}

/// Cron-driven wrapper around [`ScoringDispatcher`]. Owns the schedule so
/// the binary can start it at boot and shut it down cleanly.
pub struct DispatchScheduler {
    scheduler: JobScheduler,
}

impl DispatchScheduler {
    /// Schedules `dispatcher.run_once()` on the given six-field cron
    /// expression (seconds first, e.g. `0 0 */2 * * *` for every two hours).
    pub async fn start(dispatcher: Arc<ScoringDispatcher>, cron: &str) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| Error::Scheduler(e.to_string()))?;

        let running = Arc::new(AtomicBool::new(false));
        let job = Job::new_async(cron, move |_uuid, _lock| {
            let dispatcher = dispatcher.clone();
            let running = running.clone();
            Box::pin(async move {
                dispatch_tick(dispatcher, running).await;
            })
        })
        .map_err(|e| Error::Scheduler(e.to_string()))?;

        scheduler
            .add(job)
            .await
            .map_err(|e| Error::Scheduler(e.to_string()))?;
        scheduler
            .start()
            .await
            .map_err(|e| Error::Scheduler(e.to_string()))?;

        info!("Scoring dispatch scheduled with cron {}", cron);
        Ok(Self { scheduler })
    }

    pub async fn stop(&mut self) -> Result<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| Error::Scheduler(e.to_string()))?;
        info!("Scoring dispatch scheduler stopped");
        Ok(())
    }
}
