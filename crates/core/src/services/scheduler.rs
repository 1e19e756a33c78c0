use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::errors::CoreError;
use crate::models::event::SessionEvent;
use crate::services::price_service::PriceSynchronizer;

/// Periodic price refresh.
///
/// Refreshes once immediately, then every `period`. There is no retry or
/// backoff: a failed refresh is logged and published, and the next tick
/// tries again.
pub struct RefreshScheduler;

impl RefreshScheduler {
    /// Spawn the refresh loop on the current tokio runtime.
    pub fn start(
        synchronizer: Arc<PriceSynchronizer>,
        period: Duration,
        events: broadcast::Sender<SessionEvent>,
    ) -> Result<RefreshHandle, CoreError> {
        if period.is_zero() {
            return Err(CoreError::InvalidConfig(
                "refresh period must be greater than zero".into(),
            ));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CoreError::Scheduler(format!("no tokio runtime available: {e}")))?;

        tracing::info!(period_secs = period.as_secs_f64(), "starting price refresh loop");
        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let event = match synchronizer.refresh_all().await {
                    Ok(report) => SessionEvent::PricesRefreshed(report),
                    Err(e) => SessionEvent::RefreshFailed {
                        message: e.to_string(),
                    },
                };
                // No subscribers is fine.
                let _ = events.send(event);
            }
        });

        Ok(RefreshHandle { task: Some(task) })
    }
}

/// Owner of a running refresh loop. Dropping it stops the loop.
#[must_use = "dropping the handle stops the refresh loop"]
pub struct RefreshHandle {
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cancel the loop. An in-flight refresh is abandoned without touching prices.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!("price refresh loop stopped");
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for RefreshHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshHandle")
            .field("running", &self.is_running())
            .finish()
    }
}
