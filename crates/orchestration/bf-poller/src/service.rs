//! Scheduled polling.

use bf_types::{Message, NodeStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::poller::BucketPoller;

/// Drives a [`BucketPoller`] on its configured schedule.
///
/// After the startup delay the poller runs once to seed its baseline, then
/// once per polling interval. A cycle that overruns the interval delays the
/// next tick instead of bunching polls up. Shutting down, or dropping the
/// service, cancels the pending delay and timer; a cycle already running is
/// allowed to finish when shutting down.
pub struct PollerService {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PollerService {
    /// Start polling in a background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(poller: Arc<BucketPoller>) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let delay = poller.config().startup_delay;
        let interval = poller.config().polling_interval;

        poller.reporter().status(NodeStatus::Initializing);
        info!(
            startup_delay_secs = delay.as_secs(),
            polling_interval_secs = interval.as_secs(),
            "Starting bucket poller"
        );

        let handle = tokio::spawn(async move {
            run_schedule(poller, delay, interval, token).await;
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the schedule and wait for the background task to end.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                debug!(error = %e, "Poller task ended abnormally");
            }
        }
    }
}

impl Drop for PollerService {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_schedule(
    poller: Arc<BucketPoller>,
    delay: Duration,
    interval: Duration,
    token: CancellationToken,
) {
    if !delay.is_zero() {
        tokio::select! {
            _ = token.cancelled() => {
                debug!("Poller cancelled during startup delay");
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }

    // The first tick completes immediately
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        // Failures are already reported by the poller
        if let Err(e) = poller.poll(&Message::new()).await {
            debug!(error = %e, "Scheduled poll failed");
        }
    }

    debug!("Poller schedule stopped");
}
