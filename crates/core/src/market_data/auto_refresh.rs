use std::sync::Weak;
use std::time::Duration;

use log::debug;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::MarketDataService;

/// The running poll timer. Cancelled when dropped.
pub(crate) struct AutoRefresh {
    period: Duration,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl AutoRefresh {
    /// Spawn the timer on `runtime`. The first tick fires one `period` from now.
    pub(crate) fn spawn(runtime: &Handle, service: Weak<MarketDataService>, period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let task = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    () = task_cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let Some(service) = service.upgrade() else {
                    debug!("[AutoRefresh] service dropped, stopping timer");
                    break;
                };
                tokio::select! {
                    biased;
                    () = task_cancel.cancelled() => break,
                    () = service.refresh_tick() => {}
                }
            }
            debug!("[AutoRefresh] timer stopped");
        });

        Self {
            period,
            cancel,
            task,
        }
    }

    pub(crate) fn period(&self) -> Duration {
        self.period
    }

    pub(crate) fn is_active(&self) -> bool {
        !self.cancel.is_cancelled() && !self.task.is_finished()
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
