//! Periodic background refresh.
//!
//! The first tick fires immediately, giving the initial load. Each tick
//! re-attempts map initialization if the map is not ready yet, then runs a
//! refresh through the same entry point user actions use. The loop holds
//! only a weak reference, so it ends once the synchronizer is dropped.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::map::MapState;
use crate::synchronizer::{RefreshTrigger, ViewSynchronizer};

/// Shortest period the loop accepts.
pub const MIN_REFRESH_PERIOD: Duration = Duration::from_secs(1);

/// Handle to a running refresh loop. Dropping it stops the loop.
#[derive(Debug)]
pub struct RefreshLoop {
    handle: JoinHandle<()>,
}

impl RefreshLoop {
    /// Starts the loop with the synchronizer's configured period.
    #[must_use]
    pub fn spawn(sync: &Arc<ViewSynchronizer>) -> Self {
        Self::spawn_with_period(sync, sync.config().refresh_period)
    }

    /// Starts the loop with an explicit period, clamped to
    /// [`MIN_REFRESH_PERIOD`].
    #[must_use]
    pub fn spawn_with_period(sync: &Arc<ViewSynchronizer>, period: Duration) -> Self {
        let period = period.max(MIN_REFRESH_PERIOD);
        let weak = Arc::downgrade(sync);
        log::info!("Refreshing every {}s", period.as_secs());

        let handle = tokio::spawn(run(weak, period));
        Self { handle }
    }

    /// Whether the loop has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stops the loop. A cycle in flight is abandoned at its next
    /// suspension point.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for RefreshLoop {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run(weak: Weak<ViewSynchronizer>, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(sync) = weak.upgrade() else {
            log::debug!("Synchronizer dropped, stopping refresh loop");
            break;
        };

        if matches!(sync.map_state(), MapState::Uninitialized | MapState::Error)
            && let Err(e) = sync.initialize_map().await
        {
            log::warn!("Map still unavailable: {e}");
        }

        match sync.refresh(RefreshTrigger::Periodic).await {
            Ok(summary) => log::debug!("Periodic refresh #{} done", summary.cycle),
            Err(e) => log::warn!("Periodic refresh failed: {e}"),
        }
    }
}
