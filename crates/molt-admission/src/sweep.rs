//! Periodic removal of abandoned window keys.
//!
//! Bounds memory for callers that stop sending requests. Sweeping is
//! housekeeping: the limiter's correctness never depends on it, since every
//! check filters its own window.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::WindowCounterStore;

/// How often the sweeper runs.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Keys whose newest event is older than this are removed. Generous on
/// purpose: it must exceed every configured window.
pub const DEFAULT_SWEEP_HORIZON: Duration = Duration::from_secs(60 * 60);

/// Handle to the running sweep task. Aborting the handle (or calling
/// [`shutdown`](Self::shutdown)) stops the task; the store itself is
/// unaffected.
#[derive(Debug)]
pub struct Sweeper {
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawn a sweep task over `store`, running every `interval` and
    /// removing keys idle for longer than `horizon`.
    #[must_use]
    pub fn spawn(store: Arc<WindowCounterStore>, interval: Duration, horizon: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately; an initial sweep of a
            // fresh store is a no-op.
            loop {
                ticker.tick().await;
                let stats = store.sweep(horizon);
                if stats.removed > 0 {
                    debug!(
                        removed = stats.removed,
                        retained = stats.retained,
                        "window sweep"
                    );
                }
            }
        });
        Self { handle }
    }

    /// Stop the sweep task.
    pub fn shutdown(self) {
        self.handle.abort();
    }

    /// Whether the task has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
