//! Keyed sliding-window timestamp store.
//!
//! Each key owns an ordered log of event timestamps. The store's one
//! primitive filters the log to the trailing window and lets the caller
//! decide - under the key's lock - whether to record the new event. Keys are
//! sharded, so checks against distinct keys do not contend.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Per-key timestamp history. Timestamps are appended in order, so expired
/// entries are always a prefix.
#[derive(Debug, Default)]
struct WindowEntry {
    timestamps: VecDeque<Instant>,
}

impl WindowEntry {
    /// Drop timestamps older than `now - window`.
    fn drain_expired(&mut self, now: Instant, window: Duration) {
        while let Some(front) = self.timestamps.front() {
            if now.duration_since(*front) > window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Snapshot returned by [`WindowCounterStore::record_and_count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSnapshot {
    /// Events in the window, counted before any append.
    pub count: u32,

    /// Oldest in-window event, if any (also pre-append).
    pub oldest: Option<Instant>,

    /// Whether the new event was recorded.
    pub recorded: bool,
}

/// Result of one sweep run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepStats {
    /// Keys examined.
    pub scanned: usize,
    /// Keys removed as abandoned.
    pub removed: usize,
    /// Keys retained.
    pub retained: usize,
}

/// Keyed store of sliding-window event logs.
///
/// Construct one per process and hand it to the controller; there is no
/// implicit global instance.
#[derive(Debug, Default)]
pub struct WindowCounterStore {
    entries: DashMap<String, WindowEntry>,
}

impl WindowCounterStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter the key's log to the trailing `window`, present the in-window
    /// count and oldest timestamp to `admit`, and append the current instant
    /// only if `admit` returns true.
    ///
    /// The closure runs while the key's shard lock is held, so the whole
    /// check-and-record step is a single linearizable operation: concurrent
    /// calls against the same key serialize, and none can observe a count
    /// that another call is about to invalidate. The count handed to the
    /// closure excludes the event being considered.
    pub fn record_and_count(
        &self,
        key: &str,
        window: Duration,
        admit: impl FnOnce(u32, Option<Instant>) -> bool,
    ) -> WindowSnapshot {
        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_owned()).or_default();
        entry.drain_expired(now, window);

        let count = u32::try_from(entry.timestamps.len()).unwrap_or(u32::MAX);
        let oldest = entry.timestamps.front().copied();

        let recorded = admit(count, oldest);
        if recorded {
            entry.timestamps.push_back(now);
        }

        WindowSnapshot {
            count,
            oldest,
            recorded,
        }
    }

    /// Number of tracked keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every key whose newest event is older than `horizon`.
    ///
    /// Housekeeping only: correctness never depends on sweeping, since
    /// checks filter their own windows. The removal predicate runs under
    /// each key's shard lock, so a key a concurrent check is extending is
    /// seen with its fresh timestamp and retained.
    pub fn sweep(&self, horizon: Duration) -> SweepStats {
        let now = Instant::now();
        let mut scanned = 0_usize;
        let mut removed = 0_usize;

        self.entries.retain(|_, entry| {
            scanned += 1;
            let live = entry
                .timestamps
                .back()
                .is_some_and(|newest| now.duration_since(*newest) < horizon);
            if !live {
                removed += 1;
            }
            live
        });

        SweepStats {
            scanned,
            removed,
            retained: scanned - removed,
        }
    }
}
