//! Per-(caller, action-class) admission decisions.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use molt_core::{
    ActionClass, AdmissionConfig, AdmissionDecision, CallerIdentity, MoltError, MoltResult,
};

use crate::{Sweeper, WindowCounterStore, DEFAULT_SWEEP_HORIZON, DEFAULT_SWEEP_INTERVAL};

/// Sliding-window admission controller.
///
/// Each action class has an independent quota; a caller exhausting one class
/// is still subject to every other. Denied checks consume no quota, so a
/// blocked client that retries does not fall further behind.
pub struct AdmissionController {
    store: Arc<WindowCounterStore>,
    config: AdmissionConfig,
}

impl AdmissionController {
    /// Create a controller with its own window store.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: AdmissionConfig) -> MoltResult<Self> {
        Self::with_store(Arc::new(WindowCounterStore::new()), config)
    }

    /// Create a controller over an explicitly constructed store.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn with_store(store: Arc<WindowCounterStore>, config: AdmissionConfig) -> MoltResult<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// The underlying window store.
    #[must_use]
    pub const fn store(&self) -> &Arc<WindowCounterStore> {
        &self.store
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    /// Quota bucket key for a caller and action class.
    fn bucket_key(caller: &CallerIdentity, class: ActionClass) -> String {
        format!("{}:{}", class.as_str(), caller.bucket())
    }

    /// Check whether `caller` may perform `class` now, recording the event
    /// if admitted.
    ///
    /// The decision carries the full quota metadata regardless of outcome;
    /// the caller layer renders it onto the response.
    pub fn check(&self, caller: &CallerIdentity, class: ActionClass) -> AdmissionDecision {
        let quota = self.config.quota(class);
        let key = Self::bucket_key(caller, class);

        let snapshot = self
            .store
            .record_and_count(&key, quota.window, |count, _| count < quota.max);

        let allowed = snapshot.recorded;
        let remaining = quota
            .max
            .saturating_sub(snapshot.count + u32::from(allowed));

        // Until the oldest counted event exits the window; a full window
        // when nothing was in-window before this check.
        let reset_after = snapshot.oldest.map_or(quota.window, |oldest| {
            quota.window.saturating_sub(oldest.elapsed())
        });
        let retry_after_secs = if allowed {
            0
        } else {
            ceil_secs(reset_after)
        };
        let reset_at = Utc::now()
            + chrono::Duration::from_std(reset_after).unwrap_or_else(|_| chrono::Duration::zero());

        if !allowed {
            debug!(key = %key, retry_after_secs, "admission denied");
        }

        AdmissionDecision {
            allowed,
            limit: quota.max,
            remaining,
            reset_at,
            retry_after_secs,
        }
    }

    /// Like [`check`](Self::check), but a denial becomes
    /// `MoltError::RateLimited` carrying the decision.
    ///
    /// # Errors
    /// Returns `MoltError::RateLimited` when the caller is over quota.
    pub fn enforce(
        &self,
        caller: &CallerIdentity,
        class: ActionClass,
    ) -> MoltResult<AdmissionDecision> {
        let decision = self.check(caller, class);
        if decision.allowed {
            Ok(decision)
        } else {
            Err(MoltError::RateLimited {
                retry_after_secs: decision.retry_after_secs,
                decision: Some(Box::new(decision)),
            })
        }
    }

    /// Spawn the periodic sweep task for this controller's store.
    ///
    /// The horizon is clamped to at least the longest configured window, so
    /// sweeping can never drop quota state that is still countable.
    #[must_use]
    pub fn spawn_sweeper(&self, interval: Option<Duration>) -> Sweeper {
        let horizon = DEFAULT_SWEEP_HORIZON.max(self.config.longest_window());
        Sweeper::spawn(
            Arc::clone(&self.store),
            interval.unwrap_or(DEFAULT_SWEEP_INTERVAL),
            horizon,
        )
    }
}

/// Round a duration up to whole seconds.
fn ceil_secs(duration: Duration) -> u64 {
    let millis = duration.as_millis();
    u64::try_from(millis.div_ceil(1000)).unwrap_or(u64::MAX)
}
