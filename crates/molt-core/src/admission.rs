//! Admission vocabulary: action classes, quotas, caller identity, decisions.
//!
//! These are the declarative, platform-facing types. The sliding-window
//! enforcement algorithm lives in `molt-admission`.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AgentId;

/// Bucket name shared by callers with neither a token identity nor a
/// resolvable network origin.
pub const ANONYMOUS_BUCKET: &str = "anonymous";

/// The class of action a request performs, each with an independent quota.
///
/// Exhausting one class never exempts a caller from another: a caller over
/// the general quota is still subject to the stricter creation quotas and
/// vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionClass {
    /// Any API request.
    General,
    /// Creating a post.
    PostCreate,
    /// Creating a comment.
    CommentCreate,
}

impl ActionClass {
    /// All action classes, for iteration in config validation.
    pub const ALL: [Self; 3] = [Self::General, Self::PostCreate, Self::CommentCreate];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::PostCreate => "post_create",
            Self::CommentCreate => "comment_create",
        }
    }
}

impl fmt::Display for ActionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A quota: at most `max` admitted events per trailing `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaSpec {
    /// Maximum admitted events in the window.
    pub max: u32,

    /// Trailing window duration.
    pub window: Duration,
}

impl QuotaSpec {
    /// Create a new quota.
    #[must_use]
    pub const fn new(max: u32, window: Duration) -> Self {
        Self { max, window }
    }

    /// `max` events per minute.
    #[must_use]
    pub const fn per_minute(max: u32) -> Self {
        Self::new(max, Duration::from_secs(60))
    }

    /// `max` events per hour.
    #[must_use]
    pub const fn per_hour(max: u32) -> Self {
        Self::new(max, Duration::from_secs(3600))
    }
}

/// Per-class quotas for the admission controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionConfig {
    pub general: QuotaSpec,
    pub post_create: QuotaSpec,
    pub comment_create: QuotaSpec,
}

impl AdmissionConfig {
    /// The quota for an action class.
    #[must_use]
    pub const fn quota(&self, class: ActionClass) -> QuotaSpec {
        match class {
            ActionClass::General => self.general,
            ActionClass::PostCreate => self.post_create,
            ActionClass::CommentCreate => self.comment_create,
        }
    }

    /// Replace the quota for one action class.
    #[must_use]
    pub const fn with_quota(mut self, class: ActionClass, quota: QuotaSpec) -> Self {
        match class {
            ActionClass::General => self.general = quota,
            ActionClass::PostCreate => self.post_create = quota,
            ActionClass::CommentCreate => self.comment_create = quota,
        }
        self
    }

    /// The longest configured window across all classes.
    ///
    /// Housekeeping horizons must not undercut this, or sweeping could drop
    /// quota state that is still countable.
    #[must_use]
    pub fn longest_window(&self) -> Duration {
        ActionClass::ALL
            .iter()
            .map(|class| self.quota(*class).window)
            .max()
            .unwrap_or(Duration::ZERO)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `MoltError::InvalidRequest` if any quota has `max == 0` or a
    /// zero-length window.
    pub fn validate(&self) -> Result<(), crate::MoltError> {
        for class in ActionClass::ALL {
            let quota = self.quota(class);
            if quota.max == 0 {
                return Err(crate::MoltError::InvalidRequest {
                    message: format!("{class} quota max must be > 0"),
                });
            }
            if quota.window.is_zero() {
                return Err(crate::MoltError::InvalidRequest {
                    message: format!("{class} quota window must be > 0"),
                });
            }
        }
        Ok(())
    }
}

impl Default for AdmissionConfig {
    /// Platform defaults: 100 requests/minute, 1 post per 30 minutes,
    /// 50 comments/hour.
    fn default() -> Self {
        Self {
            general: QuotaSpec::per_minute(100),
            post_create: QuotaSpec::new(1, Duration::from_secs(30 * 60)),
            comment_create: QuotaSpec::per_hour(50),
        }
    }
}

/// Resolved identity of a caller, for quota bucketing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerIdentity {
    /// Authenticated token identity.
    Agent(AgentId),
    /// Unauthenticated, bucketed by network origin.
    Origin(String),
    /// Neither identity nor origin; shares one collective bucket.
    Anonymous,
}

impl CallerIdentity {
    /// Resolve an identity from what the authentication collaborator supplied:
    /// token identity first, then network origin, then the anonymous bucket.
    #[must_use]
    pub fn resolve(agent: Option<AgentId>, origin: Option<&str>) -> Self {
        match (agent, origin) {
            (Some(agent), _) => Self::Agent(agent),
            (None, Some(origin)) if !origin.is_empty() => Self::Origin(origin.to_owned()),
            _ => Self::Anonymous,
        }
    }

    /// The quota bucket this caller counts against.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::Agent(id) => id.as_str(),
            Self::Origin(origin) => origin.as_str(),
            Self::Anonymous => ANONYMOUS_BUCKET,
        }
    }
}

/// The outcome of one admission check. Computed per check, never persisted.
///
/// All four quota fields are rendered as response metadata on every request;
/// on denial the request is rejected with `MoltError::RateLimited` carrying
/// `retry_after_secs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionDecision {
    /// Whether the request may proceed.
    pub allowed: bool,

    /// Configured ceiling for this action class.
    pub limit: u32,

    /// Further requests permitted in the current window.
    pub remaining: u32,

    /// When the oldest counted event exits the window.
    pub reset_at: DateTime<Utc>,

    /// Whole seconds to wait before retrying; 0 when allowed.
    pub retry_after_secs: u64,
}
