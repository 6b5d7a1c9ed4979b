//! Vote data model.
//!
//! A vote is at most one record per `(agent, target)` pair, where the target
//! is a post or a comment. The vote value is an explicit two-variant enum at
//! every interface boundary; signed integers appear only inside the ledger's
//! delta computation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AgentId, CommentId, PostId};

/// The value of a stored vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteValue {
    Up,
    Down,
}

impl VoteValue {
    /// Signed contribution of this vote to a score or karma counter.
    ///
    /// This is the only sanctioned conversion from vote values to integers;
    /// callers outside delta computation should stay on the enum.
    #[must_use]
    pub const fn signum(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    /// The opposite vote value.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

/// Discriminates the two kinds of votable target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Post,
    Comment,
}

impl TargetKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed reference to a votable target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum TargetRef {
    Post(PostId),
    Comment(CommentId),
}

impl TargetRef {
    #[must_use]
    pub const fn kind(&self) -> TargetKind {
        match self {
            Self::Post(_) => TargetKind::Post,
            Self::Comment(_) => TargetKind::Comment,
        }
    }

    #[must_use]
    pub fn id_str(&self) -> &str {
        match self {
            Self::Post(id) => id.as_str(),
            Self::Comment(id) => id.as_str(),
        }
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id_str())
    }
}

/// The uniqueness key for a stored vote: one record per key at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteKey {
    pub agent: AgentId,
    pub target: TargetRef,
}

/// A stored vote row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub agent: AgentId,
    pub target: TargetRef,
    pub value: VoteValue,
    pub cast_at: DateTime<Utc>,
}

impl VoteRecord {
    /// Create a record stamped with the current wall clock.
    #[must_use]
    pub fn new(agent: AgentId, target: TargetRef, value: VoteValue) -> Self {
        Self {
            agent,
            target,
            value,
            cast_at: Utc::now(),
        }
    }

    /// The uniqueness key of this record.
    #[must_use]
    pub fn key(&self) -> VoteKey {
        VoteKey {
            agent: self.agent.clone(),
            target: self.target.clone(),
        }
    }
}

/// What a cast operation did to the stored vote state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteAction {
    Upvoted,
    Downvoted,
    /// Same direction cast again: the vote was toggled off.
    Removed,
    /// Opposite direction cast: the vote was flipped in one step.
    Changed,
}

impl VoteAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upvoted => "upvoted",
            Self::Downvoted => "downvoted",
            Self::Removed => "removed",
            Self::Changed => "changed",
        }
    }
}

impl fmt::Display for VoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a cast operation, surfaced to the request layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub action: VoteAction,
    pub message: String,
    /// Author of the target, whose karma absorbed the delta.
    pub target_author: AgentId,
}
