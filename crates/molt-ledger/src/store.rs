//! Collaborator traits at the ledger's storage boundary.
//!
//! The ledger issues logical reads and writes against these traits; each
//! individual call is assumed atomic by its implementation. Any backend that
//! enforces at most one vote row per `(agent, target)` key is acceptable.

use std::collections::HashMap;

use async_trait::async_trait;

use molt_core::{AgentId, CommentId, MoltResult, TargetRef, VoteKey, VoteRecord, VoteValue};

/// What the ledger needs to know about a vote target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetMeta {
    /// Author of the target; karma deltas land here.
    pub author: AgentId,
}

/// Lookup of vote targets (posts and comments).
#[async_trait]
pub trait TargetDirectory: Send + Sync {
    /// Find a target, returning `None` when it does not exist.
    async fn find_target(&self, target: &TargetRef) -> MoltResult<Option<TargetMeta>>;
}

/// Storage for vote rows, keyed by `(agent, target)`.
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// The stored vote value for a key, if any.
    async fn get(&self, key: &VoteKey) -> MoltResult<Option<VoteValue>>;

    /// Insert or replace the row for the record's key.
    async fn put(&self, record: VoteRecord) -> MoltResult<()>;

    /// Delete the row for a key. Deleting an absent row is not an error.
    async fn remove(&self, key: &VoteKey) -> MoltResult<()>;

    /// Batch read of one agent's votes across `targets`, partitioned by
    /// target kind. Targets without a vote produce no entry - absence means
    /// "no opinion", never a stored zero.
    async fn get_many(
        &self,
        agent: &AgentId,
        targets: &[TargetRef],
    ) -> MoltResult<HashMap<TargetRef, VoteValue>>;
}

/// External score/karma counters. Each call is individually atomic; the
/// ledger sequences them and compensates on partial failure.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Apply a delta to a target's stored score.
    async fn apply_score_delta(&self, target: &TargetRef, delta: i64) -> MoltResult<()>;

    /// Apply a delta to an agent's stored karma.
    async fn apply_karma_delta(&self, agent: &AgentId, delta: i64) -> MoltResult<()>;

    /// Apply deltas to a comment's upvote/downvote tally (kept separately
    /// from net score for the controversial sort order).
    async fn apply_tally_delta(
        &self,
        comment: &CommentId,
        up_delta: i64,
        down_delta: i64,
    ) -> MoltResult<()>;
}
