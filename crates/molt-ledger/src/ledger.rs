//! The vote ledger: state transitions and atomic propagation.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{error, warn};

use molt_core::{
    AgentId, MoltError, MoltResult, TargetRef, VoteAction, VoteKey, VoteOutcome, VoteRecord,
    VoteValue,
};

use crate::{CounterStore, TargetDirectory, TargetMeta, VoteStore};

/// One row of the vote state machine: where the triple ends up and the
/// deltas that take every counter there in a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VoteTransition {
    next: Option<VoteValue>,
    action: VoteAction,
    score_delta: i64,
    karma_delta: i64,
    up_delta: i64,
    down_delta: i64,
}

impl VoteTransition {
    /// Compute the transition for a requested direction against the current
    /// stored value.
    ///
    /// The flip case folds undo-old and apply-new into one ±2 delta so the
    /// counters never pass through an intermediate value.
    fn compute(current: Option<VoteValue>, requested: VoteValue) -> Self {
        match current {
            None => Self {
                next: Some(requested),
                action: match requested {
                    VoteValue::Up => VoteAction::Upvoted,
                    VoteValue::Down => VoteAction::Downvoted,
                },
                score_delta: requested.signum(),
                karma_delta: requested.signum(),
                up_delta: i64::from(requested == VoteValue::Up),
                down_delta: i64::from(requested == VoteValue::Down),
            },
            // Same direction again: toggle off, undoing the contribution.
            Some(existing) if existing == requested => Self {
                next: None,
                action: VoteAction::Removed,
                score_delta: -existing.signum(),
                karma_delta: -existing.signum(),
                up_delta: -i64::from(existing == VoteValue::Up),
                down_delta: -i64::from(existing == VoteValue::Down),
            },
            // Opposite direction: flip in one step.
            Some(existing) => Self {
                next: Some(requested),
                action: VoteAction::Changed,
                score_delta: 2 * requested.signum(),
                karma_delta: 2 * requested.signum(),
                up_delta: i64::from(requested == VoteValue::Up)
                    - i64::from(existing == VoteValue::Up),
                down_delta: i64::from(requested == VoteValue::Down)
                    - i64::from(existing == VoteValue::Down),
            },
        }
    }

    fn message(&self, target: &TargetRef) -> String {
        match self.action {
            VoteAction::Upvoted => format!("upvoted {}", target.kind()),
            VoteAction::Downvoted => format!("downvoted {}", target.kind()),
            VoteAction::Removed => "vote removed".to_owned(),
            VoteAction::Changed => match self.next {
                Some(VoteValue::Up) => "vote changed to upvote".to_owned(),
                _ => "vote changed to downvote".to_owned(),
            },
        }
    }
}

/// Vote ledger over external collaborators.
///
/// Constructed explicitly at startup and handed to the request layer; there
/// is no process-wide instance.
pub struct VoteLedger {
    directory: Arc<dyn TargetDirectory>,
    votes: Arc<dyn VoteStore>,
    counters: Arc<dyn CounterStore>,
    /// Per-triple locks: concurrent casts on the same key serialize here.
    locks: DashMap<VoteKey, Arc<Mutex<()>>>,
}

impl VoteLedger {
    #[must_use]
    pub fn new(
        directory: Arc<dyn TargetDirectory>,
        votes: Arc<dyn VoteStore>,
        counters: Arc<dyn CounterStore>,
    ) -> Self {
        Self {
            directory,
            votes,
            counters,
            locks: DashMap::new(),
        }
    }

    fn triple_lock(&self, key: &VoteKey) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn release_triple_lock(&self, key: &VoteKey) {
        // Drop registry entries nobody else holds; the map stays bounded by
        // the number of in-flight casts.
        self.locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) <= 1);
    }

    /// Cast `direction` on behalf of `agent` against `target`.
    ///
    /// Looks up the target, rejects self-votes, then applies the state
    /// transition: vote row, target score, author karma, and (for comments)
    /// the upvote/downvote tally move as one logical unit.
    ///
    /// # Errors
    /// - `MoltError::NotFound` when the target does not exist
    /// - `MoltError::SelfVote` when the agent authored the target
    /// - `MoltError::Inconsistency` when propagation failed and the vote row
    ///   was rolled back
    pub async fn cast(
        &self,
        agent: &AgentId,
        target: TargetRef,
        direction: VoteValue,
    ) -> MoltResult<VoteOutcome> {
        let meta = self
            .directory
            .find_target(&target)
            .await?
            .ok_or_else(|| MoltError::NotFound {
                kind: target.kind(),
                id: target.id_str().to_owned(),
            })?;

        if meta.author == *agent {
            return Err(MoltError::SelfVote {
                target_kind: target.kind(),
            });
        }

        let key = VoteKey {
            agent: agent.clone(),
            target: target.clone(),
        };
        let lock = self.triple_lock(&key);
        let guard = lock.lock().await;

        let result = self.apply(&key, &meta, direction).await;

        drop(guard);
        drop(lock);
        self.release_triple_lock(&key);
        result
    }

    /// Read-modify-write under the triple lock.
    async fn apply(
        &self,
        key: &VoteKey,
        meta: &TargetMeta,
        direction: VoteValue,
    ) -> MoltResult<VoteOutcome> {
        let current = self.votes.get(key).await?;
        let transition = VoteTransition::compute(current, direction);

        // Vote row first; counters follow within the same logical unit.
        match transition.next {
            Some(value) => {
                self.votes
                    .put(VoteRecord::new(
                        key.agent.clone(),
                        key.target.clone(),
                        value,
                    ))
                    .await?;
            }
            None => self.votes.remove(key).await?,
        }

        if let Err(cause) = self.propagate(&key.target, &meta.author, transition).await {
            self.rollback_row(key, current).await;
            return Err(MoltError::Inconsistency {
                message: format!("vote rolled back after failed propagation: {cause}"),
            });
        }

        Ok(VoteOutcome {
            action: transition.action,
            message: transition.message(&key.target),
            target_author: meta.author.clone(),
        })
    }

    /// Apply counter deltas in order, compensating in reverse on failure so
    /// a partial update is never left behind.
    async fn propagate(
        &self,
        target: &TargetRef,
        author: &AgentId,
        transition: VoteTransition,
    ) -> MoltResult<()> {
        self.counters
            .apply_score_delta(target, transition.score_delta)
            .await?;

        if let Err(cause) = self
            .counters
            .apply_karma_delta(author, transition.karma_delta)
            .await
        {
            self.undo_score(target, transition.score_delta).await;
            return Err(cause);
        }

        if let TargetRef::Comment(comment_id) = target {
            if let Err(cause) = self
                .counters
                .apply_tally_delta(comment_id, transition.up_delta, transition.down_delta)
                .await
            {
                self.undo_karma(author, transition.karma_delta).await;
                self.undo_score(target, transition.score_delta).await;
                return Err(cause);
            }
        }

        Ok(())
    }

    async fn undo_score(&self, target: &TargetRef, delta: i64) {
        if let Err(undo) = self.counters.apply_score_delta(target, -delta).await {
            error!(vote_target = %target, %undo, "failed to undo score delta during rollback");
        }
    }

    async fn undo_karma(&self, author: &AgentId, delta: i64) {
        if let Err(undo) = self.counters.apply_karma_delta(author, -delta).await {
            error!(author = %author, %undo, "failed to undo karma delta during rollback");
        }
    }

    /// Restore the vote row to its pre-transition state.
    async fn rollback_row(&self, key: &VoteKey, previous: Option<VoteValue>) {
        warn!(agent = %key.agent, vote_target = %key.target, "rolling back vote row");
        let restore = match previous {
            Some(value) => {
                self.votes
                    .put(VoteRecord::new(
                        key.agent.clone(),
                        key.target.clone(),
                        value,
                    ))
                    .await
            }
            None => self.votes.remove(key).await,
        };
        if let Err(undo) = restore {
            error!(agent = %key.agent, vote_target = %key.target, %undo, "failed to restore vote row");
        }
    }

    /// One agent's votes across `targets`, for annotating listings.
    ///
    /// Targets without a vote produce no entry.
    ///
    /// # Errors
    /// Propagates vote-store failures.
    pub async fn votes_for(
        &self,
        agent: &AgentId,
        targets: &[TargetRef],
    ) -> MoltResult<HashMap<TargetRef, VoteValue>> {
        self.votes.get_many(agent, targets).await
    }
}
