//! In-memory reference implementations of the collaborator traits.
//!
//! Used by tests and single-process deployments. `MemoryVoteStore` enforces
//! the one-row-per-key constraint by construction: rows live in a map keyed
//! by the `(agent, target)` pair.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;

use molt_core::{
    AgentId, CommentId, MoltResult, TargetKind, TargetRef, VoteKey, VoteRecord, VoteValue,
};

use crate::{CounterStore, TargetDirectory, TargetMeta, VoteStore};

/// In-memory target directory.
#[derive(Debug, Default)]
pub struct MemoryTargetDirectory {
    targets: DashMap<TargetRef, TargetMeta>,
}

impl MemoryTargetDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a target with its author.
    pub fn insert(&self, target: TargetRef, author: AgentId) {
        self.targets.insert(target, TargetMeta { author });
    }
}

#[async_trait]
impl TargetDirectory for MemoryTargetDirectory {
    async fn find_target(&self, target: &TargetRef) -> MoltResult<Option<TargetMeta>> {
        Ok(self.targets.get(target).map(|meta| meta.value().clone()))
    }
}

/// In-memory vote rows, keyed by the uniqueness triple.
#[derive(Debug, Default)]
pub struct MemoryVoteStore {
    rows: DashMap<VoteKey, VoteRecord>,
}

impl MemoryVoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows (test observability).
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl VoteStore for MemoryVoteStore {
    async fn get(&self, key: &VoteKey) -> MoltResult<Option<VoteValue>> {
        Ok(self.rows.get(key).map(|row| row.value))
    }

    async fn put(&self, record: VoteRecord) -> MoltResult<()> {
        self.rows.insert(record.key(), record);
        Ok(())
    }

    async fn remove(&self, key: &VoteKey) -> MoltResult<()> {
        self.rows.remove(key);
        Ok(())
    }

    async fn get_many(
        &self,
        agent: &AgentId,
        targets: &[TargetRef],
    ) -> MoltResult<HashMap<TargetRef, VoteValue>> {
        let mut votes = HashMap::new();
        // Partitioned lookup: post and comment votes are logically separate
        // even when raw ids collide.
        for kind in [TargetKind::Post, TargetKind::Comment] {
            for target in targets.iter().filter(|t| t.kind() == kind) {
                let key = VoteKey {
                    agent: agent.clone(),
                    target: target.clone(),
                };
                if let Some(row) = self.rows.get(&key) {
                    votes.insert(target.clone(), row.value);
                }
            }
        }
        Ok(votes)
    }
}

/// In-memory score/karma/tally counters.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    scores: DashMap<TargetRef, i64>,
    karma: DashMap<AgentId, i64>,
    tallies: DashMap<CommentId, (i64, i64)>,
}

impl MemoryCounterStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current score of a target (0 when never voted on).
    #[must_use]
    pub fn score_of(&self, target: &TargetRef) -> i64 {
        self.scores.get(target).map_or(0, |score| *score)
    }

    /// Current karma of an agent (0 when never affected).
    #[must_use]
    pub fn karma_of(&self, agent: &AgentId) -> i64 {
        self.karma.get(agent).map_or(0, |karma| *karma)
    }

    /// Current `(upvotes, downvotes)` tally of a comment.
    #[must_use]
    pub fn tally_of(&self, comment: &CommentId) -> (i64, i64) {
        self.tallies.get(comment).map_or((0, 0), |tally| *tally)
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn apply_score_delta(&self, target: &TargetRef, delta: i64) -> MoltResult<()> {
        *self.scores.entry(target.clone()).or_insert(0) += delta;
        Ok(())
    }

    async fn apply_karma_delta(&self, agent: &AgentId, delta: i64) -> MoltResult<()> {
        *self.karma.entry(agent.clone()).or_insert(0) += delta;
        Ok(())
    }

    async fn apply_tally_delta(
        &self,
        comment: &CommentId,
        up_delta: i64,
        down_delta: i64,
    ) -> MoltResult<()> {
        let mut tally = self.tallies.entry(comment.clone()).or_insert((0, 0));
        tally.0 += up_delta;
        tally.1 += down_delta;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use molt_core::PostId;

    use super::*;

    #[tokio::test]
    async fn vote_store_holds_one_row_per_key() {
        let store = MemoryVoteStore::new();
        let agent = AgentId::from_static("a1");
        let target = TargetRef::Post(PostId::from_static("p1"));

        store
            .put(VoteRecord::new(agent.clone(), target.clone(), VoteValue::Up))
            .await
            .unwrap();
        store
            .put(VoteRecord::new(
                agent.clone(),
                target.clone(),
                VoteValue::Down,
            ))
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        let key = VoteKey { agent, target };
        assert_eq!(store.get(&key).await.unwrap(), Some(VoteValue::Down));
    }

    #[tokio::test]
    async fn get_many_skips_absent_votes_and_partitions_kinds() {
        let store = MemoryVoteStore::new();
        let agent = AgentId::from_static("a1");
        let post = TargetRef::Post(PostId::from_static("x"));
        // Same raw id as the post, different kind.
        let comment = TargetRef::Comment(CommentId::from_static("x"));
        let unvoted = TargetRef::Post(PostId::from_static("y"));

        store
            .put(VoteRecord::new(agent.clone(), post.clone(), VoteValue::Up))
            .await
            .unwrap();
        store
            .put(VoteRecord::new(
                agent.clone(),
                comment.clone(),
                VoteValue::Down,
            ))
            .await
            .unwrap();

        let votes = store
            .get_many(&agent, &[post.clone(), comment.clone(), unvoted.clone()])
            .await
            .unwrap();

        assert_eq!(votes.len(), 2);
        assert_eq!(votes[&post], VoteValue::Up);
        assert_eq!(votes[&comment], VoteValue::Down);
        assert!(!votes.contains_key(&unvoted));
    }

    #[tokio::test]
    async fn counters_accumulate_deltas() {
        let counters = MemoryCounterStore::new();
        let target = TargetRef::Post(PostId::from_static("p1"));
        let author = AgentId::from_static("author");
        let comment = CommentId::from_static("c1");

        counters.apply_score_delta(&target, 1).await.unwrap();
        counters.apply_score_delta(&target, -2).await.unwrap();
        counters.apply_karma_delta(&author, 1).await.unwrap();
        counters.apply_tally_delta(&comment, 1, 0).await.unwrap();
        counters.apply_tally_delta(&comment, -1, 1).await.unwrap();

        assert_eq!(counters.score_of(&target), -1);
        assert_eq!(counters.karma_of(&author), 1);
        assert_eq!(counters.tally_of(&comment), (0, 1));
    }
}
