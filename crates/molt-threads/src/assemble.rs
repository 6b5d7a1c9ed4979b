//! Arena-backed thread assembly.

use std::collections::HashMap;

use serde::Serialize;

use molt_core::{CommentId, CommentRecord};

/// A node in the assembled forest. Replies are arena indices rather than
/// owned children, so a malformed input cannot produce ownership cycles.
#[derive(Debug, Clone)]
pub struct ThreadNode {
    pub record: CommentRecord,
    /// Indices of direct replies, in input order.
    pub replies: Vec<usize>,
    /// Index of the attached parent, if any.
    parent: Option<usize>,
}

/// An assembled comment forest.
#[derive(Debug, Clone, Default)]
pub struct CommentForest {
    nodes: Vec<ThreadNode>,
    roots: Vec<usize>,
}

impl CommentForest {
    /// Assemble a forest from flat, pre-sorted records.
    ///
    /// Two passes: build the arena and id index, then attach each node to
    /// its parent - or promote it to the root list when the parent is not in
    /// the record set, or when attaching would close a cycle. Sibling order
    /// is exactly the order siblings appeared in the input.
    #[must_use]
    pub fn assemble(records: Vec<CommentRecord>) -> Self {
        let mut nodes: Vec<ThreadNode> = records
            .into_iter()
            .map(|record| ThreadNode {
                record,
                replies: Vec::new(),
                parent: None,
            })
            .collect();

        let mut index: HashMap<CommentId, usize> = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            // First occurrence wins if an id ever appears twice.
            index.entry(node.record.id.clone()).or_insert(i);
        }

        let mut roots = Vec::new();
        for i in 0..nodes.len() {
            let parent_idx = nodes[i]
                .record
                .parent_id
                .as_ref()
                .and_then(|pid| index.get(pid).copied());

            match parent_idx {
                Some(p) if p != i && !reaches(&nodes, p, i) => {
                    nodes[p].replies.push(i);
                    nodes[i].parent = Some(p);
                }
                // Parent absent, self-referential, or would close a cycle.
                _ => roots.push(i),
            }
        }

        Self { nodes, roots }
    }

    /// Indices of top-level nodes, in input order.
    #[must_use]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// The node at an arena index.
    #[must_use]
    pub fn node(&self, idx: usize) -> Option<&ThreadNode> {
        self.nodes.get(idx)
    }

    /// Indices of a node's direct replies.
    #[must_use]
    pub fn replies(&self, idx: usize) -> &[usize] {
        self.nodes.get(idx).map_or(&[], |node| &node.replies)
    }

    /// Total node count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Render the forest as nested views for an API response.
    #[must_use]
    pub fn to_views(&self) -> Vec<CommentView> {
        self.roots
            .iter()
            .map(|&root| self.view_of(root))
            .collect()
    }

    fn view_of(&self, idx: usize) -> CommentView {
        let node = &self.nodes[idx];
        CommentView {
            record: node.record.clone(),
            replies: node.replies.iter().map(|&r| self.view_of(r)).collect(),
        }
    }
}

/// Whether `to` is reachable from `from` by following attached parents.
///
/// Used as the cycle guard: a node must never be attached under its own
/// descendant. Only previously attached links exist at check time, so the
/// walk is bounded by the arena size.
fn reaches(nodes: &[ThreadNode], from: usize, to: usize) -> bool {
    let mut cursor = Some(from);
    let mut steps = 0_usize;
    while let Some(i) = cursor {
        if i == to {
            return true;
        }
        steps += 1;
        if steps > nodes.len() {
            break;
        }
        cursor = nodes[i].parent;
    }
    false
}

/// Serializable nested rendering of one comment and its replies.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub record: CommentRecord,
    pub replies: Vec<CommentView>,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use molt_core::{AgentId, PostId};

    use super::*;

    fn record(id: &str, parent: Option<&str>, depth: u32) -> CommentRecord {
        CommentRecord {
            id: CommentId::new(id).unwrap(),
            post_id: PostId::from_static("p1"),
            parent_id: parent.map(|p| CommentId::new(p).unwrap()),
            depth,
            author: AgentId::from_static("author"),
            body: format!("comment {id}"),
            score: 0,
            upvotes: 0,
            downvotes: 0,
            created_at: Utc::now(),
        }
    }

    fn ids_of(forest: &CommentForest, indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .map(|&i| forest.node(i).unwrap().record.id.to_string())
            .collect()
    }

    #[test]
    fn four_node_fixture_nests_correctly() {
        let forest = CommentForest::assemble(vec![
            record("1", None, 0),
            record("2", Some("1"), 1),
            record("3", Some("1"), 1),
            record("4", Some("2"), 2),
        ]);

        assert_eq!(ids_of(&forest, forest.roots()), ["1"]);
        let root = forest.roots()[0];
        assert_eq!(ids_of(&forest, forest.replies(root)), ["2", "3"]);
        let two = forest.replies(root)[0];
        assert_eq!(ids_of(&forest, forest.replies(two)), ["4"]);
    }

    #[test]
    fn missing_parent_promotes_to_root() {
        let forest = CommentForest::assemble(vec![
            record("1", None, 0),
            // Parent "99" was filtered out of the record set.
            record("2", Some("99"), 1),
        ]);

        assert_eq!(ids_of(&forest, forest.roots()), ["1", "2"]);
    }

    #[test]
    fn empty_input_yields_empty_forest() {
        let forest = CommentForest::assemble(Vec::new());
        assert!(forest.is_empty());
        assert!(forest.roots().is_empty());
        assert!(forest.to_views().is_empty());
    }

    #[test]
    fn sibling_order_is_input_order() {
        let forest = CommentForest::assemble(vec![
            record("1", None, 0),
            record("c", Some("1"), 1),
            record("a", Some("1"), 1),
            record("b", Some("1"), 1),
        ]);

        let root = forest.roots()[0];
        assert_eq!(ids_of(&forest, forest.replies(root)), ["c", "a", "b"]);
    }

    #[test]
    fn mutual_parents_cannot_form_a_cycle() {
        let forest = CommentForest::assemble(vec![
            record("a", Some("b"), 1),
            record("b", Some("a"), 1),
        ]);

        // "a" attaches under "b"; attaching "b" under "a" would close the
        // loop, so "b" is promoted instead.
        assert_eq!(ids_of(&forest, forest.roots()), ["b"]);
        let b = forest.roots()[0];
        assert_eq!(ids_of(&forest, forest.replies(b)), ["a"]);
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn self_parent_is_promoted() {
        let forest = CommentForest::assemble(vec![record("a", Some("a"), 0)]);
        assert_eq!(ids_of(&forest, forest.roots()), ["a"]);
        assert!(forest.replies(forest.roots()[0]).is_empty());
    }

    #[test]
    fn views_nest_and_serialize() {
        let forest = CommentForest::assemble(vec![
            record("1", None, 0),
            record("2", Some("1"), 1),
        ]);

        let views = forest.to_views();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].replies.len(), 1);

        let json = serde_json::to_value(&views).unwrap();
        assert_eq!(json[0]["id"], "1");
        assert_eq!(json[0]["replies"][0]["id"], "2");
        assert_eq!(json[0]["replies"][0]["replies"], serde_json::json!([]));
    }
}
