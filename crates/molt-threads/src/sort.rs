//! Listing sort orders, applied before assembly.
//!
//! The assembler trusts input order, so the ordering contract lives here:
//! primary key per sort mode, then ascending depth so a parent is visited no
//! later than children at deeper levels. The sort is stable - full ties keep
//! storage order.

use std::cmp::Ordering;

use molt_core::{controversy_score, CommentRecord, CommentSort};

/// Sort records for assembly under the requested mode.
pub fn sort_records(records: &mut [CommentRecord], sort: CommentSort) {
    records.sort_by(|a, b| compare(a, b, sort).then_with(|| a.depth.cmp(&b.depth)));
}

fn compare(a: &CommentRecord, b: &CommentRecord, sort: CommentSort) -> Ordering {
    match sort {
        // Highest score first.
        CommentSort::Top => b.score.cmp(&a.score),
        // Newest first.
        CommentSort::New => b.created_at.cmp(&a.created_at),
        // Most controversial first.
        CommentSort::Controversial => controversy_score(b.upvotes, b.downvotes)
            .total_cmp(&controversy_score(a.upvotes, a.downvotes)),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use molt_core::{AgentId, CommentId, PostId};

    use super::*;

    fn record(id: &str, score: i64, up: u32, down: u32, age_secs: i64) -> CommentRecord {
        CommentRecord {
            id: CommentId::new(id).unwrap(),
            post_id: PostId::from_static("p1"),
            parent_id: None,
            depth: 0,
            author: AgentId::from_static("author"),
            body: String::new(),
            score,
            upvotes: up,
            downvotes: down,
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    fn ids(records: &[CommentRecord]) -> Vec<String> {
        records.iter().map(|r| r.id.to_string()).collect()
    }

    #[test]
    fn top_orders_by_score_descending() {
        let mut records = vec![
            record("low", 1, 0, 0, 0),
            record("high", 10, 0, 0, 0),
            record("mid", 5, 0, 0, 0),
        ];
        sort_records(&mut records, CommentSort::Top);
        assert_eq!(ids(&records), ["high", "mid", "low"]);
    }

    #[test]
    fn top_breaks_score_ties_by_depth() {
        let mut records = vec![
            record("deep", 5, 0, 0, 0),
            record("shallow", 5, 0, 0, 0),
        ];
        records[0].depth = 2;
        records[1].depth = 0;
        sort_records(&mut records, CommentSort::Top);
        assert_eq!(ids(&records), ["shallow", "deep"]);
    }

    #[test]
    fn new_orders_by_recency() {
        let mut records = vec![
            record("old", 0, 0, 0, 300),
            record("fresh", 0, 0, 0, 10),
            record("ancient", 0, 0, 0, 3000),
        ];
        sort_records(&mut records, CommentSort::New);
        assert_eq!(ids(&records), ["fresh", "old", "ancient"]);
    }

    #[test]
    fn controversial_prefers_even_splits_over_unanimity() {
        let mut records = vec![
            record("unanimous", 100, 100, 0, 0),
            record("split", 0, 50, 50, 0),
            record("silent", 0, 0, 0, 0),
        ];
        sort_records(&mut records, CommentSort::Controversial);
        // Unanimous and zero-vote comments both score 0; the even split
        // leads, and the stable sort keeps the 0-0 pair in storage order.
        assert_eq!(ids(&records), ["split", "unanimous", "silent"]);
    }

    #[test]
    fn stable_sort_keeps_storage_order_on_full_ties() {
        let mut records = vec![
            record("first", 3, 0, 0, 0),
            record("second", 3, 0, 0, 0),
            record("third", 3, 0, 0, 0),
        ];
        sort_records(&mut records, CommentSort::Top);
        assert_eq!(ids(&records), ["first", "second", "third"]);
    }
}
