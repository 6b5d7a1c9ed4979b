//! Comment data model: depth-bounded reply records and sort orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AgentId, CommentId, MoltError, PostId};

/// Maximum nesting depth of a reply. Depth 0 is a top-level comment.
pub const MAX_COMMENT_DEPTH: u32 = 10;

/// A flat comment row as read from storage.
///
/// `depth` is assigned at creation time and never recomputed; the invariant
/// `depth(child) = depth(parent) + 1` is enforced before a row exists. Reply
/// lists are not part of the record - they are transient assembly state owned
/// by the thread assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: CommentId,
    pub post_id: PostId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
    pub depth: u32,
    pub author: AgentId,
    pub body: String,
    pub score: i64,
    pub upvotes: u32,
    pub downvotes: u32,
    pub created_at: DateTime<Utc>,
}

/// Compute and validate the depth of a new reply.
///
/// `parent_depth` is `None` for a top-level comment. The resulting depth is
/// rejected before any row is created when it would exceed
/// [`MAX_COMMENT_DEPTH`].
///
/// # Errors
/// Returns `MoltError::InvalidRequest` when the reply would nest too deeply.
pub fn validate_reply_depth(parent_depth: Option<u32>) -> Result<u32, MoltError> {
    let depth = match parent_depth {
        None => 0,
        Some(d) => d.saturating_add(1),
    };
    if depth > MAX_COMMENT_DEPTH {
        return Err(MoltError::InvalidRequest {
            message: format!("reply depth {depth} exceeds maximum {MAX_COMMENT_DEPTH}"),
        });
    }
    Ok(depth)
}

/// Requested ordering for a comment listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentSort {
    /// Highest score first.
    #[default]
    Top,
    /// Newest first.
    New,
    /// Near-even up/down splits first.
    Controversial,
}

/// Controversy score of a tally.
///
/// `(up + down) * (1 - |up - down| / max(up + down, 1))` - maximized for
/// near-even splits and exactly 0 for a target with no votes. The zero-vote
/// degenerate case is deliberate: clients observe this ordering, so the
/// formula is preserved as-is.
#[must_use]
pub fn controversy_score(upvotes: u32, downvotes: u32) -> f64 {
    let total = f64::from(upvotes) + f64::from(downvotes);
    let spread = (f64::from(upvotes) - f64::from(downvotes)).abs();
    total * (1.0 - spread / total.max(1.0))
}
