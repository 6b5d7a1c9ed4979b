//! Rendering admission decisions as response metadata.
//!
//! Emits the standard `x-ratelimit-*` header vocabulary (the server-side
//! dual of the headers API clients parse). Every response carries the quota
//! fields; `retry-after` is added only on denial.

use std::collections::HashMap;

use molt_core::AdmissionDecision;

pub const HEADER_LIMIT: &str = "x-ratelimit-limit";
pub const HEADER_REMAINING: &str = "x-ratelimit-remaining";
pub const HEADER_RESET: &str = "x-ratelimit-reset";
pub const HEADER_RETRY_AFTER: &str = "retry-after";

/// Render a decision as response headers.
///
/// `x-ratelimit-reset` is the Unix timestamp (seconds) at which the oldest
/// counted event exits the window.
#[must_use]
pub fn decision_headers(decision: &AdmissionDecision) -> HashMap<String, String> {
    let mut headers = HashMap::with_capacity(4);
    headers.insert(HEADER_LIMIT.to_owned(), decision.limit.to_string());
    headers.insert(HEADER_REMAINING.to_owned(), decision.remaining.to_string());
    headers.insert(
        HEADER_RESET.to_owned(),
        decision.reset_at.timestamp().to_string(),
    );
    if !decision.allowed {
        headers.insert(
            HEADER_RETRY_AFTER.to_owned(),
            decision.retry_after_secs.to_string(),
        );
    }
    headers
}
