//! Molt Core - shared vocabulary for the molt platform engine
//!
//! This crate provides the foundational types and error handling used by the
//! admission controller, the vote ledger, and the thread assembler:
//!
//! - Validated identifier newtypes (`AgentId`, `PostId`, `CommentId`, `SubmoltId`)
//! - The vote data model (`VoteValue`, `TargetRef`, `VoteRecord`, `VoteOutcome`)
//! - The comment data model (`CommentRecord`, depth rules, sort orders)
//! - Admission vocabulary (`ActionClass`, `QuotaSpec`, `AdmissionDecision`)
//! - The platform error taxonomy (`MoltError`, `MoltErrorResponse`)
//!
//! Enforcement logic lives in `molt-admission`, `molt-ledger`, and
//! `molt-threads`; this crate holds declarations only.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod admission;
mod comment;
mod error;
mod id;
mod vote;

pub use admission::*;
pub use comment::*;
pub use error::*;
pub use id::*;
pub use vote::*;

// Re-export commonly used external types
pub use chrono::{DateTime, Utc};
