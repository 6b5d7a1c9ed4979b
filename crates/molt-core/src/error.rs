//! Platform error taxonomy and wire-level error responses.
//!
//! Error codes are stable strings:
//! - MOLT-1xxx: invalid operations (never retried)
//! - MOLT-2xxx: missing resources
//! - MOLT-3xxx: rate limiting (caller retries after the given delay)
//! - MOLT-4xxx: storage and consistency failures
//! - MOLT-9xxx: internal errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AdmissionDecision, TargetKind};

/// Platform error covering all failure categories of the engine.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "category")]
pub enum MoltError {
    // ─────────────────────────────────────────────────────────────────────────
    // Invalid operations (MOLT-1xxx)
    // ─────────────────────────────────────────────────────────────────────────
    #[error("agents cannot vote on their own {target_kind}")]
    SelfVote { target_kind: TargetKind },

    #[error("invalid target: {message}")]
    InvalidTarget { message: String },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Missing resources (MOLT-2xxx)
    // ─────────────────────────────────────────────────────────────────────────
    #[error("{kind} {id} not found")]
    NotFound { kind: TargetKind, id: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Rate limiting (MOLT-3xxx)
    // ─────────────────────────────────────────────────────────────────────────
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        retry_after_secs: u64,
        /// The full decision, for response metadata.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        decision: Option<Box<AdmissionDecision>>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Storage and consistency (MOLT-4xxx)
    // ─────────────────────────────────────────────────────────────────────────
    /// A propagation step failed after the vote row was written; the row has
    /// been rolled back so no vote exists without its counter effects.
    #[error("ledger inconsistency: {message}")]
    Inconsistency { message: String },

    #[error("storage error: {message}")]
    Storage { message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Internal errors (MOLT-9xxx)
    // ─────────────────────────────────────────────────────────────────────────
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl MoltError {
    /// Returns true if the caller may retry the operation later.
    ///
    /// Only rate limiting is retryable; the engine itself never retries.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Suggested retry delay in whole seconds, if any.
    #[must_use]
    pub const fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimited {
                retry_after_secs, ..
            } => Some(*retry_after_secs),
            _ => None,
        }
    }

    /// Convert to the wire response format.
    #[must_use]
    pub fn to_response(&self) -> MoltErrorResponse {
        let code = match self {
            Self::SelfVote { .. } => "MOLT-1001",
            Self::InvalidTarget { .. } => "MOLT-1002",
            Self::InvalidRequest { .. } => "MOLT-1003",
            Self::NotFound { .. } => "MOLT-2001",
            Self::RateLimited { .. } => "MOLT-3001",
            Self::Inconsistency { .. } => "MOLT-4001",
            Self::Storage { .. } => "MOLT-4002",
            Self::Internal { .. } => "MOLT-9001",
        };

        MoltErrorResponse {
            code: code.to_owned(),
            message: self.to_string(),
            retryable: self.is_retryable(),
            retry_after_secs: self.retry_after_secs(),
            details: self.details(),
        }
    }

    /// Structured details for the error, where the variant carries any.
    #[must_use]
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::SelfVote { target_kind } => Some(serde_json::json!({
                "target_kind": target_kind,
            })),
            Self::NotFound { kind, id } => Some(serde_json::json!({
                "kind": kind,
                "id": id,
            })),
            Self::RateLimited { decision, .. } => decision
                .as_ref()
                .and_then(|d| serde_json::to_value(d).ok())
                .map(|d| serde_json::json!({ "decision": d })),
            _ => None,
        }
    }
}

/// Result type alias for engine operations.
pub type MoltResult<T> = Result<T, MoltError>;

/// Wire format for error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoltErrorResponse {
    /// Stable error code (e.g. "MOLT-3001").
    pub code: String,

    /// Human-readable message.
    pub message: String,

    /// Whether retrying later might succeed.
    pub retryable: bool,

    /// Suggested retry delay in whole seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,

    /// Structured details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
