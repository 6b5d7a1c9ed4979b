//! Molt Ledger - the one-vote-per-agent-per-target invariant
//!
//! The ledger owns vote state transitions and their atomic propagation:
//!
//! - **State machine**: cast / toggle off / flip, with score and karma
//!   deltas computed in one step (a flip is ±2, never two ±1 updates)
//! - **Collaborator traits**: target lookup, vote rows, and the external
//!   score/karma counters the ledger updates but does not own
//! - **Per-triple linearizability**: concurrent casts against the same
//!   `(agent, target)` pair serialize; distinct pairs never contend
//! - **Rollback**: a failed propagation step restores the vote row, so no
//!   vote exists without its counter effects
//!
//! In-memory reference implementations of the collaborator traits are
//! provided for tests and single-process deployments.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod ledger;
mod memory;
mod store;

pub use ledger::*;
pub use memory::*;
pub use store::*;
