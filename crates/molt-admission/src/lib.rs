//! Molt Admission - sliding-window request admission control
//!
//! This crate decides whether a caller may proceed with an action:
//!
//! - **`WindowCounterStore`**: per-key timestamp logs with an atomic
//!   check-and-record primitive (sliding-window log, not a fixed bucket -
//!   avoids boundary burst artifacts)
//! - **`AdmissionController`**: per-(caller, action-class) decisions with
//!   retry metadata
//! - **Sweeper**: periodic removal of abandoned keys
//! - **Header rendering**: decisions as `x-ratelimit-*` response metadata
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use molt_admission::AdmissionController;
//! use molt_core::{ActionClass, AdmissionConfig, CallerIdentity};
//!
//! let controller = AdmissionController::new(AdmissionConfig::default())?;
//! let caller = CallerIdentity::resolve(agent, origin);
//!
//! // Denial becomes MoltError::RateLimited with retry metadata.
//! let decision = controller.enforce(&caller, ActionClass::General)?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod controller;
mod headers;
mod sweep;
mod window;

pub use controller::*;
pub use headers::*;
pub use sweep::*;
pub use window::*;
