//! `bizsense-core` — shared building blocks for the decision-support engine.
//!
//! Identifiers and the domain error model. No IO, no async.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{TaskId, TaskLogId};
