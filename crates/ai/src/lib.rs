//! `bizsense-ai`
//!
//! **Responsibility:** deterministic decision-support models.
//!
//! - Scoring primitives, the forecast engine and the route optimizer are
//!   plain functions over slices.
//! - Prediction models compose them; each takes a typed input record and
//!   returns a typed output or an [`AiError`].
//! - Nothing here performs IO, spawns tasks, or mutates shared state.

pub mod error;
pub mod forecast;
pub mod models;
pub mod route;
pub mod scoring;

pub use error::{AiError, AiResult};
pub use forecast::generate_forecast;
pub use route::{RouteStop, optimize_route};
pub use scoring::{ScoreFactor, Scored, Segments, Trend};
