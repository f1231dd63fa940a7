//! `bizsense-infra`
//!
//! **Responsibility:** the async edges of the decision-support engine.
//!
//! - `router`: validates `{type, params}` requests and dispatches them to the
//!   prediction models or the task scheduler, always answering with an
//!   `AiResponse`.
//! - `jobs`: the task catalog, handler registry, record-store boundary and
//!   the cadence-driven `TaskScheduler`.
//! - `config`: engine settings from defaults and `BIZSENSE_*` variables.

pub mod config;
pub mod jobs;
pub mod router;

pub use config::{ConfigError, EngineConfig, JobsConfig, SchedulerConfig};
pub use jobs::{AiTask, TaskLog, TaskRegistry, TaskScheduler};
pub use router::{AiOutput, AiRequest, AiResponse, AiRouter, RequestEnvelope, RouterError};
