//! Analytical task system: catalog, cadence scheduling, execution logs.
//!
//! - `AiTask` records describe named jobs and their cadence; the caller owns
//!   and persists them.
//! - `TaskRegistry` maps task names to `TaskHandler`s.
//! - `TaskScheduler` decides what is due, runs handlers, and reports a
//!   `TaskLog` per run. It never fails and never persists.

pub mod catalog;
pub mod executor;
pub mod handlers;
pub mod records;
pub mod schedule;
pub mod types;

pub use catalog::{TaskHandler, TaskRegistry, default_catalog};
pub use executor::{TaskRun, TaskScheduler};
pub use handlers::{DailySalesSummary, InactiveAccountReview, InventoryLevelCheck, StoreQualityRanking};
pub use records::{
    AccountRecord, InMemoryRecordStore, InventoryRecord, OrderRecord, PaymentStatus, RecordStore,
    RecordStoreError,
};
pub use schedule::{Schedule, is_due};
pub use types::{
    AiTask, JsonMap, TaskCategory, TaskFrequency, TaskLog, TaskLogStatus, TaskOutcome, TaskStatus,
};
