//! Task handlers, the name-keyed handler registry, and the default catalog.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use bizsense_core::DomainResult;

use super::types::{AiTask, JsonMap, TaskCategory, TaskFrequency};

/// Executes one named task.
///
/// Handlers may read from external stores; any error they return is recorded
/// as a failed run, never propagated.
#[async_trait::async_trait]
pub trait TaskHandler: Send + Sync {
    async fn run(&self, task: &AiTask, now: DateTime<Utc>) -> anyhow::Result<JsonMap>;
}

/// Name-keyed handler lookup, built once at startup and injected where needed.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    handlers: HashMap<String, Arc<dyn TaskHandler>>,
}

impl std::fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("TaskRegistry").field("handlers", &names).finish()
    }
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the handler for a task name.
    pub fn register(&mut self, task_name: impl Into<String>, handler: impl TaskHandler + 'static) {
        self.handlers.insert(task_name.into(), Arc::new(handler));
    }

    pub fn with_handler(mut self, task_name: impl Into<String>, handler: impl TaskHandler + 'static) -> Self {
        self.register(task_name, handler);
        self
    }

    pub fn get(&self, task_name: &str) -> Option<Arc<dyn TaskHandler>> {
        self.handlers.get(task_name).cloned()
    }

    pub fn contains(&self, task_name: &str) -> bool {
        self.handlers.contains_key(task_name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

pub const DAILY_SALES_SUMMARY: &str = "Daily Sales Summary";
pub const INVENTORY_LEVEL_CHECK: &str = "Inventory Level Check";
pub const DRIVER_PERFORMANCE_REVIEW: &str = "Driver Performance Review";
pub const FRAUD_SCREENING: &str = "Wholesaler Fraud Screening";
pub const INACTIVE_ACCOUNT_REVIEW: &str = "Inactive Account Review";
pub const STORE_QUALITY_RANKING: &str = "Store Quality Ranking";
pub const AMBASSADOR_LEADERBOARD: &str = "Ambassador Leaderboard";
pub const REORDER_OUTREACH: &str = "Reorder Outreach List";
pub const ROUTE_EFFICIENCY_AUDIT: &str = "Route Efficiency Audit";
pub const MONTHLY_REVENUE_REPORT: &str = "Monthly Revenue Report";

const TEMPLATES: &[(&str, &str, TaskCategory, TaskFrequency)] = &[
    (
        DAILY_SALES_SUMMARY,
        "Aggregate yesterday's orders into revenue and order-count totals",
        TaskCategory::Sales,
        TaskFrequency::Daily,
    ),
    (
        INVENTORY_LEVEL_CHECK,
        "Find stores at or below the low-stock threshold",
        TaskCategory::Inventory,
        TaskFrequency::Daily,
    ),
    (
        DRIVER_PERFORMANCE_REVIEW,
        "Score drivers on completion, punctuality and ratings",
        TaskCategory::Delivery,
        TaskFrequency::Daily,
    ),
    (
        FRAUD_SCREENING,
        "Screen wholesaler accounts for fraud signals",
        TaskCategory::Finance,
        TaskFrequency::Daily,
    ),
    (
        INACTIVE_ACCOUNT_REVIEW,
        "List accounts without recent orders and their churn risk",
        TaskCategory::Customer,
        TaskFrequency::Weekly,
    ),
    (
        STORE_QUALITY_RANKING,
        "Score active stores and split them into performance segments",
        TaskCategory::Analytics,
        TaskFrequency::Weekly,
    ),
    (
        AMBASSADOR_LEADERBOARD,
        "Rank ambassadors by tier and projected earnings",
        TaskCategory::Marketing,
        TaskFrequency::Weekly,
    ),
    (
        REORDER_OUTREACH,
        "List stores likely to reorder this week",
        TaskCategory::Sales,
        TaskFrequency::Weekly,
    ),
    (
        ROUTE_EFFICIENCY_AUDIT,
        "Compare planned delivery routes against optimized tours",
        TaskCategory::Operations,
        TaskFrequency::Monthly,
    ),
    (
        MONTHLY_REVENUE_REPORT,
        "Summarize revenue growth month over month",
        TaskCategory::Finance,
        TaskFrequency::Monthly,
    ),
];

/// Fresh task records for every built-in template.
pub fn default_catalog() -> DomainResult<Vec<AiTask>> {
    TEMPLATES
        .iter()
        .map(|(name, description, category, frequency)| {
            AiTask::new(*name, *description, *category, *frequency)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Echo;

    #[async_trait::async_trait]
    impl TaskHandler for Echo {
        async fn run(&self, task: &AiTask, _now: DateTime<Utc>) -> anyhow::Result<JsonMap> {
            let mut out = JsonMap::new();
            out.insert("task".to_string(), task.name.clone().into());
            Ok(out)
        }
    }

    #[test]
    fn catalog_covers_every_category_and_cadence() {
        let catalog = default_catalog().unwrap();
        assert_eq!(catalog.len(), 10);

        let categories: HashSet<TaskCategory> = catalog.iter().map(|t| t.category).collect();
        assert_eq!(categories.len(), 8);

        let names: HashSet<&str> = catalog.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), catalog.len(), "names are unique");

        assert!(catalog.iter().any(|t| t.frequency == TaskFrequency::Daily));
        assert!(catalog.iter().any(|t| t.frequency == TaskFrequency::Weekly));
        assert!(catalog.iter().any(|t| t.frequency == TaskFrequency::Monthly));
        assert!(catalog.iter().all(|t| t.is_enabled && t.next_run.is_none()));
    }

    #[tokio::test]
    async fn registry_looks_up_by_name() {
        let registry = TaskRegistry::new().with_handler("echo", Echo);
        assert!(registry.contains("echo"));
        assert!(registry.get("missing").is_none());

        let task = AiTask::new("echo", "", TaskCategory::Analytics, TaskFrequency::Manual).unwrap();
        let handler = registry.get("echo").unwrap();
        let out = handler.run(&task, Utc::now()).await.unwrap();
        assert_eq!(out["task"], "echo");
    }
}
