//! Built-in handlers for catalog tasks that read business records.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use bizsense_ai::models::{
    ChurnInput, InventoryInput, StoreQualityInput, calculate_churn_risk, calculate_store_quality,
    predict_inventory_needs,
};
use bizsense_ai::scoring::{Scored, growth_rate, round_cents, segment_by_performance};

use super::catalog::{
    DAILY_SALES_SUMMARY, INACTIVE_ACCOUNT_REVIEW, INVENTORY_LEVEL_CHECK, STORE_QUALITY_RANKING,
    TaskHandler, TaskRegistry,
};
use super::records::{OrderRecord, PaymentStatus, RecordStore};
use super::types::{AiTask, JsonMap};
use crate::config::JobsConfig;

/// How far back order history is read for account-level models.
const ACCOUNT_HISTORY_DAYS: i64 = 365;

/// Window the store ranking scores over.
const RANKING_WINDOW_DAYS: i64 = 90;

impl TaskRegistry {
    /// Registry with every built-in handler wired to `store`.
    pub fn with_default_handlers(store: Arc<dyn RecordStore>, config: &JobsConfig) -> Self {
        TaskRegistry::new()
            .with_handler(DAILY_SALES_SUMMARY, DailySalesSummary::new(store.clone()))
            .with_handler(
                INVENTORY_LEVEL_CHECK,
                InventoryLevelCheck::new(store.clone(), config.low_stock_threshold),
            )
            .with_handler(
                INACTIVE_ACCOUNT_REVIEW,
                InactiveAccountReview::new(store.clone(), config.inactive_after_days),
            )
            .with_handler(STORE_QUALITY_RANKING, StoreQualityRanking::new(store))
    }
}

fn into_map(value: Value) -> JsonMap {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = JsonMap::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Totals for yesterday's orders, compared with the day before.
pub struct DailySalesSummary {
    store: Arc<dyn RecordStore>,
}

impl DailySalesSummary {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl TaskHandler for DailySalesSummary {
    async fn run(&self, _task: &AiTask, now: DateTime<Utc>) -> anyhow::Result<JsonMap> {
        let today = start_of_day(now);
        let yesterday = today - Duration::days(1);
        let day_before = yesterday - Duration::days(1);

        let orders = self.store.orders_between(yesterday, today).await?;
        let previous = self.store.orders_between(day_before, yesterday).await?;

        let revenue: f64 = orders.iter().map(|o| o.total_amount).sum();
        let previous_revenue: f64 = previous.iter().map(|o| o.total_amount).sum();
        let average_order_value = if orders.is_empty() {
            0.0
        } else {
            revenue / orders.len() as f64
        };

        debug!(orders = orders.len(), revenue, "aggregated daily sales");

        Ok(into_map(json!({
            "date": yesterday.date_naive().to_string(),
            "orderCount": orders.len(),
            "revenue": round_cents(revenue),
            "averageOrderValue": round_cents(average_order_value),
            "revenueGrowth": growth_rate(revenue, previous_revenue),
        })))
    }
}

/// Stores at or below the low-stock threshold, with depletion urgency.
pub struct InventoryLevelCheck {
    store: Arc<dyn RecordStore>,
    threshold: f64,
}

impl InventoryLevelCheck {
    pub fn new(store: Arc<dyn RecordStore>, threshold: f64) -> Self {
        Self { store, threshold }
    }
}

#[async_trait::async_trait]
impl TaskHandler for InventoryLevelCheck {
    async fn run(&self, _task: &AiTask, _now: DateTime<Utc>) -> anyhow::Result<JsonMap> {
        let levels = self.store.inventory_levels().await?;

        let mut low_stock = Vec::new();
        for record in levels.iter().filter(|r| r.current_tubes_left <= self.threshold) {
            let needs = predict_inventory_needs(&InventoryInput {
                store_id: Some(record.store_id.clone()),
                current_stock: record.current_tubes_left,
                daily_usage: record.daily_usage.unwrap_or(0.0),
                reorder_point: self.threshold,
            })?;
            low_stock.push(json!({
                "storeId": record.store_id,
                "tubesLeft": record.current_tubes_left,
                "daysRemaining": needs.days_remaining,
                "urgency": needs.urgency,
                "suggestedQuantity": needs.suggested_quantity,
            }));
        }

        Ok(into_map(json!({
            "storesScanned": levels.len(),
            "threshold": self.threshold,
            "lowStockCount": low_stock.len(),
            "lowStock": low_stock,
        })))
    }
}

/// Accounts without a recent order, ranked by churn risk.
pub struct InactiveAccountReview {
    store: Arc<dyn RecordStore>,
    inactive_after_days: u32,
}

impl InactiveAccountReview {
    pub fn new(store: Arc<dyn RecordStore>, inactive_after_days: u32) -> Self {
        Self {
            store,
            inactive_after_days,
        }
    }
}

#[async_trait::async_trait]
impl TaskHandler for InactiveAccountReview {
    async fn run(&self, _task: &AiTask, now: DateTime<Utc>) -> anyhow::Result<JsonMap> {
        let accounts = self.store.accounts().await?;
        let orders = self
            .store
            .orders_between(now - Duration::days(ACCOUNT_HISTORY_DAYS), now)
            .await?;
        let by_account = group_by_account(&orders);

        let mut inactive = Vec::new();
        for account in &accounts {
            let history = by_account.get(account.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            let last_activity = history
                .iter()
                .map(|o| o.created_at)
                .max()
                .unwrap_or(account.created_at);
            let idle_days = (now - last_activity).num_days().max(0);
            if idle_days < i64::from(self.inactive_after_days) {
                continue;
            }

            let spent: f64 = history.iter().map(|o| o.total_amount).sum();
            let risk = calculate_churn_risk(&ChurnInput {
                customer_id: Some(account.id.clone()),
                days_since_last_order: u32::try_from(idle_days).unwrap_or(u32::MAX),
                total_orders: history.len() as u32,
                average_order_value: if history.is_empty() {
                    0.0
                } else {
                    spent / history.len() as f64
                },
            })?;
            inactive.push((account.name.clone(), idle_days, risk));
        }

        inactive.sort_by(|a, b| b.2.score.cmp(&a.2.score).then_with(|| a.0.cmp(&b.0)));

        let rows: Vec<Value> = inactive
            .into_iter()
            .map(|(name, idle_days, risk)| {
                json!({
                    "accountId": risk.customer_id,
                    "name": name,
                    "daysInactive": idle_days,
                    "churnScore": risk.score,
                    "risk": risk.risk,
                    "recommendation": risk.recommendation,
                })
            })
            .collect();

        Ok(into_map(json!({
            "accountsReviewed": accounts.len(),
            "inactiveAfterDays": self.inactive_after_days,
            "inactiveCount": rows.len(),
            "accounts": rows,
        })))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct RankedStore {
    store_id: String,
    score: f64,
    recommendation: String,
}

impl Scored for RankedStore {
    fn score(&self) -> f64 {
        self.score
    }
}

/// Quality score for every store that ordered recently, split into segments.
pub struct StoreQualityRanking {
    store: Arc<dyn RecordStore>,
}

impl StoreQualityRanking {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl TaskHandler for StoreQualityRanking {
    async fn run(&self, _task: &AiTask, now: DateTime<Utc>) -> anyhow::Result<JsonMap> {
        let orders = self
            .store
            .orders_between(now - Duration::days(RANKING_WINDOW_DAYS), now)
            .await?;

        let mut ranked = Vec::new();
        for (store_id, history) in group_by_account(&orders) {
            let paid_on_time = history
                .iter()
                .filter(|o| o.payment_status == PaymentStatus::PaidOnTime)
                .count() as u32;
            let total_paid = history
                .iter()
                .filter(|o| o.payment_status != PaymentStatus::Unpaid)
                .count() as u32;

            let quality = calculate_store_quality(&StoreQualityInput {
                store_id: Some(store_id.to_string()),
                total_orders: history.len() as u32,
                paid_on_time,
                total_paid,
                response_rate: None,
            })?;
            ranked.push(RankedStore {
                store_id: store_id.to_string(),
                score: quality.score,
                recommendation: quality.recommendation,
            });
        }
        // Deterministic order among equal scores.
        ranked.sort_by(|a, b| a.store_id.cmp(&b.store_id));

        let stores_scored = ranked.len();
        let segments = segment_by_performance(ranked);

        Ok(into_map(json!({
            "windowDays": RANKING_WINDOW_DAYS,
            "storesScored": stores_scored,
            "top": segments.top,
            "middle": segments.middle,
            "bottom": segments.bottom,
        })))
    }
}

fn group_by_account(orders: &[OrderRecord]) -> HashMap<&str, Vec<&OrderRecord>> {
    let mut grouped: HashMap<&str, Vec<&OrderRecord>> = HashMap::new();
    for order in orders {
        grouped.entry(order.account_id.as_str()).or_default().push(order);
    }
    grouped
}
