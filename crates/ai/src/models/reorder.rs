use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AiError, AiResult};
use crate::models::history_confidence;
use crate::scoring::{Trend, round_half_up, trend};

/// Interval assumed when a store has no established ordering rhythm.
pub const DEFAULT_ORDER_INTERVAL_DAYS: f64 = 14.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderInput {
    #[serde(default)]
    pub store_id: Option<String>,
    pub last_order_date: DateTime<Utc>,
    /// Order amounts, oldest first.
    #[serde(default)]
    pub order_history: Vec<f64>,
    #[serde(default)]
    pub average_order_interval: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderPrediction {
    pub store_id: Option<String>,
    /// Likelihood of a reorder now, 10–95.
    pub probability: u8,
    pub days_since_last_order: i64,
    pub expected_interval_days: f64,
    pub trend: Trend,
    pub predicted_next_order: Option<DateTime<Utc>>,
    pub confidence: u8,
    pub recommendation: String,
}

/// Predict how likely a store is to reorder as of `now`.
pub fn predict_reorder(input: &ReorderInput, now: DateTime<Utc>) -> AiResult<ReorderPrediction> {
    let interval = match input.average_order_interval {
        Some(days) if days.is_finite() && days > 0.0 => days,
        Some(days) if !days.is_finite() => {
            return Err(AiError::invalid_input(
                "average order interval must be a finite number",
            ));
        }
        _ => DEFAULT_ORDER_INTERVAL_DAYS,
    };

    let days_since = (now - input.last_order_date).num_days();
    let ratio = days_since as f64 / interval;

    let base: i32 = if (0.8..=1.2).contains(&ratio) {
        85
    } else if ratio > 1.2 && ratio <= 1.5 {
        70
    } else if ratio > 1.5 {
        40
    } else {
        30
    };

    let history_trend = trend(&input.order_history);
    let adjustment = match history_trend {
        Trend::Rising => 10,
        Trend::Declining => -20,
        Trend::Stable => 0,
    };
    let probability = (base + adjustment).clamp(10, 95) as u8;

    let predicted_next_order = (probability > 50).then(|| {
        let hours = round_half_up(interval * 24.0) as i64;
        input.last_order_date + Duration::hours(hours)
    });

    Ok(ReorderPrediction {
        store_id: input.store_id.clone(),
        probability,
        days_since_last_order: days_since,
        expected_interval_days: interval,
        trend: history_trend,
        predicted_next_order,
        confidence: history_confidence(input.order_history.len()),
        recommendation: recommendation(probability).to_string(),
    })
}

fn recommendation(probability: u8) -> &'static str {
    if probability >= 80 {
        "Reorder due - contact store today"
    } else if probability > 50 {
        "Reorder likely soon - schedule follow-up"
    } else {
        "No reorder expected yet"
    }
}
