use serde::{Deserialize, Serialize};

use crate::error::{AiError, AiResult};

/// Stand-in for "never runs out" wherever a finite day count is required.
pub const DAYS_REMAINING_SENTINEL: u32 = 999;

/// Days of usage a suggested reorder should cover.
pub const COVERAGE_DAYS: f64 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Critical,
    Warning,
    Ok,
}

/// Raw depletion estimate; `days_remaining` is infinite when nothing is used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepletionEstimate {
    pub days_remaining: f64,
    pub urgency: Urgency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryInput {
    #[serde(default)]
    pub store_id: Option<String>,
    pub current_stock: f64,
    pub daily_usage: f64,
    #[serde(default)]
    pub reorder_point: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryNeeds {
    pub store_id: Option<String>,
    pub days_remaining: u32,
    pub urgency: Urgency,
    pub reorder_now: bool,
    pub suggested_quantity: f64,
}

/// Estimate how long `stock` lasts at `daily_usage`.
pub fn predict_depletion(stock: f64, daily_usage: f64) -> DepletionEstimate {
    let days_remaining = if daily_usage <= 0.0 {
        f64::INFINITY
    } else {
        (stock / daily_usage).floor()
    };

    let urgency = if days_remaining <= 3.0 {
        Urgency::Critical
    } else if days_remaining <= 7.0 {
        Urgency::Warning
    } else {
        Urgency::Ok
    };

    DepletionEstimate {
        days_remaining,
        urgency,
    }
}

/// Depletion urgency and reorder advice for one store.
pub fn predict_inventory_needs(input: &InventoryInput) -> AiResult<InventoryNeeds> {
    if input.current_stock.is_nan() || input.daily_usage.is_nan() {
        return Err(AiError::invalid_input("stock and usage must be numbers"));
    }

    let estimate = predict_depletion(input.current_stock, input.daily_usage);
    let days_remaining = if estimate.days_remaining.is_finite() {
        // `as` saturates at u32::MAX.
        estimate.days_remaining.max(0.0) as u32
    } else {
        DAYS_REMAINING_SENTINEL
    };

    let target = input.daily_usage.max(0.0) * COVERAGE_DAYS;
    let suggested_quantity = (target - input.current_stock).max(0.0).ceil();

    Ok(InventoryNeeds {
        store_id: input.store_id.clone(),
        days_remaining,
        urgency: estimate.urgency,
        reorder_now: input.current_stock <= input.reorder_point,
        suggested_quantity,
    })
}
