use serde::{Deserialize, Serialize};

use crate::error::AiResult;
use crate::models::finite_score;
use crate::scoring::{ScoreFactor, weighted_score};

/// Order and payment history of a retail store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreQualityInput {
    #[serde(default)]
    pub store_id: Option<String>,
    pub total_orders: u32,
    pub paid_on_time: u32,
    pub total_paid: u32,
    /// Share of outreach the store answered, 0–100. Defaults to 70.
    #[serde(default)]
    pub response_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreQualityFactors {
    pub order_frequency: f64,
    pub payment_reliability: f64,
    pub order_volume: f64,
    pub responsiveness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreQualityScore {
    pub store_id: Option<String>,
    pub score: f64,
    pub factors: StoreQualityFactors,
    pub recommendation: String,
}

/// Score a store 0–100 from order frequency (25%), payment reliability (35%),
/// order volume (25%) and responsiveness (15%).
pub fn calculate_store_quality(input: &StoreQualityInput) -> AiResult<StoreQualityScore> {
    let orders = f64::from(input.total_orders);

    let factors = StoreQualityFactors {
        order_frequency: (orders / 50.0 * 100.0).min(100.0),
        payment_reliability: if input.total_paid > 0 {
            f64::from(input.paid_on_time) / f64::from(input.total_paid) * 100.0
        } else {
            50.0
        },
        order_volume: (orders * 2.0).min(100.0),
        responsiveness: input.response_rate.unwrap_or(70.0),
    };

    let score = finite_score(
        weighted_score(&[
            ScoreFactor::new(factors.order_frequency, 25.0),
            ScoreFactor::new(factors.payment_reliability, 35.0),
            ScoreFactor::new(factors.order_volume, 25.0),
            ScoreFactor::new(factors.responsiveness, 15.0),
        ]),
        "store quality",
    )?;

    Ok(StoreQualityScore {
        store_id: input.store_id.clone(),
        score,
        factors,
        recommendation: recommendation(score).to_string(),
    })
}

fn recommendation(score: f64) -> &'static str {
    if score >= 80.0 {
        "VIP customer - prioritize orders"
    } else if score >= 60.0 {
        "Good standing - maintain relationship"
    } else if score >= 40.0 {
        "Monitor closely - may need payment reminders"
    } else {
        "High risk - require prepayment"
    }
}
