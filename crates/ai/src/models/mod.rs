//! Domain prediction models.
//!
//! Each model is a pure function over its own input record. Models are
//! deterministic and side-effect free; malformed input is reported as
//! [`AiError::InvalidInput`](crate::AiError::InvalidInput).

pub mod ambassador;
pub mod churn;
pub mod driver;
pub mod fraud;
pub mod inventory;
pub mod reorder;
pub mod sales_forecast;
pub mod store_quality;

pub use ambassador::{AmbassadorInput, AmbassadorScore, AmbassadorTier, calculate_ambassador_score};
pub use churn::{ChurnInput, ChurnRisk, RiskLevel, calculate_churn_risk};
pub use driver::{DriverInput, DriverPerformance, calculate_driver_performance};
pub use fraud::{FraudInput, FraudSignals, detect_wholesaler_fraud};
pub use inventory::{
    DepletionEstimate, InventoryInput, InventoryNeeds, Urgency, predict_depletion,
    predict_inventory_needs,
};
pub use reorder::{ReorderInput, ReorderPrediction, predict_reorder};
pub use sales_forecast::{SalesForecast, SalesForecastInput, forecast_brand_sales};
pub use store_quality::{StoreQualityInput, StoreQualityScore, calculate_store_quality};

use crate::error::{AiError, AiResult};

/// Confidence grows with the amount of history, capped at 90.
pub(crate) fn history_confidence(points: usize) -> u8 {
    (50 + points.saturating_mul(5)).min(90) as u8
}

/// Reject scores that are not finite (e.g. from non-finite inputs).
pub(crate) fn finite_score(score: f64, model: &str) -> AiResult<f64> {
    if score.is_finite() {
        Ok(score)
    } else {
        Err(AiError::InferenceFailed(format!(
            "{model} score is not a finite number"
        )))
    }
}
