use serde::{Deserialize, Serialize};

use crate::error::{AiError, AiResult};
use crate::models::finite_score;
use crate::scoring::{ScoreFactor, mean, weighted_score};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverInput {
    #[serde(default)]
    pub driver_id: Option<String>,
    pub total_deliveries: u32,
    pub completed_deliveries: u32,
    pub on_time_deliveries: u32,
    /// Customer ratings on a 1–5 scale.
    pub customer_ratings: Vec<f64>,
    /// Mean minutes actually spent per delivery.
    pub average_delivery_time: f64,
    /// Mean minutes planned per delivery.
    pub expected_delivery_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverMetrics {
    pub completion_rate: f64,
    pub on_time_rate: f64,
    pub average_rating: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverPerformance {
    pub driver_id: Option<String>,
    pub score: f64,
    pub metrics: DriverMetrics,
    pub alerts: Vec<String>,
}

/// Score a driver from completion (30%), punctuality (30%), customer rating
/// (25%) and time efficiency (15%).
pub fn calculate_driver_performance(input: &DriverInput) -> AiResult<DriverPerformance> {
    if input.total_deliveries == 0 {
        return Err(AiError::invalid_input("driver has no assigned deliveries"));
    }
    if input.customer_ratings.is_empty() {
        return Err(AiError::invalid_input("customer ratings are required"));
    }
    if input.average_delivery_time.is_nan() || input.average_delivery_time <= 0.0 {
        return Err(AiError::invalid_input(
            "average delivery time must be positive",
        ));
    }

    let total = f64::from(input.total_deliveries);
    let average_rating = mean(&input.customer_ratings);
    let metrics = DriverMetrics {
        completion_rate: f64::from(input.completed_deliveries) / total * 100.0,
        on_time_rate: f64::from(input.on_time_deliveries) / total * 100.0,
        average_rating,
        efficiency: (input.expected_delivery_time / input.average_delivery_time * 100.0).min(100.0),
    };
    let rating_basis = average_rating * 20.0;

    let score = finite_score(
        weighted_score(&[
            ScoreFactor::new(metrics.completion_rate, 30.0),
            ScoreFactor::new(metrics.on_time_rate, 30.0),
            ScoreFactor::new(rating_basis, 25.0),
            ScoreFactor::new(metrics.efficiency, 15.0),
        ]),
        "driver performance",
    )?;

    let mut alerts = Vec::new();
    if metrics.on_time_rate < 70.0 {
        alerts.push("On-time delivery rate below 70%".to_string());
    }
    if metrics.completion_rate < 90.0 {
        alerts.push("Completion rate below 90%".to_string());
    }
    if rating_basis < 60.0 {
        alerts.push("Customer rating below 3.0".to_string());
    }

    Ok(DriverPerformance {
        driver_id: input.driver_id.clone(),
        score,
        metrics,
        alerts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> DriverInput {
        DriverInput {
            driver_id: Some("drv-7".to_string()),
            total_deliveries: 100,
            completed_deliveries: 98,
            on_time_deliveries: 90,
            customer_ratings: vec![5.0, 4.0, 5.0, 4.0],
            average_delivery_time: 30.0,
            expected_delivery_time: 30.0,
        }
    }

    #[test]
    fn strong_driver_has_no_alerts() {
        let perf = calculate_driver_performance(&input()).unwrap();
        assert_eq!(perf.metrics.completion_rate, 98.0);
        assert_eq!(perf.metrics.on_time_rate, 90.0);
        assert_eq!(perf.metrics.average_rating, 4.5);
        assert_eq!(perf.metrics.efficiency, 100.0);
        // (98*30 + 90*30 + 90*25 + 100*15) / 100 = 93.9
        assert_eq!(perf.score, 94.0);
        assert!(perf.alerts.is_empty());
    }

    #[test]
    fn weak_driver_collects_every_alert() {
        let mut weak = input();
        weak.completed_deliveries = 80;
        weak.on_time_deliveries = 50;
        weak.customer_ratings = vec![2.0, 3.0];
        weak.average_delivery_time = 60.0;

        let perf = calculate_driver_performance(&weak).unwrap();
        assert_eq!(perf.metrics.efficiency, 50.0);
        assert_eq!(perf.alerts.len(), 3);
    }

    #[test]
    fn faster_than_expected_caps_efficiency() {
        let mut fast = input();
        fast.average_delivery_time = 15.0;
        let perf = calculate_driver_performance(&fast).unwrap();
        assert_eq!(perf.metrics.efficiency, 100.0);
    }

    #[test]
    fn missing_ratings_are_invalid_input() {
        let mut bad = input();
        bad.customer_ratings.clear();
        let err = calculate_driver_performance(&bad).unwrap_err();
        assert_eq!(err, AiError::invalid_input("customer ratings are required"));
    }

    #[test]
    fn zero_deliveries_are_invalid_input() {
        let mut bad = input();
        bad.total_deliveries = 0;
        assert!(matches!(
            calculate_driver_performance(&bad),
            Err(AiError::InvalidInput(_))
        ));
    }
}
