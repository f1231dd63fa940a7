use serde::{Deserialize, Serialize};

use crate::error::AiResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// `high` above 60, `medium` above 30, otherwise `low`.
    pub fn from_churn_score(score: u32) -> Self {
        if score > 60 {
            Self::High
        } else if score > 30 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnInput {
    #[serde(default)]
    pub customer_id: Option<String>,
    pub days_since_last_order: u32,
    pub total_orders: u32,
    pub average_order_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnRisk {
    pub customer_id: Option<String>,
    pub score: u32,
    pub risk: RiskLevel,
    pub factors: Vec<String>,
    pub recommendation: String,
}

/// Additive churn score from recency, order count and basket size, with a
/// discount for loyal recent customers. Clamped to 0–100.
pub fn calculate_churn_risk(input: &ChurnInput) -> AiResult<ChurnRisk> {
    let mut score: i32 = 0;
    let mut factors = Vec::new();

    if input.days_since_last_order > 30 {
        score += 30;
        factors.push(format!("No order in {} days", input.days_since_last_order));
    } else if input.days_since_last_order > 14 {
        score += 15;
        factors.push(format!("No order in {} days", input.days_since_last_order));
    }

    if input.total_orders < 3 {
        score += 25;
        factors.push("Fewer than 3 orders".to_string());
    } else if input.total_orders < 10 {
        score += 10;
        factors.push("Fewer than 10 orders".to_string());
    }

    if input.average_order_value < 100.0 {
        score += 20;
        factors.push("Average order value below 100".to_string());
    } else if input.average_order_value < 300.0 {
        score += 10;
        factors.push("Average order value below 300".to_string());
    }

    if input.total_orders > 20 && input.days_since_last_order < 14 {
        score -= 20;
        factors.push("Loyal recent customer".to_string());
    }

    let score = score.clamp(0, 100) as u32;
    let risk = RiskLevel::from_churn_score(score);
    let recommendation = match risk {
        RiskLevel::High => "Reach out immediately with a retention offer",
        RiskLevel::Medium => "Schedule a check-in call",
        RiskLevel::Low => "Maintain regular engagement",
    };

    Ok(ChurnRisk {
        customer_id: input.customer_id.clone(),
        score,
        risk,
        factors,
        recommendation: recommendation.to_string(),
    })
}
