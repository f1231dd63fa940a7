use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{AiError, AiResult};
use crate::models::churn::RiskLevel;
use crate::scoring::mean;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudInput {
    #[serde(default)]
    pub wholesaler_id: Option<String>,
    /// Order amounts, oldest first.
    pub order_amounts: Vec<f64>,
    #[serde(default)]
    pub payment_delays: u32,
    #[serde(default)]
    pub shipping_addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudFlags {
    pub unusual_order_size: bool,
    pub payment_delays: u32,
    pub address_mismatches: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudSignals {
    pub wholesaler_id: Option<String>,
    pub score: u32,
    pub risk: RiskLevel,
    pub flags: FraudFlags,
    pub recommendation: String,
}

/// Rule-based fraud screening for a wholesaler account.
///
/// An oversized last order adds 25, more than 3 payment delays add 5 each,
/// and more than 2 distinct shipping addresses add 20; capped at 100.
pub fn detect_wholesaler_fraud(input: &FraudInput) -> AiResult<FraudSignals> {
    let Some(&last_order) = input.order_amounts.last() else {
        return Err(AiError::invalid_input("order history is empty"));
    };

    let average = mean(&input.order_amounts);
    let distinct_addresses: HashSet<&str> = input
        .shipping_addresses
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .collect();

    let flags = FraudFlags {
        unusual_order_size: last_order > average * 2.0,
        payment_delays: input.payment_delays,
        address_mismatches: distinct_addresses.len() > 2,
    };

    let mut score: u32 = 0;
    if flags.unusual_order_size {
        score += 25;
    }
    if flags.payment_delays > 3 {
        score = score.saturating_add(flags.payment_delays.saturating_mul(5));
    }
    if flags.address_mismatches {
        score = score.saturating_add(20);
    }
    let score = score.min(100);

    let (risk, recommendation) = if score >= 60 {
        (RiskLevel::High, "Suspend account - manual review required")
    } else if score >= 30 {
        (RiskLevel::Medium, "Flag for review - verify recent orders")
    } else {
        (RiskLevel::Low, "No action needed")
    };

    Ok(FraudSignals {
        wholesaler_id: input.wholesaler_id.clone(),
        score,
        risk,
        flags,
        recommendation: recommendation.to_string(),
    })
}
