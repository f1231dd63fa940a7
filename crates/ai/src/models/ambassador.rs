use serde::{Deserialize, Serialize};

use crate::error::AiResult;
use crate::models::finite_score;
use crate::scoring::{ScoreFactor, round_cents, weighted_score};

const STORES_ONBOARDED_CAP: f64 = 50.0;
const ACTIVE_STORES_CAP: f64 = 30.0;
const COMMISSIONS_CAP: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbassadorTier {
    Platinum,
    Gold,
    Silver,
    Bronze,
}

impl AmbassadorTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            Self::Platinum
        } else if score >= 70.0 {
            Self::Gold
        } else if score >= 50.0 {
            Self::Silver
        } else {
            Self::Bronze
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbassadorInput {
    #[serde(default)]
    pub ambassador_id: Option<String>,
    pub stores_onboarded: u32,
    pub active_stores: u32,
    pub total_commissions: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbassadorScore {
    pub ambassador_id: Option<String>,
    pub score: f64,
    pub tier: AmbassadorTier,
    pub projected_earnings: f64,
}

/// Score a brand ambassador from onboarded stores (30%), active stores (40%)
/// and commissions earned (30%), each capped before normalization.
pub fn calculate_ambassador_score(input: &AmbassadorInput) -> AiResult<AmbassadorScore> {
    let onboarded = f64::from(input.stores_onboarded).min(STORES_ONBOARDED_CAP);
    let active = f64::from(input.active_stores).min(ACTIVE_STORES_CAP);
    let commissions = input.total_commissions.max(0.0).min(COMMISSIONS_CAP);

    let score = finite_score(
        weighted_score(&[
            ScoreFactor::new(onboarded, 30.0).with_max(STORES_ONBOARDED_CAP),
            ScoreFactor::new(active, 40.0).with_max(ACTIVE_STORES_CAP),
            ScoreFactor::new(commissions, 30.0).with_max(COMMISSIONS_CAP),
        ]),
        "ambassador",
    )?;

    Ok(AmbassadorScore {
        ambassador_id: input.ambassador_id.clone(),
        score,
        tier: AmbassadorTier::from_score(score),
        projected_earnings: round_cents(input.total_commissions * (1.0 + score / 100.0 * 0.2)),
    })
}
