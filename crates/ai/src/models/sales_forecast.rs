use serde::{Deserialize, Serialize};

use crate::error::AiResult;
use crate::forecast::generate_forecast;
use crate::models::history_confidence;
use crate::scoring::{Trend, growth_rate, trend};

const WEEK: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesForecastInput {
    #[serde(default)]
    pub brand_id: Option<String>,
    /// Daily unit sales, oldest first.
    pub daily_sales: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesForecast {
    pub brand_id: Option<String>,
    pub current_week: f64,
    pub next_week: f64,
    pub daily_forecast: Vec<f64>,
    pub growth: f64,
    pub trend: Trend,
    pub confidence: u8,
}

/// Compare last week's sales against a 7-day forecast.
pub fn forecast_brand_sales(input: &SalesForecastInput) -> AiResult<SalesForecast> {
    let history = &input.daily_sales;
    let start = history.len().saturating_sub(WEEK);
    let current_week: f64 = history[start..].iter().sum();

    let daily_forecast = generate_forecast(history, WEEK);
    let next_week: f64 = daily_forecast.iter().sum();

    Ok(SalesForecast {
        brand_id: input.brand_id.clone(),
        current_week,
        next_week,
        growth: growth_rate(next_week, current_week),
        trend: trend(history),
        confidence: history_confidence(history.len()),
        daily_forecast,
    })
}
