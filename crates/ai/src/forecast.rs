//! Trend- and season-adjusted multi-period forecasting.
//!
//! Model:
//! - Start from the rolling average of the history.
//! - Multiply by a per-period trend factor (1.02 rising, 0.98 declining).
//! - Multiply by a weekly seasonal factor `1 + 0.1 * sin(pi * i / 7)`.
//!
//! Not statistically fitted; deterministic given the history.

use std::f64::consts::PI;

use crate::scoring::{Trend, rolling_average, round_half_up, trend};

/// Window for the starting level of the forecast.
pub const DEFAULT_WINDOW: usize = 7;

/// Default forecast horizon.
pub const DEFAULT_PERIODS: usize = 7;

/// Forecast `periods_ahead` values from `history`.
///
/// Histories shorter than 3 points produce a flat line at the last value
/// (or `0` for an empty history).
pub fn generate_forecast(history: &[f64], periods_ahead: usize) -> Vec<f64> {
    if history.len() < 3 {
        let last = history.last().copied().unwrap_or(0.0);
        return vec![last; periods_ahead];
    }

    let multiplier = trend_multiplier(trend(history));
    let mut level = rolling_average(history, DEFAULT_WINDOW);

    (0..periods_ahead)
        .map(|i| {
            level *= multiplier * seasonal_factor(i);
            round_half_up(level)
        })
        .collect()
}

fn trend_multiplier(trend: Trend) -> f64 {
    match trend {
        Trend::Rising => 1.02,
        Trend::Declining => 0.98,
        Trend::Stable => 1.0,
    }
}

fn seasonal_factor(period: usize) -> f64 {
    1.0 + 0.1 * (PI * period as f64 / 7.0).sin()
}
