//! Scoring primitives shared by every prediction model.
//!
//! All helpers are deterministic and allocation-light. Rounding follows
//! "half up" semantics (`2.5 -> 3`, `-2.5 -> -2`) so scores are stable at the
//! boundaries the models use for their labels.

use serde::{Deserialize, Serialize};

/// One input to a weighted score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreFactor {
    pub value: f64,
    pub weight: f64,
    /// When set, `value` is rescaled to 0–100 as `value / max * 100`.
    pub max: Option<f64>,
}

impl ScoreFactor {
    pub fn new(value: f64, weight: f64) -> Self {
        Self {
            value,
            weight,
            max: None,
        }
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    fn normalized(&self) -> f64 {
        match self.max {
            Some(max) => self.value / max * 100.0,
            None => self.value,
        }
    }
}

/// Direction of a series, comparing its most recent points to the ones before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    Stable,
    Declining,
}

/// Round half up, matching the rounding used for every published score.
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Round to two decimals (currency amounts).
pub fn round_cents(x: f64) -> f64 {
    round_half_up(x * 100.0) / 100.0
}

/// Weighted average of normalized factors, rounded.
///
/// Callers must supply a positive total weight. A zero total weight yields
/// `NaN`; it is not guarded here.
pub fn weighted_score(factors: &[ScoreFactor]) -> f64 {
    let total_weight: f64 = factors.iter().map(|f| f.weight).sum();
    let weighted: f64 = factors.iter().map(|f| f.normalized() * f.weight).sum();
    round_half_up(weighted / total_weight)
}

/// Mean of the last `window` values (or all of them, if fewer). `0` when empty.
pub fn rolling_average(values: &[f64], window: usize) -> f64 {
    let start = values.len().saturating_sub(window);
    mean(&values[start..])
}

/// Classify the direction of a series.
///
/// The mean of the latest 3 points is compared with the mean of the 4 points
/// before them; more than +5% is rising, less than -5% is declining. Series
/// of 2 or 3 points have no baseline window, so their last point is compared
/// with their first.
pub fn trend(values: &[f64]) -> Trend {
    if values.len() < 2 {
        return Trend::Stable;
    }

    let split = values.len().saturating_sub(3);
    let (recent, older) = if split == 0 {
        (values[values.len() - 1], values[0])
    } else {
        (
            rolling_average(&values[split..], 3),
            rolling_average(&values[split.saturating_sub(4)..split], 4),
        )
    };

    if older == 0.0 {
        return if recent > 0.0 {
            Trend::Rising
        } else if recent < 0.0 {
            Trend::Declining
        } else {
            Trend::Stable
        };
    }

    let change = (recent - older) / older.abs() * 100.0;
    if change > 5.0 {
        Trend::Rising
    } else if change < -5.0 {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// Percentage change from `previous` to `current`, rounded.
///
/// A zero baseline reports `100` for any positive `current`, else `0`.
pub fn growth_rate(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    round_half_up((current - previous) / previous * 100.0)
}

/// Whether `value` deviates from `history` by more than `threshold` standard
/// deviations. Needs at least 3 historical points.
pub fn is_anomaly(value: f64, history: &[f64], threshold: f64) -> bool {
    if history.len() < 3 {
        return false;
    }
    let mean = mean(history);
    let std = stddev_population(history, mean);
    (value - mean).abs() > threshold * std
}

/// Anything that carries a performance score.
pub trait Scored {
    fn score(&self) -> f64;
}

/// Result of [`segment_by_performance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segments<T> {
    pub top: Vec<T>,
    pub middle: Vec<T>,
    pub bottom: Vec<T>,
}

/// Split items into top 20% / middle / bottom 20% by descending score.
///
/// Segment sizes are `ceil(len * 0.2)`. The three segments never overlap:
/// `top` is filled first, `bottom` takes at most what remains, and `middle`
/// may be empty for short inputs.
pub fn segment_by_performance<T: Scored>(mut items: Vec<T>) -> Segments<T> {
    items.sort_by(|a, b| b.score().total_cmp(&a.score()));

    let len = items.len();
    let edge = len.div_ceil(5);
    let top_count = edge.min(len);
    let bottom_count = edge.min(len - top_count);

    let bottom = items.split_off(len - bottom_count);
    let middle = items.split_off(top_count);

    Segments {
        top: items,
        middle,
        bottom,
    }
}

pub(crate) fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

/// Population standard deviation (n), deterministic.
fn stddev_population(xs: &[f64], mean: f64) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let var = xs
        .iter()
        .map(|x| {
            let d = x - mean;
            d * d
        })
        .sum::<f64>()
        / (xs.len() as f64);
    var.sqrt()
}
