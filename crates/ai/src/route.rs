//! Priority-weighted nearest-neighbor route construction.
//!
//! Greedy and planar: distances are Euclidean over raw lat/lng, and the
//! next stop minimizes `distance / max(priority, 1)`. The tour is not
//! optimal; it favors urgent stops even when they are farther away.

use serde::{Deserialize, Serialize};

/// A delivery stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub priority: f64,
}

impl RouteStop {
    pub fn new(id: impl Into<String>, lat: f64, lng: f64, priority: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lng,
            priority,
        }
    }

    fn distance_to(&self, other: &RouteStop) -> f64 {
        (self.lat - other.lat).hypot(self.lng - other.lng)
    }
}

/// Order `stops` into a visiting sequence.
///
/// Inputs of two stops or fewer are returned unchanged. Otherwise the tour
/// starts at the highest-priority stop (first one on ties).
pub fn optimize_route(stops: Vec<RouteStop>) -> Vec<RouteStop> {
    if stops.len() <= 2 {
        return stops;
    }

    let mut remaining = stops;
    remaining.sort_by(|a, b| b.priority.total_cmp(&a.priority));

    let mut tour = Vec::with_capacity(remaining.len());
    tour.push(remaining.remove(0));

    while !remaining.is_empty() {
        let Some(current) = tour.last() else { break };
        let next = remaining
            .iter()
            .enumerate()
            .map(|(idx, candidate)| (idx, weighted_distance(current, candidate)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        tour.push(remaining.remove(next));
    }

    tour
}

/// Total planar length of a tour, in the same units as the coordinates.
pub fn route_length(stops: &[RouteStop]) -> f64 {
    stops.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

fn weighted_distance(from: &RouteStop, to: &RouteStop) -> f64 {
    from.distance_to(to) / to.priority.max(1.0)
}
