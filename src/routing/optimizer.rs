//! Nearest-neighbor route construction.
//!
//! From the start coordinate, repeatedly travel to the closest unvisited
//! drop-off, breaking distance ties by input order (first occurrence wins).
//! O(n²) in the number of drop-offs; a single agent's concurrent drop-off
//! count is small, bounded by realistic delivery capacity rather than by the
//! algorithm.
//!
//! The greedy first choice does not backtrack and can produce visibly
//! suboptimal tours when drop-offs cluster on both sides of the start point.
//! That is documented behavior, covered by tests, not a bug.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::{haversine_km, Location};

/// An undelivered drop-off: destination plus the display fields the agent's
/// client renders. Constructed fresh per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropOff {
    pub order_id: Uuid,
    pub customer_name: String,
    pub address: Option<String>,
    pub location: Location,
    pub total_price: f64,
}

/// A drop-off sequenced into a route, annotated with the leg distance from
/// the previous stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub order_id: Uuid,
    pub customer_name: String,
    pub address: Option<String>,
    pub location: Location,
    pub total_price: f64,
    pub distance_from_previous_km: f64,
}

/// The full optimized route with aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub start: Location,
    pub stops: Vec<RouteStop>,
    pub total_distance_km: f64,
    pub estimated_minutes: u32,
    pub orders_count: usize,
}

impl RoutePlan {
    /// The explicit empty-result shape: zero drop-offs is not an error.
    pub fn empty(start: Location) -> Self {
        Self {
            start,
            stops: Vec::new(),
            total_distance_km: 0.0,
            estimated_minutes: 0,
            orders_count: 0,
        }
    }
}

/// Sequence `drop_offs` from `start` by greedy nearest neighbor.
pub fn optimize_route(start: Location, drop_offs: Vec<DropOff>) -> Vec<RouteStop> {
    let mut route = Vec::with_capacity(drop_offs.len());
    let mut current = start;
    let mut remaining = drop_offs;

    while !remaining.is_empty() {
        let mut nearest_index = 0;
        let mut shortest = f64::INFINITY;

        // Strict `<` keeps the first occurrence on a tie.
        for (index, candidate) in remaining.iter().enumerate() {
            let distance = haversine_km(current, candidate.location);
            if distance < shortest {
                shortest = distance;
                nearest_index = index;
            }
        }

        let nearest = remaining.remove(nearest_index);
        current = nearest.location;
        route.push(RouteStop {
            order_id: nearest.order_id,
            customer_name: nearest.customer_name,
            address: nearest.address,
            location: nearest.location,
            total_price: nearest.total_price,
            distance_from_previous_km: shortest,
        });
    }

    route
}

/// Σ distance-from-previous across the ordered route.
pub fn total_distance_km(route: &[RouteStop]) -> f64 {
    route
        .iter()
        .map(|stop| stop.distance_from_previous_km)
        .sum()
}

/// Estimated travel time in whole minutes, rounded up.
pub fn estimated_minutes(distance_km: f64, speed_kmh: f64) -> u32 {
    let minutes = distance_km / speed_kmh * 60.0;
    minutes.ceil() as u32
}

/// Optimize and aggregate in one step.
pub fn build_plan(start: Location, drop_offs: Vec<DropOff>, speed_kmh: f64) -> RoutePlan {
    let stops = optimize_route(start, drop_offs);
    let total = total_distance_km(&stops);
    RoutePlan {
        start,
        estimated_minutes: if stops.is_empty() {
            0
        } else {
            estimated_minutes(total, speed_kmh)
        },
        orders_count: stops.len(),
        total_distance_km: total,
        stops,
    }
}
