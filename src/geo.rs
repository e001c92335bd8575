//! Great-circle distance over WGS-ish latitude/longitude pairs.
//!
//! Distances feed both the route optimizer and delivery ETAs, so the
//! haversine here is the single source of truth for "how far apart are two
//! points" across the crate.

use serde::{Deserialize, Serialize};

use crate::constants::EARTH_RADIUS_KM;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Haversine great-circle distance between two points, in kilometers.
pub fn haversine_km(from: Location, to: Location) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}
