use std::time::Duration;

use crate::constants::{
    DEFAULT_ETA_SPEED_KMH, DEFAULT_EVENT_CHANNEL_CAPACITY, DEFAULT_ROUTE_SPEED_KMH,
    DEFAULT_START_LAT, DEFAULT_START_LNG, DEFAULT_STORAGE_TIMEOUT_MS,
};
use crate::error::{DispatchError, Result};
use crate::geo::Location;

/// Engine configuration with environment overrides.
///
/// The two speed settings are independent assumptions (placement ETA vs
/// route estimate); see [`crate::constants`].
#[derive(Debug, Clone)]
pub struct CourierConfig {
    /// Average speed for the route optimizer's time estimate (km/h).
    pub route_speed_kmh: f64,
    /// Average speed for the ETA recorded on an order (km/h).
    pub eta_speed_kmh: f64,
    /// Fallback start/drop-off coordinates when no location is on record.
    pub default_location: Location,
    /// Capacity of the broadcast event channel.
    pub event_channel_capacity: usize,
    /// Bound on a single storage call before it surfaces as retryable.
    pub storage_timeout: Duration,
}

impl Default for CourierConfig {
    fn default() -> Self {
        Self {
            route_speed_kmh: DEFAULT_ROUTE_SPEED_KMH,
            eta_speed_kmh: DEFAULT_ETA_SPEED_KMH,
            default_location: Location::new(DEFAULT_START_LAT, DEFAULT_START_LNG),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            storage_timeout: Duration::from_millis(DEFAULT_STORAGE_TIMEOUT_MS),
        }
    }
}

impl CourierConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(speed) = std::env::var("COURIER_ROUTE_SPEED_KMH") {
            config.route_speed_kmh = parse_positive_f64("route_speed_kmh", &speed)?;
        }

        if let Ok(speed) = std::env::var("COURIER_ETA_SPEED_KMH") {
            config.eta_speed_kmh = parse_positive_f64("eta_speed_kmh", &speed)?;
        }

        if let Ok(lat) = std::env::var("COURIER_DEFAULT_LAT") {
            config.default_location.lat = parse_f64("default_lat", &lat)?;
        }

        if let Ok(lng) = std::env::var("COURIER_DEFAULT_LNG") {
            config.default_location.lng = parse_f64("default_lng", &lng)?;
        }

        if let Ok(capacity) = std::env::var("COURIER_EVENT_CHANNEL_CAPACITY") {
            config.event_channel_capacity = capacity.parse().map_err(|e| {
                DispatchError::Configuration(format!("Invalid event_channel_capacity: {e}"))
            })?;
        }

        if let Ok(timeout_ms) = std::env::var("COURIER_STORAGE_TIMEOUT_MS") {
            let ms: u64 = timeout_ms.parse().map_err(|e| {
                DispatchError::Configuration(format!("Invalid storage_timeout_ms: {e}"))
            })?;
            config.storage_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

fn parse_f64(name: &str, value: &str) -> Result<f64> {
    value
        .parse()
        .map_err(|e| DispatchError::Configuration(format!("Invalid {name}: {e}")))
}

fn parse_positive_f64(name: &str, value: &str) -> Result<f64> {
    let parsed = parse_f64(name, value)?;
    if parsed <= 0.0 {
        return Err(DispatchError::Configuration(format!(
            "Invalid {name}: must be positive, got {parsed}"
        )));
    }
    Ok(parsed)
}
