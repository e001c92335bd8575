//! Shared constants for the dispatch engine.
//!
//! The two speed constants are deliberately independent: the ETA recorded at
//! order placement assumes 40 km/h, while the route optimizer's own estimate
//! assumes 30 km/h. They must not be unified without a product decision.

/// Earth radius in kilometers used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Average speed assumed by the route optimizer's time estimate.
pub const DEFAULT_ROUTE_SPEED_KMH: f64 = 30.0;

/// Average speed assumed when recording an estimated delivery time.
pub const DEFAULT_ETA_SPEED_KMH: f64 = 40.0;

/// Fallback coordinates when an agent, customer, or restaurant carries no
/// location (central Lahore, matching historical data).
pub const DEFAULT_START_LAT: f64 = 31.5204;
pub const DEFAULT_START_LNG: f64 = 74.3587;

/// Default capacity of the broadcast event channel.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Default bound on a single storage call before it surfaces as retryable.
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5000;

/// Inclusive bounds for restaurant and delivery ratings.
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
