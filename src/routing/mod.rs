//! # Route Optimizer
//!
//! Greedy nearest-neighbor sequencing of delivery drop-offs. Explicitly a
//! heuristic, not an optimal-tour solver; see [`optimizer`] for the
//! documented pathology.

pub mod optimizer;

pub use optimizer::{
    build_plan, estimated_minutes, optimize_route, total_distance_km, DropOff, RoutePlan, RouteStop,
};
