//! Dispatch coordination: the operations exposed to callers, glueing the
//! state machine, storage collaborator, fanout subsystem, and route planner.

pub mod coordinator;
pub mod ratings;
pub mod routes;

pub use coordinator::DispatchCoordinator;
pub use ratings::recompute_restaurant_rating;
pub use routes::plan_agent_route;
