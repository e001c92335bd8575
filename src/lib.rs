#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Courier Core
//!
//! Order dispatch and routing engine for a perishable, time-sensitive
//! delivery workflow: a customer order moves through a fixed lifecycle
//! (placement → acceptance → preparation → dispatch → delivery), is
//! broadcast in real time to exactly the parties who care about it, and is
//! paired with a delivery agent whose multi-stop route should be close to
//! optimal.
//!
//! ## Architecture
//!
//! Three tightly coupled subsystems sit at the core:
//!
//! - the **order state machine**, which validates role-gated transitions
//!   along the fixed lifecycle sequence;
//! - the **event fanout**, which notifies per-order rooms and a redundant
//!   customer-filterable broadcast channel on every state change;
//! - the **route optimizer**, a greedy nearest-neighbor sequencer over an
//!   agent's outstanding drop-offs.
//!
//! The [`dispatch::DispatchCoordinator`] glues them together: a state
//! transition is persisted through the storage collaborator, then fanned
//! out best-effort; route optimization is invoked on demand by the agent's
//! client and never coordinates with transitions.
//!
//! ## Module Organization
//!
//! - [`models`] - Orders, carts, users, restaurants
//! - [`state_machine`] - Lifecycle states, guards, and transitions
//! - [`events`] - Room registry and broadcast publisher
//! - [`geo`] - Haversine great-circle distance
//! - [`routing`] - Nearest-neighbor route construction
//! - [`dispatch`] - The coordinator and derived-value recomputation
//! - [`storage`] - The storage collaborator trait and in-memory store
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use courier_core::config::CourierConfig;
//! use courier_core::dispatch::DispatchCoordinator;
//! use courier_core::storage::InMemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryStore::new());
//! let coordinator = DispatchCoordinator::new(store, CourierConfig::from_env()?);
//!
//! let customer_id = uuid::Uuid::new_v4();
//! let order = coordinator.place_order(customer_id).await?;
//! println!("order {} placed in state {}", order.order_id, order.status);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod geo;
pub mod logging;
pub mod models;
pub mod routing;
pub mod state_machine;
pub mod storage;

pub use config::CourierConfig;
pub use dispatch::DispatchCoordinator;
pub use error::{DispatchError, Result};
pub use events::{EventPublisher, OrderUpdateBroadcast, RoomEvent, RoomRegistry};
pub use geo::{haversine_km, Location};
pub use models::{Actor, Cart, CartItem, Order, OrderItem, PaymentStatus, Rating, User, UserRole};
pub use routing::{DropOff, RoutePlan, RouteStop};
pub use state_machine::{OrderState, OrderStateMachine};
pub use storage::{InMemoryStore, OrderStore, StoreError};
