//! # Storage Collaborator
//!
//! The persistence engine is an external collaborator, consumed only through
//! the [`OrderStore`] trait. Each operation is assumed atomic at the
//! single-document level; read-modify-write races on the same order are
//! closed by the store's optimistic version check, not by the engine.

pub mod memory;
pub mod timeout;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Cart, Order, Restaurant, User, UserRole};
use crate::state_machine::OrderState;

pub use memory::InMemoryStore;
pub use timeout::TimeoutStore;

/// Errors surfaced by the storage collaborator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// Transient I/O failure; the caller may retry the whole operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The record changed since it was read. The caller must re-read.
    #[error("Version conflict for order {order_id}")]
    VersionConflict { order_id: Uuid },

    /// A write targeted a record that does not exist.
    #[error("Missing {kind} record: {id}")]
    MissingRecord { kind: &'static str, id: Uuid },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The interface the dispatch core needs from persistence. Single-document
/// reads and writes only; no interesting invariants live behind it.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_order(&self, order_id: Uuid) -> StoreResult<Option<Order>>;

    /// Insert a freshly placed order. The stored copy (with its initial
    /// version) is returned.
    async fn insert_order(&self, order: Order) -> StoreResult<Order>;

    /// Persist an updated order. The write succeeds only if `order.version`
    /// matches the stored version; the stored copy with its bumped version
    /// is returned. A mismatch is a [`StoreError::VersionConflict`].
    async fn save_order(&self, order: Order) -> StoreResult<Order>;

    async fn find_user(&self, user_id: Uuid) -> StoreResult<Option<User>>;

    async fn find_users_by_role(&self, role: UserRole) -> StoreResult<Vec<User>>;

    async fn find_restaurant(&self, restaurant_id: Uuid) -> StoreResult<Option<Restaurant>>;

    async fn save_restaurant(&self, restaurant: Restaurant) -> StoreResult<Restaurant>;

    async fn find_cart(&self, customer_id: Uuid) -> StoreResult<Option<Cart>>;

    async fn save_cart(&self, cart: Cart) -> StoreResult<Cart>;

    /// Orders assigned to the given agent currently in the given state.
    /// Results preserve placement order (oldest first).
    async fn find_orders_by_agent_and_status(
        &self,
        agent_id: Uuid,
        status: OrderState,
    ) -> StoreResult<Vec<Order>>;

    /// Delivered orders for the restaurant that carry a rating, for the
    /// running-average recomputation.
    async fn find_delivered_rated_orders_by_restaurant(
        &self,
        restaurant_id: Uuid,
    ) -> StoreResult<Vec<Order>>;
}
