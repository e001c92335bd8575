//! Crate-level error taxonomy.
//!
//! Validation, authorization, and state-machine violations are surfaced to
//! the caller with no retry; `StorageUnavailable` is the one transient
//! variant (safe to retry the whole operation — no partial state is
//! persisted without returning success). Fanout failures never appear here:
//! notification is a best-effort side channel, logged and swallowed by the
//! dispatch coordinator.

use uuid::Uuid;

use crate::state_machine::OrderState;
use crate::storage::StoreError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    /// Malformed input, e.g. a rating outside [1,5] or a mixed-restaurant cart.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Role or ownership mismatch. No state change occurred.
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// State-machine violation. Caller must re-fetch before retrying.
    #[error("Invalid transition from '{current}' to '{attempted}'")]
    InvalidTransition {
        current: OrderState,
        attempted: OrderState,
    },

    /// Unknown order, user, or restaurant.
    #[error("Not found: {kind} {id}")]
    NotFound { kind: &'static str, id: Uuid },

    /// Attempt to place an order from an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// An order may carry at most one rating.
    #[error("Order {0} already rated")]
    AlreadyRated(Uuid),

    /// Transient storage failure; the whole operation may be retried.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Invalid engine configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DispatchError {
    pub fn order_not_found(id: Uuid) -> Self {
        Self::NotFound { kind: "order", id }
    }

    pub fn user_not_found(id: Uuid) -> Self {
        Self::NotFound { kind: "user", id }
    }

    pub fn restaurant_not_found(id: Uuid) -> Self {
        Self::NotFound { kind: "restaurant", id }
    }
}

impl From<StoreError> for DispatchError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(reason) => Self::StorageUnavailable(reason),
            StoreError::VersionConflict { order_id } => Self::StorageUnavailable(format!(
                "concurrent update on order {order_id}, retry the operation"
            )),
            StoreError::MissingRecord { kind, id } => Self::NotFound { kind, id },
        }
    }
}

impl From<crate::state_machine::StateMachineError> for DispatchError {
    fn from(err: crate::state_machine::StateMachineError) -> Self {
        use crate::state_machine::StateMachineError as E;
        match err {
            E::InvalidTransition { current, attempted } => {
                Self::InvalidTransition { current, attempted }
            }
            E::Unauthorized(reason) => Self::Authorization(reason),
            E::OrderNotFound(id) => Self::order_not_found(id),
            E::StorageUnavailable(reason) => Self::StorageUnavailable(reason),
        }
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
