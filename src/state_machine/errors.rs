use uuid::Uuid;

use super::states::OrderState;
use crate::storage::StoreError;

/// Errors raised while validating or applying a state transition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateMachineError {
    #[error("Invalid transition from '{current}' to '{attempted}'")]
    InvalidTransition {
        current: OrderState,
        attempted: OrderState,
    },

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Order {0} not found")]
    OrderNotFound(Uuid),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl From<StoreError> for StateMachineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(reason) => Self::StorageUnavailable(reason),
            // Version conflicts are resolved by the state machine re-reading
            // the current state; reaching this conversion means the re-read
            // itself failed.
            StoreError::VersionConflict { order_id } => {
                Self::StorageUnavailable(format!("unresolved conflict on order {order_id}"))
            }
            StoreError::MissingRecord { id, .. } => Self::OrderNotFound(id),
        }
    }
}

pub type StateMachineResult<T> = Result<T, StateMachineError>;

/// Errors raised by transition guards.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GuardError {
    #[error("Invalid transition from '{current}' to '{attempted}'")]
    InvalidTransition {
        current: OrderState,
        attempted: OrderState,
    },

    #[error("Not authorized: {0}")]
    NotAuthorized(String),
}

impl From<GuardError> for StateMachineError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::InvalidTransition { current, attempted } => {
                Self::InvalidTransition { current, attempted }
            }
            GuardError::NotAuthorized(reason) => Self::Unauthorized(reason),
        }
    }
}

pub type GuardResult<T> = Result<T, GuardError>;
