//! The order lifecycle state machine.
//!
//! Validates an attempted transition against the guard set, then persists the
//! new state through the storage collaborator's optimistic version check. Two
//! near-simultaneous transition requests can both read the same prior state;
//! the store's version check makes exactly one write win, and the loser is
//! reported an [`StateMachineError::InvalidTransition`] against the state it
//! no longer expects.

use std::sync::Arc;

use super::errors::{StateMachineError, StateMachineResult};
use super::guards::{
    AssignedAgentGuard, EdgeRoleGuard, SequentialAdvanceGuard, TransitionGuard, TransitionRequest,
};
use super::states::OrderState;
use crate::models::{Actor, Order};
use crate::storage::{OrderStore, StoreError};

pub struct OrderStateMachine {
    store: Arc<dyn OrderStore>,
}

impl OrderStateMachine {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// Current persisted state of an order.
    pub async fn current_state(&self, order_id: uuid::Uuid) -> StateMachineResult<OrderState> {
        let order = self
            .store
            .find_order(order_id)
            .await?
            .ok_or(StateMachineError::OrderNotFound(order_id))?;
        Ok(order.status)
    }

    /// Attempt to transition an order to `target` on behalf of `actor`.
    ///
    /// Returns the updated order for fanout. No partial state is persisted
    /// on any failure path.
    pub async fn transition(
        &self,
        order_id: uuid::Uuid,
        actor: Actor,
        target: OrderState,
    ) -> StateMachineResult<Order> {
        let order = self
            .store
            .find_order(order_id)
            .await?
            .ok_or(StateMachineError::OrderNotFound(order_id))?;

        let request = TransitionRequest { actor, target };
        self.check_guards(&order, &request)?;

        let from_state = order.status;
        let mut updated = order;
        updated.status = target;

        match self.store.save_order(updated).await {
            Ok(saved) => {
                tracing::info!(
                    order_id = %saved.order_id,
                    from = %from_state,
                    to = %saved.status,
                    actor_role = %actor.role,
                    "Order transitioned"
                );
                Ok(saved)
            }
            // A concurrent writer advanced the order between our read and
            // write. Re-read so the caller sees the state it actually lost
            // against.
            Err(StoreError::VersionConflict { .. }) => {
                let current = self.current_state(order_id).await?;
                Err(StateMachineError::InvalidTransition {
                    current,
                    attempted: target,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn check_guards(&self, order: &Order, request: &TransitionRequest) -> StateMachineResult<()> {
        let guards: [&dyn TransitionGuard; 3] =
            [&SequentialAdvanceGuard, &EdgeRoleGuard, &AssignedAgentGuard];

        for guard in guards {
            if let Err(err) = guard.check(order, request) {
                tracing::debug!(
                    order_id = %order.order_id,
                    guard = guard.description(),
                    error = %err,
                    "Transition rejected"
                );
                return Err(err.into());
            }
        }

        Ok(())
    }
}
