//! Transition guards: lifecycle sequencing and role-based edge authorization.
//!
//! Guards are pure checks over the order snapshot and the attempted
//! transition. The restaurant drives the kitchen-side edges, the assigned
//! delivery agent drives the final hand-off, and nothing else moves an order.

use super::errors::{GuardError, GuardResult};
use super::states::OrderState;
use crate::models::{Actor, Order, UserRole};

/// The attempted transition, as presented by a caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionRequest {
    pub actor: Actor,
    pub target: OrderState,
}

/// Trait for implementing state transition guards.
pub trait TransitionGuard {
    /// Check whether the transition is allowed.
    fn check(&self, order: &Order, request: &TransitionRequest) -> GuardResult<()>;

    /// Get a description of this guard for logging.
    fn description(&self) -> &'static str;
}

/// The role authorized to drive a specific edge, if the edge exists at all.
pub fn authorized_role(from: OrderState, to: OrderState) -> Option<UserRole> {
    use OrderState::*;
    match (from, to) {
        (Pending, Accepted) | (Accepted, Preparing) | (Preparing, OutForDelivery) => {
            Some(UserRole::Restaurant)
        }
        (OutForDelivery, Delivered) => Some(UserRole::Delivery),
        _ => None,
    }
}

/// The target must be the immediate successor of the current state: no
/// skipping forward, no moving backward.
pub struct SequentialAdvanceGuard;

impl TransitionGuard for SequentialAdvanceGuard {
    fn check(&self, order: &Order, request: &TransitionRequest) -> GuardResult<()> {
        if order.status.successor() == Some(request.target) {
            Ok(())
        } else {
            Err(GuardError::InvalidTransition {
                current: order.status,
                attempted: request.target,
            })
        }
    }

    fn description(&self) -> &'static str {
        "Target state must be the immediate successor"
    }
}

/// The acting role must match the role authorized for the attempted edge.
pub struct EdgeRoleGuard;

impl TransitionGuard for EdgeRoleGuard {
    fn check(&self, order: &Order, request: &TransitionRequest) -> GuardResult<()> {
        match authorized_role(order.status, request.target) {
            Some(role) if role == request.actor.role => Ok(()),
            Some(role) => Err(GuardError::NotAuthorized(format!(
                "edge '{}' -> '{}' requires role '{role}', got '{}'",
                order.status, request.target, request.actor.role
            ))),
            // No such edge; SequentialAdvanceGuard reports this with both
            // states attached.
            None => Err(GuardError::InvalidTransition {
                current: order.status,
                attempted: request.target,
            }),
        }
    }

    fn description(&self) -> &'static str {
        "Acting role must be authorized for the edge"
    }
}

/// The final hand-off may only be performed by the agent assigned to the
/// order.
pub struct AssignedAgentGuard;

impl TransitionGuard for AssignedAgentGuard {
    fn check(&self, order: &Order, request: &TransitionRequest) -> GuardResult<()> {
        if request.target != OrderState::Delivered {
            return Ok(());
        }

        match order.delivery_agent_id {
            Some(agent_id) if agent_id == request.actor.user_id => Ok(()),
            Some(_) => Err(GuardError::NotAuthorized(format!(
                "order {} is assigned to a different agent",
                order.order_id
            ))),
            None => Err(GuardError::NotAuthorized(format!(
                "order {} has no assigned delivery agent",
                order.order_id
            ))),
        }
    }

    fn description(&self) -> &'static str {
        "Delivery completion requires the assigned agent"
    }
}
