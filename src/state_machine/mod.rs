// State machine module for the order lifecycle.
//
// Validates and applies transitions along the fixed sequence
// pending -> accepted -> preparing -> out-for-delivery -> delivered,
// with role-based edge authorization and optimistic persistence.

pub mod errors;
pub mod guards;
pub mod order_state_machine;
pub mod states;

// Re-export main types for convenient access
pub use errors::{GuardError, StateMachineError, StateMachineResult};
pub use guards::{
    authorized_role, AssignedAgentGuard, EdgeRoleGuard, SequentialAdvanceGuard, TransitionGuard,
    TransitionRequest,
};
pub use order_state_machine::OrderStateMachine;
pub use states::OrderState;
