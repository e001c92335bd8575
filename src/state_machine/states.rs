use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle states.
///
/// Transitions are monotonic along the defined sequence: each state has at
/// most one successor and there is no path backward. There is deliberately
/// no `cancelled` state and no rejection path; a failed payment is a
/// payment-status flag, not a lifecycle rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderState {
    /// Initial state when the order is placed
    Pending,
    /// Restaurant has accepted the order
    Accepted,
    /// Food is being prepared
    Preparing,
    /// Handed to a delivery agent, en route
    OutForDelivery,
    /// Terminal state
    Delivered,
}

impl OrderState {
    /// The immediate successor in the lifecycle sequence, if any.
    pub fn successor(&self) -> Option<OrderState> {
        match self {
            Self::Pending => Some(Self::Accepted),
            Self::Accepted => Some(Self::Preparing),
            Self::Preparing => Some(Self::OutForDelivery),
            Self::OutForDelivery => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }

    /// Check if this is the terminal state (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Check if the order has been handed to a delivery agent.
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::OutForDelivery)
    }

    /// Position in the lifecycle sequence, for monotonicity checks.
    pub fn ordinal(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Accepted => 1,
            Self::Preparing => 2,
            Self::OutForDelivery => 3,
            Self::Delivered => 4,
        }
    }
}

impl Default for OrderState {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Preparing => write!(f, "preparing"),
            Self::OutForDelivery => write!(f, "out-for-delivery"),
            Self::Delivered => write!(f, "delivered"),
        }
    }
}

impl std::str::FromStr for OrderState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "preparing" => Ok(Self::Preparing),
            "out-for-delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            _ => Err(format!("Invalid order state: {s}")),
        }
    }
}
