//! # Event Fanout
//!
//! Real-time notification of order changes over two deliberately redundant
//! paths: a per-order room channel ([`rooms::RoomRegistry`]) for connections
//! that declared interest, and a global broadcast channel
//! ([`publisher::EventPublisher`]) filtered client-side by customer identity,
//! so a client that never re-joined its room after a reconnect still hears
//! about its orders. A consumer may observe the broadcast event before or
//! after the room event; within one order's room, events arrive in publish
//! order.

pub mod publisher;
pub mod rooms;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Order;
use crate::state_machine::OrderState;

pub use publisher::{BroadcastEnvelope, EventPublisher, PublishError};
pub use rooms::{ConnectionId, RoomRegistry};

/// Room-scoped events delivered to connections that joined an order's room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    OrderStatusChanged {
        order_id: Uuid,
        status: OrderState,
        order: Order,
    },
    DeliveryAgentAssigned {
        order_id: Uuid,
        agent_id: Uuid,
        order: Order,
    },
}

impl RoomEvent {
    pub fn status_changed(order: Order) -> Self {
        Self::OrderStatusChanged {
            order_id: order.order_id,
            status: order.status,
            order,
        }
    }

    pub fn agent_assigned(order: Order, agent_id: Uuid) -> Self {
        Self::DeliveryAgentAssigned {
            order_id: order.order_id,
            agent_id,
            order,
        }
    }

    pub fn order_id(&self) -> Uuid {
        match self {
            Self::OrderStatusChanged { order_id, .. }
            | Self::DeliveryAgentAssigned { order_id, .. } => *order_id,
        }
    }
}

/// Broadcast-scoped variant of a status change, carrying the owning
/// customer's identifier so non-joined clients can self-filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdateBroadcast {
    pub customer_id: Uuid,
    pub order_id: Uuid,
    pub status: OrderState,
    pub restaurant_name: Option<String>,
}
