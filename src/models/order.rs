//! # Order Model
//!
//! The central entity of the dispatch engine. An order is a customer's
//! confirmed purchase from one restaurant, carrying a lifecycle status and a
//! payment status. Orders are never physically deleted; a delivered order is
//! retained as history and becomes eligible for exactly one rating.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state_machine::OrderState;

/// Payment lifecycle is a flag, not a state machine: a failed payment is
/// terminal for the payment, never a rollback of the order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// A single ordered line item. The unit price is captured at cart-add time
/// and carried through placement unchanged, so historical orders keep the
/// price the customer actually saw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub menu_item_id: Uuid,
    pub quantity: u32,
    pub unit_price: f64,
}

/// Rating attached to a delivered order, at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub restaurant_rating: u8,
    pub delivery_rating: Option<u8>,
    pub feedback: Option<String>,
    pub rated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub items: Vec<OrderItem>,
    /// Computed at placement from captured prices; immutable afterwards.
    pub total_price: f64,
    pub status: OrderState,
    pub payment_status: PaymentStatus,
    pub delivery_agent_id: Option<Uuid>,
    pub estimated_delivery_at: Option<DateTime<Utc>>,
    pub rating: Option<Rating>,
    pub created_at: DateTime<Utc>,
    /// Optimistic-concurrency token managed by the storage collaborator.
    #[serde(default)]
    pub version: u64,
}

impl Order {
    /// Create a new pending order. Total price and item validation happen in
    /// the placement operation; this only assembles the record.
    pub fn new(
        customer_id: Uuid,
        restaurant_id: Uuid,
        items: Vec<OrderItem>,
        total_price: f64,
    ) -> Self {
        Self {
            order_id: Uuid::new_v4(),
            customer_id,
            restaurant_id,
            items,
            total_price,
            status: OrderState::default(),
            payment_status: PaymentStatus::default(),
            delivery_agent_id: None,
            estimated_delivery_at: None,
            rating: None,
            created_at: Utc::now(),
            version: 0,
        }
    }

    /// Rating eligibility: delivered and not yet rated.
    pub fn can_be_rated(&self) -> bool {
        self.status == OrderState::Delivered && self.rating.is_none()
    }

    pub fn is_assigned(&self) -> bool {
        self.delivery_agent_id.is_some()
    }
}
