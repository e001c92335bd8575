use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A cart line item. `unit_price` is the menu price captured when the item
/// was added; placement uses this price, never a re-read of the current menu
/// price, so mid-cart price drift cannot change the order total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub menu_item_id: Uuid,
    pub restaurant_id: Uuid,
    pub quantity: u32,
    pub unit_price: f64,
}

/// One cart per customer. Cart accumulation arithmetic (add/remove/merge)
/// lives outside this engine; placement only reads and then clears it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub customer_id: Uuid,
    pub items: Vec<CartItem>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(customer_id: Uuid) -> Self {
        Self {
            customer_id,
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Σ(captured unit price × quantity) across line items.
    pub fn total_price(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.unit_price * f64::from(item.quantity))
            .sum()
    }

    /// Empty the cart after a successful placement.
    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = Utc::now();
    }
}
