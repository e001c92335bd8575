//! In-memory [`OrderStore`] implementation.
//!
//! Backs tests and single-process deployments. The per-map write lock plus
//! the version check on [`OrderStore::save_order`] gives the same
//! single-document atomicity guarantee the engine assumes of a real store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{OrderStore, StoreError, StoreResult};
use crate::models::{Cart, Order, Restaurant, User, UserRole};
use crate::state_machine::OrderState;

#[derive(Default)]
pub struct InMemoryStore {
    orders: RwLock<HashMap<Uuid, Order>>,
    users: RwLock<HashMap<Uuid, User>>,
    restaurants: RwLock<HashMap<Uuid, Restaurant>>,
    carts: RwLock<HashMap<Uuid, Cart>>,
    /// Placement order of order ids, so agent queries return oldest first.
    order_sequence: RwLock<Vec<Uuid>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user record (test and bootstrap helper).
    pub fn seed_user(&self, user: User) {
        self.users.write().insert(user.user_id, user);
    }

    /// Seed a restaurant record (test and bootstrap helper).
    pub fn seed_restaurant(&self, restaurant: Restaurant) {
        self.restaurants
            .write()
            .insert(restaurant.restaurant_id, restaurant);
    }

    /// Seed a cart record (test and bootstrap helper).
    pub fn seed_cart(&self, cart: Cart) {
        self.carts.write().insert(cart.customer_id, cart);
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn find_order(&self, order_id: Uuid) -> StoreResult<Option<Order>> {
        Ok(self.orders.read().get(&order_id).cloned())
    }

    async fn insert_order(&self, mut order: Order) -> StoreResult<Order> {
        order.version = 1;
        self.orders.write().insert(order.order_id, order.clone());
        self.order_sequence.write().push(order.order_id);
        Ok(order)
    }

    async fn save_order(&self, mut order: Order) -> StoreResult<Order> {
        let mut orders = self.orders.write();
        let stored = orders
            .get(&order.order_id)
            .ok_or(StoreError::MissingRecord {
                kind: "order",
                id: order.order_id,
            })?;

        if stored.version != order.version {
            return Err(StoreError::VersionConflict {
                order_id: order.order_id,
            });
        }

        order.version += 1;
        orders.insert(order.order_id, order.clone());
        Ok(order)
    }

    async fn find_user(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().get(&user_id).cloned())
    }

    async fn find_users_by_role(&self, role: UserRole) -> StoreResult<Vec<User>> {
        Ok(self
            .users
            .read()
            .values()
            .filter(|user| user.role == role)
            .cloned()
            .collect())
    }

    async fn find_restaurant(&self, restaurant_id: Uuid) -> StoreResult<Option<Restaurant>> {
        Ok(self.restaurants.read().get(&restaurant_id).cloned())
    }

    async fn save_restaurant(&self, restaurant: Restaurant) -> StoreResult<Restaurant> {
        self.restaurants
            .write()
            .insert(restaurant.restaurant_id, restaurant.clone());
        Ok(restaurant)
    }

    async fn find_cart(&self, customer_id: Uuid) -> StoreResult<Option<Cart>> {
        Ok(self.carts.read().get(&customer_id).cloned())
    }

    async fn save_cart(&self, cart: Cart) -> StoreResult<Cart> {
        self.carts.write().insert(cart.customer_id, cart.clone());
        Ok(cart)
    }

    async fn find_orders_by_agent_and_status(
        &self,
        agent_id: Uuid,
        status: OrderState,
    ) -> StoreResult<Vec<Order>> {
        let orders = self.orders.read();
        let sequence = self.order_sequence.read();
        Ok(sequence
            .iter()
            .filter_map(|id| orders.get(id))
            .filter(|order| order.delivery_agent_id == Some(agent_id) && order.status == status)
            .cloned()
            .collect())
    }

    async fn find_delivered_rated_orders_by_restaurant(
        &self,
        restaurant_id: Uuid,
    ) -> StoreResult<Vec<Order>> {
        let orders = self.orders.read();
        let sequence = self.order_sequence.read();
        Ok(sequence
            .iter()
            .filter_map(|id| orders.get(id))
            .filter(|order| {
                order.restaurant_id == restaurant_id
                    && order.status == OrderState::Delivered
                    && order.rating.is_some()
            })
            .cloned()
            .collect())
    }
}
