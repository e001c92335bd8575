//! Bounded-timeout decorator for the storage collaborator.
//!
//! No operation in the core blocks on human-timescale I/O except persistence
//! calls; this wrapper bounds each of them and surfaces an elapsed deadline
//! as the retryable [`StoreError::Unavailable`] instead of a hang.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::{OrderStore, StoreError, StoreResult};
use crate::models::{Cart, Order, Restaurant, User, UserRole};
use crate::state_machine::OrderState;

pub struct TimeoutStore {
    inner: Arc<dyn OrderStore>,
    timeout: Duration,
}

impl TimeoutStore {
    pub fn new(inner: Arc<dyn OrderStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    operation = operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Storage call exceeded its deadline"
                );
                Err(StoreError::Unavailable(format!(
                    "{operation} timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[async_trait]
impl OrderStore for TimeoutStore {
    async fn find_order(&self, order_id: Uuid) -> StoreResult<Option<Order>> {
        self.bounded("find_order", self.inner.find_order(order_id))
            .await
    }

    async fn insert_order(&self, order: Order) -> StoreResult<Order> {
        self.bounded("insert_order", self.inner.insert_order(order))
            .await
    }

    async fn save_order(&self, order: Order) -> StoreResult<Order> {
        self.bounded("save_order", self.inner.save_order(order))
            .await
    }

    async fn find_user(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        self.bounded("find_user", self.inner.find_user(user_id))
            .await
    }

    async fn find_users_by_role(&self, role: UserRole) -> StoreResult<Vec<User>> {
        self.bounded("find_users_by_role", self.inner.find_users_by_role(role))
            .await
    }

    async fn find_restaurant(&self, restaurant_id: Uuid) -> StoreResult<Option<Restaurant>> {
        self.bounded(
            "find_restaurant",
            self.inner.find_restaurant(restaurant_id),
        )
        .await
    }

    async fn save_restaurant(&self, restaurant: Restaurant) -> StoreResult<Restaurant> {
        self.bounded("save_restaurant", self.inner.save_restaurant(restaurant))
            .await
    }

    async fn find_cart(&self, customer_id: Uuid) -> StoreResult<Option<Cart>> {
        self.bounded("find_cart", self.inner.find_cart(customer_id))
            .await
    }

    async fn save_cart(&self, cart: Cart) -> StoreResult<Cart> {
        self.bounded("save_cart", self.inner.save_cart(cart)).await
    }

    async fn find_orders_by_agent_and_status(
        &self,
        agent_id: Uuid,
        status: OrderState,
    ) -> StoreResult<Vec<Order>> {
        self.bounded(
            "find_orders_by_agent_and_status",
            self.inner.find_orders_by_agent_and_status(agent_id, status),
        )
        .await
    }

    async fn find_delivered_rated_orders_by_restaurant(
        &self,
        restaurant_id: Uuid,
    ) -> StoreResult<Vec<Order>> {
        self.bounded(
            "find_delivered_rated_orders_by_restaurant",
            self.inner
                .find_delivered_rated_orders_by_restaurant(restaurant_id),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;

    struct StalledStore;

    #[async_trait]
    impl OrderStore for StalledStore {
        async fn find_order(&self, _order_id: Uuid) -> StoreResult<Option<Order>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }

        async fn insert_order(&self, order: Order) -> StoreResult<Order> {
            Ok(order)
        }

        async fn save_order(&self, order: Order) -> StoreResult<Order> {
            Ok(order)
        }

        async fn find_user(&self, _user_id: Uuid) -> StoreResult<Option<User>> {
            Ok(None)
        }

        async fn find_users_by_role(&self, _role: UserRole) -> StoreResult<Vec<User>> {
            Ok(Vec::new())
        }

        async fn find_restaurant(&self, _restaurant_id: Uuid) -> StoreResult<Option<Restaurant>> {
            Ok(None)
        }

        async fn save_restaurant(&self, restaurant: Restaurant) -> StoreResult<Restaurant> {
            Ok(restaurant)
        }

        async fn find_cart(&self, _customer_id: Uuid) -> StoreResult<Option<Cart>> {
            Ok(None)
        }

        async fn save_cart(&self, cart: Cart) -> StoreResult<Cart> {
            Ok(cart)
        }

        async fn find_orders_by_agent_and_status(
            &self,
            _agent_id: Uuid,
            _status: OrderState,
        ) -> StoreResult<Vec<Order>> {
            Ok(Vec::new())
        }

        async fn find_delivered_rated_orders_by_restaurant(
            &self,
            _restaurant_id: Uuid,
        ) -> StoreResult<Vec<Order>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_call_becomes_unavailable() {
        let store = TimeoutStore::new(Arc::new(StalledStore), Duration::from_millis(50));
        let err = store.find_order(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_fast_call_passes_through() {
        let store = TimeoutStore::new(Arc::new(InMemoryStore::new()), Duration::from_secs(1));
        assert_eq!(store.find_order(Uuid::new_v4()).await.unwrap(), None);
    }
}
