//! # Dispatch Coordinator
//!
//! Glues the state machine, the storage collaborator, and the fanout
//! subsystem: every call that produces a persisted order-state change
//! attempts, before returning, to notify the order's room and the global
//! broadcast channel. Notification is best-effort and explicitly decoupled
//! from the transactional write — a fanout failure is logged and swallowed,
//! never rolled back into the transition.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::ratings::recompute_restaurant_rating;
use super::routes::plan_agent_route;
use crate::config::CourierConfig;
use crate::constants::{MAX_RATING, MIN_RATING};
use crate::error::{DispatchError, Result};
use crate::events::{EventPublisher, OrderUpdateBroadcast, RoomEvent, RoomRegistry};
use crate::logging::{log_error, log_order_operation};
use crate::models::{Actor, Order, OrderItem, Rating, UserRole};
use crate::routing::RoutePlan;
use crate::state_machine::{OrderState, OrderStateMachine};
use crate::storage::{OrderStore, StoreError, TimeoutStore};

/// Attempts before a read-modify-write gives up on version conflicts.
const SAVE_RETRY_ATTEMPTS: u32 = 3;

pub struct DispatchCoordinator {
    store: Arc<dyn OrderStore>,
    rooms: Arc<RoomRegistry>,
    publisher: EventPublisher,
    state_machine: OrderStateMachine,
    config: CourierConfig,
}

impl DispatchCoordinator {
    /// Build a coordinator over the given storage collaborator. Storage
    /// calls are bounded by the configured timeout so they surface as
    /// retryable errors instead of hangs.
    pub fn new(store: Arc<dyn OrderStore>, config: CourierConfig) -> Self {
        let store: Arc<dyn OrderStore> =
            Arc::new(TimeoutStore::new(store, config.storage_timeout));
        Self {
            rooms: Arc::new(RoomRegistry::new()),
            publisher: EventPublisher::new(config.event_channel_capacity),
            state_machine: OrderStateMachine::new(store.clone()),
            store,
            config,
        }
    }

    /// The room registry for connection join/disconnect handling.
    pub fn rooms(&self) -> Arc<RoomRegistry> {
        self.rooms.clone()
    }

    /// The broadcast publisher, for clients subscribing to the global
    /// customer-filterable channel.
    pub fn publisher(&self) -> &EventPublisher {
        &self.publisher
    }

    /// Convert a customer's cart into a pending order.
    ///
    /// Requires a non-empty cart whose line items all reference the same
    /// restaurant. The total is computed from the prices captured at
    /// cart-add time. Clears the cart on success.
    pub async fn place_order(&self, customer_id: Uuid) -> Result<Order> {
        let mut cart = self
            .store
            .find_cart(customer_id)
            .await?
            .ok_or(DispatchError::EmptyCart)?;

        if cart.is_empty() {
            return Err(DispatchError::EmptyCart);
        }

        let restaurant_id = cart.items[0].restaurant_id;
        if cart
            .items
            .iter()
            .any(|item| item.restaurant_id != restaurant_id)
        {
            return Err(DispatchError::Validation(
                "cart items reference more than one restaurant".to_string(),
            ));
        }
        if cart.items.iter().any(|item| item.quantity == 0) {
            return Err(DispatchError::Validation(
                "line item quantity must be at least 1".to_string(),
            ));
        }

        let total_price = cart.total_price();
        if total_price <= 0.0 {
            return Err(DispatchError::Validation(
                "order total must be positive".to_string(),
            ));
        }

        let items = cart
            .items
            .iter()
            .map(|item| OrderItem {
                menu_item_id: item.menu_item_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect();

        let order = self
            .store
            .insert_order(Order::new(customer_id, restaurant_id, items, total_price))
            .await?;

        cart.clear();
        self.store.save_cart(cart).await?;

        log_order_operation("place_order", Some(order.order_id), "pending", None);
        Ok(order)
    }

    /// Apply a lifecycle transition and fan out the change.
    pub async fn transition_order(
        &self,
        order_id: Uuid,
        actor: Actor,
        target: OrderState,
    ) -> Result<Order> {
        let order = self.state_machine.transition(order_id, actor, target).await?;
        self.fanout_status_change(&order).await;
        Ok(order)
    }

    /// Assign (or reassign) a delivery agent to an order.
    ///
    /// Restaurant or admin only; the target user must carry the `delivery`
    /// role. Lifecycle status is untouched — assignment may happen before or
    /// during preparation.
    pub async fn assign_delivery_agent(
        &self,
        order_id: Uuid,
        agent_id: Uuid,
        actor: Actor,
    ) -> Result<Order> {
        if !matches!(actor.role, UserRole::Restaurant | UserRole::Admin) {
            return Err(DispatchError::Authorization(format!(
                "role '{}' may not assign delivery agents",
                actor.role
            )));
        }

        let agent = self
            .store
            .find_user(agent_id)
            .await?
            .ok_or_else(|| DispatchError::user_not_found(agent_id))?;
        if agent.role != UserRole::Delivery {
            return Err(DispatchError::Validation(format!(
                "user {agent_id} is not a delivery agent"
            )));
        }

        let saved = self
            .update_order(order_id, |order| {
                order.delivery_agent_id = Some(agent_id);
                Ok(())
            })
            .await?;

        self.rooms
            .publish(order_id, &RoomEvent::agent_assigned(saved.clone(), agent_id));

        log_order_operation(
            "assign_agent",
            Some(order_id),
            &saved.status.to_string(),
            Some("delivery agent assigned"),
        );
        Ok(saved)
    }

    /// Record a customer's rating on a delivered order, then recompute the
    /// restaurant's running average as a separate idempotent step.
    pub async fn record_rating(
        &self,
        order_id: Uuid,
        customer_id: Uuid,
        restaurant_rating: u8,
        delivery_rating: Option<u8>,
        feedback: Option<String>,
    ) -> Result<Order> {
        validate_rating_bounds("restaurant rating", restaurant_rating)?;
        if let Some(value) = delivery_rating {
            validate_rating_bounds("delivery rating", value)?;
        }

        let saved = self
            .update_order(order_id, |order| {
                if order.customer_id != customer_id {
                    return Err(DispatchError::Authorization(
                        "only the ordering customer may rate this order".to_string(),
                    ));
                }
                if order.status != OrderState::Delivered {
                    return Err(DispatchError::Validation(
                        "only delivered orders can be rated".to_string(),
                    ));
                }
                if order.rating.is_some() {
                    return Err(DispatchError::AlreadyRated(order_id));
                }
                order.rating = Some(Rating {
                    restaurant_rating,
                    delivery_rating,
                    feedback: feedback.clone(),
                    rated_at: Utc::now(),
                });
                Ok(())
            })
            .await?;

        // The recompute is a derived-value refresh; its failure does not
        // invalidate the rating that was just persisted.
        if let Err(err) =
            recompute_restaurant_rating(self.store.as_ref(), saved.restaurant_id).await
        {
            log_error(
                "dispatch",
                "recompute_restaurant_rating",
                &err.to_string(),
                Some(&saved.restaurant_id.to_string()),
            );
        }

        Ok(saved)
    }

    /// Record an estimated delivery time from a known distance, assuming the
    /// placement-ETA speed (40 km/h by default — independent of the route
    /// optimizer's 30 km/h estimate).
    pub async fn set_estimated_delivery(&self, order_id: Uuid, distance_km: f64) -> Result<Order> {
        if !distance_km.is_finite() || distance_km < 0.0 {
            return Err(DispatchError::Validation(format!(
                "distance must be a non-negative number of kilometers, got {distance_km}"
            )));
        }

        let eta_minutes = distance_km / self.config.eta_speed_kmh * 60.0;
        let eta_at = Utc::now() + chrono::Duration::milliseconds((eta_minutes * 60_000.0) as i64);

        self.update_order(order_id, move |order| {
            order.estimated_delivery_at = Some(eta_at);
            Ok(())
        })
        .await
    }

    /// Optimized route over the agent's outstanding drop-offs. Read-only;
    /// safe to run concurrently with transitions.
    pub async fn route_for_agent(&self, agent_id: Uuid) -> Result<RoutePlan> {
        plan_agent_route(self.store.as_ref(), &self.config, agent_id).await
    }

    /// Read-modify-write with a bounded retry on version conflicts. The
    /// mutation closure re-runs against a fresh read on each attempt, so its
    /// validations always see the latest state.
    async fn update_order<F>(&self, order_id: Uuid, mutate: F) -> Result<Order>
    where
        F: Fn(&mut Order) -> Result<()>,
    {
        for _ in 0..SAVE_RETRY_ATTEMPTS {
            let mut order = self
                .store
                .find_order(order_id)
                .await?
                .ok_or_else(|| DispatchError::order_not_found(order_id))?;

            mutate(&mut order)?;

            match self.store.save_order(order).await {
                Ok(saved) => return Ok(saved),
                Err(StoreError::VersionConflict { .. }) => continue,
                Err(err) => return Err(err.into()),
            }
        }

        Err(DispatchError::StorageUnavailable(format!(
            "persistent version conflicts on order {order_id}"
        )))
    }

    /// Dual-channel fanout of a status change: the order's room, then the
    /// broadcast variant. Intentionally redundant and never deduplicated, so
    /// clients that missed the room join (reconnect race) still hear about
    /// their orders. Best-effort on both paths.
    async fn fanout_status_change(&self, order: &Order) {
        let reached = self
            .rooms
            .publish(order.order_id, &RoomEvent::status_changed(order.clone()));

        let restaurant_name = match self.store.find_restaurant(order.restaurant_id).await {
            Ok(Some(restaurant)) => Some(restaurant.name),
            Ok(None) => None,
            Err(err) => {
                log_error(
                    "dispatch",
                    "fanout_restaurant_lookup",
                    &err.to_string(),
                    Some(&order.order_id.to_string()),
                );
                None
            }
        };

        if let Err(err) = self.publisher.publish(OrderUpdateBroadcast {
            customer_id: order.customer_id,
            order_id: order.order_id,
            status: order.status,
            restaurant_name,
        }) {
            log_error(
                "dispatch",
                "broadcast_publish",
                &err.to_string(),
                Some(&order.order_id.to_string()),
            );
        }

        log_order_operation(
            "transition",
            Some(order.order_id),
            &order.status.to_string(),
            Some(&format!("room fanout reached {reached} connections")),
        );
    }
}

fn validate_rating_bounds(name: &str, value: u8) -> Result<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&value) {
        return Err(DispatchError::Validation(format!(
            "{name} must be between {MIN_RATING} and {MAX_RATING}, got {value}"
        )));
    }
    Ok(())
}
