//! End-to-end dispatch flows over the in-memory storage collaborator:
//! placement, lifecycle transitions with fanout, agent assignment, rating
//! with average recomputation, route planning, and the concurrent-transition
//! race.

use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use courier_core::config::CourierConfig;
use courier_core::dispatch::DispatchCoordinator;
use courier_core::events::RoomEvent;
use courier_core::geo::Location;
use courier_core::models::{Actor, Cart, CartItem, Order, Restaurant, User, UserRole};
use courier_core::state_machine::OrderState;
use courier_core::storage::{InMemoryStore, OrderStore};
use courier_core::DispatchError;

struct World {
    coordinator: Arc<DispatchCoordinator>,
    store: Arc<InMemoryStore>,
    customer: User,
    restaurant: Restaurant,
    restaurant_actor: Actor,
    agent: User,
    agent_actor: Actor,
}

fn world() -> World {
    let store = Arc::new(InMemoryStore::new());

    let customer = User {
        user_id: Uuid::new_v4(),
        name: "Amina".to_string(),
        email: "amina@example.com".to_string(),
        role: UserRole::Customer,
        address: Some("14 Mall Road".to_string()),
        location: Some(Location::new(31.55, 74.34)),
    };
    let owner = User {
        user_id: Uuid::new_v4(),
        name: "Owner".to_string(),
        email: "owner@example.com".to_string(),
        role: UserRole::Restaurant,
        address: None,
        location: None,
    };
    let agent = User {
        user_id: Uuid::new_v4(),
        name: "Bilal".to_string(),
        email: "bilal@example.com".to_string(),
        role: UserRole::Delivery,
        address: None,
        location: None,
    };
    let restaurant = Restaurant {
        restaurant_id: Uuid::new_v4(),
        user_id: owner.user_id,
        name: "Shalimar Grill".to_string(),
        address: Some("1 Food Street".to_string()),
        location: Some(Location::new(31.52, 74.36)),
        rating: None,
    };

    store.seed_user(customer.clone());
    store.seed_user(owner.clone());
    store.seed_user(agent.clone());
    store.seed_restaurant(restaurant.clone());

    World {
        coordinator: Arc::new(DispatchCoordinator::new(
            store.clone(),
            CourierConfig::default(),
        )),
        store,
        restaurant_actor: Actor::new(owner.user_id, UserRole::Restaurant),
        agent_actor: Actor::new(agent.user_id, UserRole::Delivery),
        customer,
        restaurant,
        agent,
    }
}

fn seed_cart(w: &World) {
    let mut cart = Cart::new(w.customer.user_id);
    cart.items.push(CartItem {
        menu_item_id: Uuid::new_v4(),
        restaurant_id: w.restaurant.restaurant_id,
        quantity: 2,
        unit_price: 8.0,
    });
    w.store.seed_cart(cart);
}

async fn place(w: &World) -> Result<Order> {
    seed_cart(w);
    Ok(w.coordinator.place_order(w.customer.user_id).await?)
}

/// Drive an order from pending to delivered through the coordinator.
async fn deliver(w: &World, order_id: Uuid) -> Result<Order> {
    w.coordinator
        .transition_order(order_id, w.restaurant_actor, OrderState::Accepted)
        .await?;
    w.coordinator
        .transition_order(order_id, w.restaurant_actor, OrderState::Preparing)
        .await?;
    w.coordinator
        .assign_delivery_agent(order_id, w.agent.user_id, w.restaurant_actor)
        .await?;
    w.coordinator
        .transition_order(order_id, w.restaurant_actor, OrderState::OutForDelivery)
        .await?;
    let delivered = w
        .coordinator
        .transition_order(order_id, w.agent_actor, OrderState::Delivered)
        .await?;
    Ok(delivered)
}

#[tokio::test]
async fn full_lifecycle_emits_room_events_in_order() -> Result<()> {
    let w = world();
    let order = place(&w).await?;

    let rooms = w.coordinator.rooms();
    let (conn, mut rx) = rooms.register_connection();
    rooms.join(conn, order.order_id);

    deliver(&w, order.order_id).await?;

    let mut statuses = Vec::new();
    let mut saw_assignment = false;
    for _ in 0..5 {
        match rx.recv().await.unwrap() {
            RoomEvent::OrderStatusChanged { status, .. } => statuses.push(status),
            RoomEvent::DeliveryAgentAssigned { agent_id, .. } => {
                assert_eq!(agent_id, w.agent.user_id);
                saw_assignment = true;
            }
        }
    }

    assert!(saw_assignment);
    assert_eq!(
        statuses,
        vec![
            OrderState::Accepted,
            OrderState::Preparing,
            OrderState::OutForDelivery,
            OrderState::Delivered,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn broadcast_channel_carries_customer_identity() -> Result<()> {
    let w = world();
    let order = place(&w).await?;

    // Never joins the room; listens on the broadcast channel only.
    let mut rx = w.coordinator.publisher().subscribe();

    w.coordinator
        .transition_order(order.order_id, w.restaurant_actor, OrderState::Accepted)
        .await?;

    let envelope = rx.recv().await?;
    assert_eq!(envelope.event.customer_id, w.customer.user_id);
    assert_eq!(envelope.event.order_id, order.order_id);
    assert_eq!(envelope.event.status, OrderState::Accepted);
    assert_eq!(
        envelope.event.restaurant_name.as_deref(),
        Some("Shalimar Grill")
    );
    Ok(())
}

#[tokio::test]
async fn transitions_without_observers_still_land() -> Result<()> {
    let w = world();
    let order = place(&w).await?;

    let delivered = deliver(&w, order.order_id).await?;
    assert_eq!(delivered.status, OrderState::Delivered);
    Ok(())
}

#[tokio::test]
async fn skipping_and_reversing_are_rejected() -> Result<()> {
    let w = world();
    let order = place(&w).await?;

    let err = w
        .coordinator
        .transition_order(order.order_id, w.restaurant_actor, OrderState::Preparing)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DispatchError::InvalidTransition {
            current: OrderState::Pending,
            attempted: OrderState::Preparing,
        }
    );

    w.coordinator
        .transition_order(order.order_id, w.restaurant_actor, OrderState::Accepted)
        .await?;
    let err = w
        .coordinator
        .transition_order(order.order_id, w.restaurant_actor, OrderState::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::InvalidTransition { .. }));
    Ok(())
}

#[tokio::test]
async fn concurrent_transitions_one_wins() -> Result<()> {
    let w = world();
    let order = place(&w).await?;

    let first = {
        let coordinator = w.coordinator.clone();
        let actor = w.restaurant_actor;
        let order_id = order.order_id;
        tokio::spawn(async move {
            coordinator
                .transition_order(order_id, actor, OrderState::Accepted)
                .await
        })
    };
    let second = {
        let coordinator = w.coordinator.clone();
        let actor = w.restaurant_actor;
        let order_id = order.order_id;
        tokio::spawn(async move {
            coordinator
                .transition_order(order_id, actor, OrderState::Accepted)
                .await
        })
    };

    let results = [first.await?, second.await?];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one transition must win");

    let loser = results.into_iter().find(|r| r.is_err()).unwrap();
    assert_eq!(
        loser.unwrap_err(),
        DispatchError::InvalidTransition {
            current: OrderState::Accepted,
            attempted: OrderState::Accepted,
        }
    );

    let stored = w.store.find_order(order.order_id).await?.unwrap();
    assert_eq!(stored.status, OrderState::Accepted);
    Ok(())
}

#[tokio::test]
async fn rating_rules_and_average_recomputation() -> Result<()> {
    let w = world();

    // Rating an undelivered order fails.
    let order = place(&w).await?;
    let err = w
        .coordinator
        .record_rating(order.order_id, w.customer.user_id, 5, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Validation(_)));

    // Deliver three orders and rate them 5, 4, 3.
    deliver(&w, order.order_id).await?;
    let second = place(&w).await?;
    deliver(&w, second.order_id).await?;
    let third = place(&w).await?;
    deliver(&w, third.order_id).await?;

    w.coordinator
        .record_rating(order.order_id, w.customer.user_id, 5, Some(5), None)
        .await?;
    w.coordinator
        .record_rating(second.order_id, w.customer.user_id, 4, None, None)
        .await?;
    w.coordinator
        .record_rating(
            third.order_id,
            w.customer.user_id,
            3,
            None,
            Some("cold fries".to_string()),
        )
        .await?;

    let stored = w
        .store
        .find_restaurant(w.restaurant.restaurant_id)
        .await?
        .unwrap();
    assert_eq!(stored.rating, Some(4.0));

    // A second rating on the same order is rejected.
    let err = w
        .coordinator
        .record_rating(order.order_id, w.customer.user_id, 1, None, None)
        .await
        .unwrap_err();
    assert_eq!(err, DispatchError::AlreadyRated(order.order_id));

    // A different customer may not rate the order.
    let stranger = Uuid::new_v4();
    let err = w
        .coordinator
        .record_rating(second.order_id, stranger, 5, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Authorization(_)));
    Ok(())
}

#[tokio::test]
async fn agent_route_covers_outstanding_drop_offs() -> Result<()> {
    let w = world();

    // Two orders out for delivery with the same agent.
    let first = place(&w).await?;
    let second = place(&w).await?;
    for order in [&first, &second] {
        w.coordinator
            .transition_order(order.order_id, w.restaurant_actor, OrderState::Accepted)
            .await?;
        w.coordinator
            .transition_order(order.order_id, w.restaurant_actor, OrderState::Preparing)
            .await?;
        w.coordinator
            .assign_delivery_agent(order.order_id, w.agent.user_id, w.restaurant_actor)
            .await?;
        w.coordinator
            .transition_order(order.order_id, w.restaurant_actor, OrderState::OutForDelivery)
            .await?;
    }

    let plan = w.coordinator.route_for_agent(w.agent.user_id).await?;
    assert_eq!(plan.orders_count, 2);
    assert_eq!(plan.start, w.restaurant.location.unwrap());
    assert!(plan.total_distance_km >= 0.0);

    // Delivering one shrinks the next snapshot.
    w.coordinator
        .transition_order(first.order_id, w.agent_actor, OrderState::Delivered)
        .await?;
    let plan = w.coordinator.route_for_agent(w.agent.user_id).await?;
    assert_eq!(plan.orders_count, 1);
    assert_eq!(plan.stops[0].order_id, second.order_id);
    Ok(())
}

#[tokio::test]
async fn agent_with_no_deliveries_gets_empty_plan() -> Result<()> {
    let w = world();
    let plan = w.coordinator.route_for_agent(w.agent.user_id).await?;
    assert!(plan.stops.is_empty());
    assert_eq!(plan.total_distance_km, 0.0);
    assert_eq!(plan.estimated_minutes, 0);
    Ok(())
}
