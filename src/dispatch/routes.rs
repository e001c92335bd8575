//! Agent route planning.
//!
//! Loads the agent's outstanding `out-for-delivery` orders, resolves display
//! and coordinate data for each drop-off, and hands the set to the
//! nearest-neighbor optimizer. Read-only and side-effect-free: the plan is a
//! snapshot that may be stale by the time the agent acts on it, which needs
//! no coordination with concurrent transitions.

use uuid::Uuid;

use crate::config::CourierConfig;
use crate::error::Result;
use crate::routing::{build_plan, DropOff, RoutePlan};
use crate::state_machine::OrderState;
use crate::storage::OrderStore;

/// Build the optimized route for an agent's current drop-offs.
///
/// Zero outstanding orders yields the explicit empty plan, not an error. The
/// start point is the first order's restaurant location; customers or
/// restaurants without a location on record fall back to the configured
/// default.
pub async fn plan_agent_route(
    store: &dyn OrderStore,
    config: &CourierConfig,
    agent_id: Uuid,
) -> Result<RoutePlan> {
    let orders = store
        .find_orders_by_agent_and_status(agent_id, OrderState::OutForDelivery)
        .await?;

    if orders.is_empty() {
        return Ok(RoutePlan::empty(config.default_location));
    }

    let start = match store.find_restaurant(orders[0].restaurant_id).await? {
        Some(restaurant) => restaurant.location.unwrap_or(config.default_location),
        None => config.default_location,
    };

    let mut drop_offs = Vec::with_capacity(orders.len());
    for order in &orders {
        let customer = store.find_user(order.customer_id).await?;
        let (customer_name, address, location) = match customer {
            Some(user) => (
                user.name,
                user.address,
                user.location.unwrap_or(config.default_location),
            ),
            None => ("Unknown".to_string(), None, config.default_location),
        };

        drop_offs.push(DropOff {
            order_id: order.order_id,
            customer_name,
            address,
            location,
            total_price: order.total_price,
        });
    }

    let plan = build_plan(start, drop_offs, config.route_speed_kmh);

    tracing::info!(
        agent_id = %agent_id,
        orders_count = plan.orders_count,
        total_distance_km = plan.total_distance_km,
        estimated_minutes = plan.estimated_minutes,
        "Agent route planned"
    );

    Ok(plan)
}
