//! Restaurant rating recomputation.
//!
//! An explicit, idempotent second step invoked after a rating write, not a
//! hidden side effect of the write itself: it re-derives the running average
//! from the full set of delivered+rated orders, so replaying it after a
//! partial failure converges to the same value.

use uuid::Uuid;

use crate::error::Result;
use crate::storage::OrderStore;

/// Recompute a restaurant's running average rating as the arithmetic mean of
/// `restaurant_rating` across all delivered+rated orders, rounded to one
/// decimal place. Returns the stored value, or `None` when there is nothing
/// to average (the restaurant record is left untouched).
pub async fn recompute_restaurant_rating(
    store: &dyn OrderStore,
    restaurant_id: Uuid,
) -> Result<Option<f64>> {
    let rated_orders = store
        .find_delivered_rated_orders_by_restaurant(restaurant_id)
        .await?;

    if rated_orders.is_empty() {
        return Ok(None);
    }

    let total: u32 = rated_orders
        .iter()
        .filter_map(|order| order.rating.as_ref())
        .map(|rating| u32::from(rating.restaurant_rating))
        .sum();
    let average = f64::from(total) / rated_orders.len() as f64;
    let rounded = (average * 10.0).round() / 10.0;

    let Some(mut restaurant) = store.find_restaurant(restaurant_id).await? else {
        tracing::warn!(
            restaurant_id = %restaurant_id,
            "Rated orders reference a missing restaurant; skipping recompute"
        );
        return Ok(None);
    };

    restaurant.rating = Some(rounded);
    store.save_restaurant(restaurant).await?;

    tracing::info!(
        restaurant_id = %restaurant_id,
        rating = rounded,
        rated_orders = rated_orders.len(),
        "Restaurant rating recomputed"
    );

    Ok(Some(rounded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Order, OrderItem, Rating, Restaurant};
    use crate::state_machine::OrderState;
    use crate::storage::InMemoryStore;
    use chrono::Utc;

    async fn delivered_rated_order(
        store: &InMemoryStore,
        restaurant_id: Uuid,
        restaurant_rating: u8,
    ) {
        let mut order = Order::new(
            Uuid::new_v4(),
            restaurant_id,
            vec![OrderItem {
                menu_item_id: Uuid::new_v4(),
                quantity: 1,
                unit_price: 10.0,
            }],
            10.0,
        );
        order.status = OrderState::Delivered;
        order.rating = Some(Rating {
            restaurant_rating,
            delivery_rating: None,
            feedback: None,
            rated_at: Utc::now(),
        });
        store.insert_order(order).await.unwrap();
    }

    fn restaurant(restaurant_id: Uuid) -> Restaurant {
        Restaurant {
            restaurant_id,
            user_id: Uuid::new_v4(),
            name: "Test Kitchen".to_string(),
            address: None,
            location: None,
            rating: None,
        }
    }

    #[tokio::test]
    async fn test_mean_rounded_to_one_decimal() {
        let store = InMemoryStore::new();
        let restaurant_id = Uuid::new_v4();
        store.seed_restaurant(restaurant(restaurant_id));

        for rating in [5, 4, 3] {
            delivered_rated_order(&store, restaurant_id, rating).await;
        }

        let stored = recompute_restaurant_rating(&store, restaurant_id)
            .await
            .unwrap();
        assert_eq!(stored, Some(4.0));

        let saved = store.find_restaurant(restaurant_id).await.unwrap().unwrap();
        assert_eq!(saved.rating, Some(4.0));
    }

    #[tokio::test]
    async fn test_rounding() {
        let store = InMemoryStore::new();
        let restaurant_id = Uuid::new_v4();
        store.seed_restaurant(restaurant(restaurant_id));

        // 5 and 4 average to 4.5; 5, 5, 4 average to 4.666... -> 4.7.
        for rating in [5, 5, 4] {
            delivered_rated_order(&store, restaurant_id, rating).await;
        }

        let stored = recompute_restaurant_rating(&store, restaurant_id)
            .await
            .unwrap();
        assert_eq!(stored, Some(4.7));
    }

    #[tokio::test]
    async fn test_no_rated_orders_leaves_restaurant_untouched() {
        let store = InMemoryStore::new();
        let restaurant_id = Uuid::new_v4();
        store.seed_restaurant(restaurant(restaurant_id));

        let stored = recompute_restaurant_rating(&store, restaurant_id)
            .await
            .unwrap();
        assert_eq!(stored, None);

        let saved = store.find_restaurant(restaurant_id).await.unwrap().unwrap();
        assert_eq!(saved.rating, None);
    }

    #[tokio::test]
    async fn test_idempotent() {
        let store = InMemoryStore::new();
        let restaurant_id = Uuid::new_v4();
        store.seed_restaurant(restaurant(restaurant_id));
        delivered_rated_order(&store, restaurant_id, 4).await;

        let first = recompute_restaurant_rating(&store, restaurant_id)
            .await
            .unwrap();
        let second = recompute_restaurant_rating(&store, restaurant_id)
            .await
            .unwrap();
        assert_eq!(first, second);
    }
}
