//! # Room Registry
//!
//! Process-wide, in-memory mapping of order identifiers to the live
//! connections that declared interest in them. Membership is created on
//! join, removed on disconnect, never persisted: clients re-join on
//! reconnect, and the registry is rebuilt from scratch on process restart.
//!
//! Delivery is at-most-once, fire-and-forget: a member whose receiver is
//! gone at publish time receives nothing canned and is pruned. Because only
//! the dispatch coordinator publishes for a given order, and each member has
//! its own FIFO channel, room members observe one order's events in publish
//! order.

use std::collections::HashSet;

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::RoomEvent;
use crate::logging::log_fanout_operation;

pub type ConnectionId = Uuid;

pub struct RoomRegistry {
    /// Order id -> member connection ids.
    rooms: DashMap<Uuid, HashSet<ConnectionId>>,
    /// Connection id -> live sender.
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<RoomEvent>>,
    /// Connection id -> rooms joined, for disconnect cleanup.
    memberships: DashMap<ConnectionId, HashSet<Uuid>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            connections: DashMap::new(),
            memberships: DashMap::new(),
        }
    }

    /// Register a live connection and hand back its event receiver.
    pub fn register_connection(&self) -> (ConnectionId, mpsc::UnboundedReceiver<RoomEvent>) {
        let connection_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.insert(connection_id, tx);
        self.memberships.insert(connection_id, HashSet::new());
        tracing::debug!(connection_id = %connection_id, "Connection registered");
        (connection_id, rx)
    }

    /// Declare interest in an order's updates. Idempotent: joining the same
    /// room twice leaves a single membership.
    pub fn join(&self, connection_id: ConnectionId, order_id: Uuid) {
        if !self.connections.contains_key(&connection_id) {
            tracing::warn!(
                connection_id = %connection_id,
                order_id = %order_id,
                "Join from unknown connection ignored"
            );
            return;
        }

        self.rooms
            .entry(order_id)
            .or_default()
            .insert(connection_id);
        self.memberships
            .entry(connection_id)
            .or_default()
            .insert(order_id);

        tracing::debug!(
            connection_id = %connection_id,
            order_id = %order_id,
            "Connection joined order room"
        );
    }

    /// Remove a connection from every room it belonged to.
    pub fn disconnect(&self, connection_id: ConnectionId) {
        self.connections.remove(&connection_id);

        if let Some((_, joined)) = self.memberships.remove(&connection_id) {
            for order_id in joined {
                if let Some(mut members) = self.rooms.get_mut(&order_id) {
                    members.remove(&connection_id);
                }
            }
        }

        // Drop emptied rooms.
        self.rooms.retain(|_, members| !members.is_empty());

        tracing::debug!(connection_id = %connection_id, "Connection disconnected");
    }

    /// Deliver `event` to every live member of the room for `order_id`.
    ///
    /// Returns the number of members reached. An empty or missing room is a
    /// no-op, never an error. Members whose receiver has been dropped are
    /// pruned as they are encountered.
    pub fn publish(&self, order_id: Uuid, event: &RoomEvent) -> usize {
        let members: Vec<ConnectionId> = match self.rooms.get(&order_id) {
            Some(members) => members.iter().copied().collect(),
            None => Vec::new(),
        };

        let mut delivered = 0;
        let mut dead = Vec::new();

        for connection_id in members {
            match self.connections.get(&connection_id) {
                Some(sender) if sender.send(event.clone()).is_ok() => delivered += 1,
                _ => dead.push(connection_id),
            }
        }

        for connection_id in dead {
            self.disconnect(connection_id);
        }

        log_fanout_operation("publish_room", Some(order_id), delivered, None);
        delivered
    }

    /// Number of live members in an order's room.
    pub fn room_size(&self, order_id: Uuid) -> usize {
        self.rooms
            .get(&order_id)
            .map(|members| members.len())
            .unwrap_or(0)
    }

    /// Number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
