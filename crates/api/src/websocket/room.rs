//! Room multicast groups
//!
//! Tracks which connections are subscribed to each room code and fans
//! events out to them. Delivery is fire-and-forget.

use std::collections::HashMap;
use std::sync::Arc;

use planning_poker_shared::{ConnectionId, RoomCode};
use tokio::sync::RwLock;

use super::connection::Connection;
use super::events::ServerEvent;

/// Manages room multicast groups for broadcasting events
pub struct RoomManager {
    /// Map of room_code -> subscribed connections
    rooms: Arc<RwLock<HashMap<RoomCode, Vec<Arc<Connection>>>>>,
}

impl RoomManager {
    /// Create a new room manager
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Add a connection to a room group
    pub async fn join(&self, room_code: &RoomCode, conn: Arc<Connection>) {
        let mut rooms = self.rooms.write().await;
        let conns = rooms.entry(room_code.clone()).or_default();
        if !conns.iter().any(|c| c.connection_id == conn.connection_id) {
            conns.push(Arc::clone(&conn));
        }

        tracing::debug!(
            room_code = %room_code,
            connection_id = %conn.connection_id,
            group_size = conns.len(),
            "Connection joined room group"
        );
    }

    /// Remove a connection from a room group
    pub async fn leave(&self, room_code: &RoomCode, connection_id: &ConnectionId) {
        let mut rooms = self.rooms.write().await;
        if let Some(conns) = rooms.get_mut(room_code) {
            conns.retain(|c| c.connection_id != *connection_id);

            // Clean up empty groups
            if conns.is_empty() {
                rooms.remove(room_code);
                tracing::debug!(room_code = %room_code, "Removed empty room group");
            } else {
                tracing::debug!(
                    room_code = %room_code,
                    connection_id = %connection_id,
                    group_size = conns.len(),
                    "Connection left room group"
                );
            }
        }
    }

    /// Broadcast an event to every connection in a room, sender included
    ///
    /// Silently ignores send errors (closed connections will be cleaned up)
    pub async fn broadcast(&self, room_code: &RoomCode, event: ServerEvent) {
        let rooms = self.rooms.read().await;
        let Some(conns) = rooms.get(room_code) else {
            tracing::debug!(
                room_code = %room_code,
                event = event.name(),
                "No subscribers for room"
            );
            return;
        };

        let mut success_count = 0;
        let mut failed_count = 0;

        for conn in conns {
            match conn.send(event.clone()) {
                Ok(()) => success_count += 1,
                Err(_) => {
                    failed_count += 1;
                    tracing::warn!(
                        connection_id = %conn.connection_id,
                        "Failed to send event to connection (likely closed)"
                    );
                }
            }
        }

        tracing::debug!(
            room_code = %room_code,
            event = event.name(),
            recipients = success_count,
            failed = failed_count,
            "Broadcast event to room"
        );
    }

    /// Get group size (number of connections) for a room
    pub async fn get_room_size(&self, room_code: &RoomCode) -> usize {
        let rooms = self.rooms.read().await;
        rooms.get(room_code).map(|v| v.len()).unwrap_or(0)
    }

    /// Get total number of active room groups
    pub async fn get_room_count(&self) -> usize {
        let rooms = self.rooms.read().await;
        rooms.len()
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new()
    }
}
