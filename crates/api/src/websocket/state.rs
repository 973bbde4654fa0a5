//! Global WebSocket state management
//!
//! Maintains all live connections, the room multicast groups, and the
//! session registry they act on.

use std::collections::HashMap;
use std::sync::Arc;

use planning_poker_shared::{ConnectionId, SessionRegistry};
use tokio::sync::{Mutex, RwLock};

use super::connection::Connection;
use super::room::RoomManager;

/// Global WebSocket state shared across all connections
#[derive(Clone)]
pub struct WebSocketState {
    /// All active connections indexed by connection_id
    pub connections: Arc<RwLock<HashMap<ConnectionId, Arc<Connection>>>>,

    /// Room multicast groups
    pub rooms: Arc<RoomManager>,

    /// Users and rooms. Handlers hold this lock from their first lookup
    /// through their last broadcast, so events are applied one at a time.
    pub registry: Arc<Mutex<SessionRegistry>>,
}

impl WebSocketState {
    /// Create new WebSocket state around a registry
    pub fn new(registry: SessionRegistry) -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            rooms: Arc::new(RoomManager::new()),
            registry: Arc::new(Mutex::new(registry)),
        }
    }

    /// Add a connection
    pub async fn add_connection(&self, conn: Connection) -> Arc<Connection> {
        let conn = Arc::new(conn);
        let mut connections = self.connections.write().await;
        connections.insert(conn.connection_id, Arc::clone(&conn));

        tracing::info!(
            connection_id = %conn.connection_id,
            total_connections = connections.len(),
            "WebSocket connection added"
        );

        conn
    }

    /// Remove a connection
    pub async fn remove_connection(&self, connection_id: &ConnectionId) {
        let mut connections = self.connections.write().await;
        if connections.remove(connection_id).is_some() {
            tracing::info!(
                connection_id = %connection_id,
                remaining_connections = connections.len(),
                "WebSocket connection removed"
            );
        }
    }

    /// Get a connection by ID
    pub async fn get_connection(&self, connection_id: &ConnectionId) -> Option<Arc<Connection>> {
        let connections = self.connections.read().await;
        connections.get(connection_id).cloned()
    }

    /// Get total number of active connections
    pub async fn connection_count(&self) -> usize {
        let connections = self.connections.read().await;
        connections.len()
    }

    /// Get statistics about the WebSocket state
    pub async fn get_stats(&self) -> WebSocketStats {
        let registry = self.registry.lock().await.stats();
        let connection_count = self.connection_count().await;

        WebSocketStats {
            active_connections: connection_count,
            active_rooms: registry.rooms,
            active_users: registry.users,
        }
    }
}

impl Default for WebSocketState {
    fn default() -> Self {
        Self::new(SessionRegistry::default())
    }
}

/// Statistics about WebSocket connections
#[derive(Debug, Clone)]
pub struct WebSocketStats {
    /// Number of active connections
    pub active_connections: usize,
    /// Number of live rooms
    pub active_rooms: usize,
    /// Number of users registered in a room
    pub active_users: usize,
}
