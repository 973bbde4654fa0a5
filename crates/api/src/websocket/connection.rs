//! WebSocket connection management
//!
//! Represents an active WebSocket connection and the room it is subscribed to.

use std::sync::Arc;

use planning_poker_shared::{ConnectionId, RoomCode};
use tokio::sync::{mpsc, RwLock};

use super::events::ServerEvent;

/// Represents an active WebSocket connection
#[derive(Debug)]
pub struct Connection {
    /// Unique ID for this connection
    pub connection_id: ConnectionId,

    /// Channel to send events to this connection
    pub sender: mpsc::UnboundedSender<ServerEvent>,

    /// Room multicast group this connection has joined, if any
    pub room: Arc<RwLock<Option<RoomCode>>>,
}

impl Connection {
    /// Create a new connection
    pub fn new(sender: mpsc::UnboundedSender<ServerEvent>) -> Self {
        Self {
            connection_id: ConnectionId::new(),
            sender,
            room: Arc::new(RwLock::new(None)),
        }
    }

    /// Send an event to this connection
    ///
    /// Returns Ok(()) if sent successfully, Err if connection is closed
    #[allow(clippy::result_large_err)] // Error type is from tokio mpsc, containing the failed event
    pub fn send(&self, event: ServerEvent) -> Result<(), mpsc::error::SendError<ServerEvent>> {
        self.sender.send(event)
    }

    /// Record the room this connection subscribed to
    pub async fn subscribe(&self, room_code: RoomCode) {
        let mut room = self.room.write().await;
        tracing::debug!(
            connection_id = %self.connection_id,
            room_code = %room_code,
            "Subscribed to room"
        );
        *room = Some(room_code);
    }

    /// Clear the room subscription, returning the previous room
    pub async fn unsubscribe(&self) -> Option<RoomCode> {
        let mut room = self.room.write().await;
        room.take()
    }

    /// Room this connection is subscribed to
    pub async fn current_room(&self) -> Option<RoomCode> {
        self.room.read().await.clone()
    }
}
