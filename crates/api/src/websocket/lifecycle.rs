//! Room creation, joining and disconnect cleanup

use std::sync::Arc;

use planning_poker_shared::{Departure, RoomCode, SessionResult, User};

use super::connection::Connection;
use super::events::ServerEvent;
use super::state::WebSocketState;

/// Drives registry membership from connection-level events
#[derive(Clone)]
pub struct ConnectionLifecycle {
    ws_state: WebSocketState,
}

impl ConnectionLifecycle {
    pub fn new(ws_state: WebSocketState) -> Self {
        Self { ws_state }
    }

    /// Create a room, subscribe the caller, reply `Me` and broadcast the roster
    pub async fn create_room(
        &self,
        conn: &Arc<Connection>,
        username: String,
        is_admin: bool,
    ) -> SessionResult<User> {
        let mut registry = self.ws_state.registry.lock().await;
        let user = registry.create_room(conn.connection_id, username, is_admin)?;

        self.enter_room(conn, &user).await;
        let roster = registry.roster(&user.room_code);
        self.ws_state
            .rooms
            .broadcast(&user.room_code, ServerEvent::RoomUsers(roster))
            .await;

        Ok(user)
    }

    /// Join an existing room, subscribe the caller, reply `Me` and broadcast
    /// the roster. An unknown code leaves all state untouched.
    pub async fn join_room(
        &self,
        conn: &Arc<Connection>,
        username: String,
        room_code: RoomCode,
    ) -> SessionResult<User> {
        let mut registry = self.ws_state.registry.lock().await;
        let user = registry.join_room(conn.connection_id, username, &room_code)?;

        self.enter_room(conn, &user).await;
        let roster = registry.roster(&room_code);
        self.ws_state
            .rooms
            .broadcast(&room_code, ServerEvent::RoomUsers(roster))
            .await;

        Ok(user)
    }

    /// Remove the connection's user and tell the former room who is left
    ///
    /// Safe to call for connections that never joined a room.
    pub async fn disconnect(&self, conn: &Connection) -> Option<Departure> {
        let mut registry = self.ws_state.registry.lock().await;
        let departure = registry.remove_user(&conn.connection_id);

        if let Some(room_code) = conn.unsubscribe().await {
            self.ws_state
                .rooms
                .leave(&room_code, &conn.connection_id)
                .await;
        }

        match &departure {
            Some(departure) if !departure.room_closed => {
                self.ws_state
                    .rooms
                    .broadcast(
                        &departure.user.room_code,
                        ServerEvent::RoomUsers(departure.remaining.clone()),
                    )
                    .await;
            }
            Some(departure) => {
                tracing::debug!(
                    room_code = %departure.user.room_code,
                    "Last member left, room closed"
                );
            }
            None => {}
        }

        departure
    }

    async fn enter_room(&self, conn: &Arc<Connection>, user: &User) {
        conn.subscribe(user.room_code.clone()).await;
        self.ws_state
            .rooms
            .join(&user.room_code, Arc::clone(conn))
            .await;

        if conn.send(ServerEvent::Me(user.clone())).is_err() {
            tracing::warn!(
                connection_id = %conn.connection_id,
                "Failed to send user record (connection closed)"
            );
        }
    }
}
