//! WebSocket handler for Axum
//!
//! Handles WebSocket connections and routes client events to the lifecycle
//! handler and vote coordinator.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{stream::StreamExt, SinkExt};
use tokio::sync::mpsc;

use crate::state::AppState;

use super::{
    connection::Connection,
    events::{ClientEvent, ServerEvent},
    lifecycle::ConnectionLifecycle,
    state::WebSocketState,
    votes::VoteCoordinator,
};

/// WebSocket handler - upgrades HTTP connection to WebSocket
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state.ws_state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, ws_state: WebSocketState) {
    let (mut sender, mut receiver) = socket.split();

    // Create channel for sending events to this connection
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    let conn = ws_state.add_connection(Connection::new(tx)).await;
    let connection_id = conn.connection_id;

    // Spawn task to send messages to client
    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sender.send(Message::Text(json)).await.is_err() {
                        break; // Connection closed
                    }
                }
                Err(e) => {
                    tracing::error!(error = ?e, "Failed to serialize WebSocket event");
                }
            }
        }
    });

    // Handle incoming messages
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                handle_text_frame(&text, &conn, &ws_state).await;
            }
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "WebSocket close frame received");
                break;
            }
            Ok(_) => {} // Axum answers pings; binary frames are ignored
            Err(e) => {
                tracing::warn!(connection_id = %connection_id, error = ?e, "WebSocket receive error");
                break;
            }
        }
    }

    // Cleanup on disconnect
    tracing::info!(connection_id = %connection_id, "WebSocket connection closing");
    ConnectionLifecycle::new(ws_state.clone())
        .disconnect(&conn)
        .await;
    ws_state.remove_connection(&connection_id).await;

    send_task.abort();
}

/// Decode one text frame and dispatch it. Undecodable frames get an
/// `INVALID_EVENT` error and change nothing.
pub async fn handle_text_frame(text: &str, conn: &Arc<Connection>, ws_state: &WebSocketState) {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => handle_client_event(event, conn, ws_state).await,
        Err(e) => {
            tracing::warn!(
                connection_id = %conn.connection_id,
                error = %e,
                message = %text,
                "Failed to parse client event"
            );
            send_error(conn, ServerEvent::invalid_event());
        }
    }
}

/// Handle client event
pub async fn handle_client_event(
    event: ClientEvent,
    conn: &Arc<Connection>,
    ws_state: &WebSocketState,
) {
    use ClientEvent::*;

    let lifecycle = ConnectionLifecycle::new(ws_state.clone());
    let votes = VoteCoordinator::new(ws_state.clone());

    let outcome = match event {
        CreateRoom { username, is_admin } => lifecycle
            .create_room(conn, username, is_admin)
            .await
            .map(|_| ()),

        JoinRoom {
            username,
            room_code,
        } => lifecycle
            .join_room(conn, username, room_code)
            .await
            .map(|_| ()),

        ToVote { vote } => {
            votes.cast_vote(&conn.connection_id, vote).await;
            Ok(())
        }

        ShowVotes { is_visible } => {
            votes
                .request_reveal_change(&conn.connection_id, is_visible)
                .await;
            Ok(())
        }

        TryChangeVote(_) => {
            votes.request_change_vote(&conn.connection_id).await;
            Ok(())
        }

        ResetVotes(_) => {
            votes.reset_votes(&conn.connection_id).await;
            Ok(())
        }
    };

    if let Err(err) = outcome {
        tracing::warn!(
            connection_id = %conn.connection_id,
            error = %err,
            "Client event rejected"
        );
        send_error(conn, ServerEvent::from(&err));
    }
}

fn send_error(conn: &Connection, event: ServerEvent) {
    if conn.send(event).is_err() {
        tracing::warn!(
            connection_id = %conn.connection_id,
            "Failed to send error event (connection closed)"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planning_poker_shared::{RoomCodeGenerator, SequenceCodeSource, SessionRegistry};

    async fn connect(
        ws_state: &WebSocketState,
    ) -> (Arc<Connection>, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ws_state.add_connection(Connection::new(tx)).await, rx)
    }

    #[tokio::test]
    async fn test_invalid_frame_gets_error_event() {
        let ws_state = WebSocketState::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let conn = ws_state.add_connection(Connection::new(tx)).await;

        handle_text_frame("not json", &conn, &ws_state).await;

        assert_eq!(rx.try_recv().unwrap(), ServerEvent::invalid_event());
        assert_eq!(ws_state.get_stats().await.active_users, 0);
    }

    #[tokio::test]
    async fn test_join_unknown_room_reports_error_to_caller_only() {
        let ws_state = WebSocketState::default();
        let (tx, mut host_rx) = mpsc::unbounded_channel();
        let host = ws_state.add_connection(Connection::new(tx)).await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let guest = ws_state.add_connection(Connection::new(tx)).await;

        handle_text_frame(
            r#"{"event":"Create_Room","data":{"username":"Alice","isAdmin":true}}"#,
            &host,
            &ws_state,
        )
        .await;
        while host_rx.try_recv().is_ok() {}

        let live = ws_state
            .registry
            .lock()
            .await
            .room_codes()
            .next()
            .cloned()
            .unwrap();
        let missing = if live.as_str() == "000" { "001" } else { "000" };
        let frame = format!(
            r#"{{"event":"Join_Room","data":{{"username":"Bob","roomCode":"{missing}"}}}}"#
        );
        handle_text_frame(&frame, &guest, &ws_state).await;

        match rx.try_recv().unwrap() {
            ServerEvent::Error { code, .. } => assert_eq!(code, "ROOM_NOT_FOUND"),
            other => panic!("Expected Error, got {}", other.name()),
        }
        assert!(host_rx.try_recv().is_err());
        assert_eq!(ws_state.get_stats().await.active_users, 1);
    }

    #[tokio::test]
    async fn test_second_create_from_same_connection_rejected() {
        let ws_state = WebSocketState::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let conn = ws_state.add_connection(Connection::new(tx)).await;
        let frame = r#"{"event":"Create_Room","data":{"username":"Alice","isAdmin":true}}"#;

        handle_text_frame(frame, &conn, &ws_state).await;
        while rx.try_recv().is_ok() {}
        handle_text_frame(frame, &conn, &ws_state).await;

        match rx.try_recv().unwrap() {
            ServerEvent::Error { code, .. } => assert_eq!(code, "DUPLICATE_CONNECTION"),
            other => panic!("Expected Error, got {}", other.name()),
        }
        assert_eq!(ws_state.get_stats().await.active_rooms, 1);
    }

    #[tokio::test]
    async fn test_reset_with_empty_object_payload() {
        let ws_state = WebSocketState::default();
        let (conn, mut rx) = connect(&ws_state).await;

        handle_text_frame(
            r#"{"event":"Create_Room","data":{"username":"Alice","isAdmin":true}}"#,
            &conn,
            &ws_state,
        )
        .await;
        handle_text_frame(r#"{"event":"To_Vote","data":{"vote":8}}"#, &conn, &ws_state).await;
        while rx.try_recv().is_ok() {}

        handle_text_frame(r#"{"event":"Reset_Votes","data":{}}"#, &conn, &ws_state).await;

        match rx.try_recv().unwrap() {
            ServerEvent::RoomUsers(users) => assert!(users.iter().all(|u| u.vote.is_none())),
            other => panic!("Expected Room_Users, got {}", other.name()),
        }
        assert_eq!(rx.try_recv().unwrap(), ServerEvent::IsRedefinedVotes);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_try_change_vote_with_empty_object_payload() {
        let ws_state = WebSocketState::default();
        let (conn, mut rx) = connect(&ws_state).await;

        handle_text_frame(
            r#"{"event":"Create_Room","data":{"username":"Alice","isAdmin":true}}"#,
            &conn,
            &ws_state,
        )
        .await;
        while rx.try_recv().is_ok() {}

        handle_text_frame(r#"{"event":"Try_Change_Vote","data":{}}"#, &conn, &ws_state).await;

        match rx.try_recv().unwrap() {
            ServerEvent::WhoTryChangeVoted(user) => assert_eq!(user.username, "Alice"),
            other => panic!("Expected Who_Try_Change_Voted, got {}", other.name()),
        }
    }

    #[tokio::test]
    async fn test_exhausted_code_space_reports_error_to_caller() {
        // Every draw lands on 005, which the first room takes
        let codes = RoomCodeGenerator::new(SequenceCodeSource::new([5]), 1);
        let ws_state = WebSocketState::new(SessionRegistry::new(codes));
        let (host, mut host_rx) = connect(&ws_state).await;
        let (late, mut late_rx) = connect(&ws_state).await;

        handle_text_frame(
            r#"{"event":"Create_Room","data":{"username":"Alice","isAdmin":true}}"#,
            &host,
            &ws_state,
        )
        .await;
        while host_rx.try_recv().is_ok() {}

        handle_text_frame(
            r#"{"event":"Create_Room","data":{"username":"Bob","isAdmin":true}}"#,
            &late,
            &ws_state,
        )
        .await;

        match late_rx.try_recv().unwrap() {
            ServerEvent::Error { code, .. } => assert_eq!(code, "ROOM_SPACE_EXHAUSTED"),
            other => panic!("Expected Error, got {}", other.name()),
        }
        assert!(late_rx.try_recv().is_err());
        assert!(host_rx.try_recv().is_err());
        assert!(late.current_room().await.is_none());

        let stats = ws_state.get_stats().await;
        assert_eq!(stats.active_rooms, 1);
        assert_eq!(stats.active_users, 1);
    }
}
