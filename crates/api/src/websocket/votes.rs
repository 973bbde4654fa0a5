//! Vote handling
//!
//! Every operation first resolves the calling connection to a user with a
//! live room. When that fails the event is dropped: nothing is broadcast and
//! no error goes back to the caller.

use planning_poker_shared::{ConnectionId, RoomCode, Vote};

use super::events::ServerEvent;
use super::state::WebSocketState;

/// Applies vote events to the registry and broadcasts the results
#[derive(Clone)]
pub struct VoteCoordinator {
    ws_state: WebSocketState,
}

impl VoteCoordinator {
    pub fn new(ws_state: WebSocketState) -> Self {
        Self { ws_state }
    }

    /// Record a vote, then broadcast `Who_Voted` and `Room_Users`.
    /// Returns false if the event was dropped.
    pub async fn cast_vote(&self, connection_id: &ConnectionId, vote: Vote) -> bool {
        let mut registry = self.ws_state.registry.lock().await;
        let Some(user) = registry.update_vote(connection_id, Some(vote)).cloned() else {
            dropped(connection_id, "To_Vote");
            return false;
        };

        let room_code = user.room_code.clone();
        self.broadcast(&room_code, ServerEvent::WhoVoted(user)).await;
        let roster = registry.roster(&room_code);
        self.broadcast(&room_code, ServerEvent::RoomUsers(roster))
            .await;
        true
    }

    /// Relay a show/hide request. Visibility is not stored server-side.
    pub async fn request_reveal_change(
        &self,
        connection_id: &ConnectionId,
        is_visible: bool,
    ) -> bool {
        let registry = self.ws_state.registry.lock().await;
        let Some((_, room)) = registry.find_member(connection_id) else {
            dropped(connection_id, "Show_Votes");
            return false;
        };

        self.broadcast(&room.code, ServerEvent::ChangeVisibilityVotes(is_visible))
            .await;
        true
    }

    /// Announce that a user wants to re-vote; clients decide whether to allow it
    pub async fn request_change_vote(&self, connection_id: &ConnectionId) -> bool {
        let registry = self.ws_state.registry.lock().await;
        let Some((user, room)) = registry.find_member(connection_id) else {
            dropped(connection_id, "Try_Change_Vote");
            return false;
        };

        self.broadcast(&room.code, ServerEvent::WhoTryChangeVoted(user.clone()))
            .await;
        true
    }

    /// Clear every vote in the caller's room, then broadcast `Room_Users`
    /// and `Is_Redefined_Votes`
    pub async fn reset_votes(&self, connection_id: &ConnectionId) -> bool {
        let mut registry = self.ws_state.registry.lock().await;
        let Some(room_code) = registry
            .find_member(connection_id)
            .map(|(_, room)| room.code.clone())
        else {
            dropped(connection_id, "Reset_Votes");
            return false;
        };

        let roster = registry.reset_votes(&room_code).unwrap_or_default();
        self.broadcast(&room_code, ServerEvent::RoomUsers(roster))
            .await;
        self.broadcast(&room_code, ServerEvent::IsRedefinedVotes)
            .await;

        tracing::info!(room_code = %room_code, "Votes reset");
        true
    }

    async fn broadcast(&self, room_code: &RoomCode, event: ServerEvent) {
        self.ws_state.rooms.broadcast(room_code, event).await;
    }
}

fn dropped(connection_id: &ConnectionId, event: &'static str) {
    tracing::debug!(
        connection_id = %connection_id,
        event,
        "Ignoring event from connection without a room"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::connection::Connection;
    use crate::websocket::lifecycle::ConnectionLifecycle;
    use planning_poker_shared::User;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct Session {
        state: WebSocketState,
        votes: VoteCoordinator,
        alice: Arc<Connection>,
        bob: Arc<Connection>,
        alice_rx: mpsc::UnboundedReceiver<ServerEvent>,
    }

    async fn room_of_two() -> Session {
        let state = WebSocketState::default();
        let lifecycle = ConnectionLifecycle::new(state.clone());

        let (tx, mut alice_rx) = mpsc::unbounded_channel();
        let alice = state.add_connection(Connection::new(tx)).await;
        let (tx, _bob_rx) = mpsc::unbounded_channel();
        let bob = state.add_connection(Connection::new(tx)).await;

        let host = lifecycle
            .create_room(&alice, "Alice".into(), true)
            .await
            .unwrap();
        lifecycle
            .join_room(&bob, "Bob".into(), host.room_code)
            .await
            .unwrap();
        while alice_rx.try_recv().is_ok() {}

        Session {
            votes: VoteCoordinator::new(state.clone()),
            state,
            alice,
            bob,
            alice_rx,
        }
    }

    fn roster_of(event: ServerEvent) -> Vec<User> {
        match event {
            ServerEvent::RoomUsers(users) => users,
            other => panic!("Expected Room_Users, got {}", other.name()),
        }
    }

    #[tokio::test]
    async fn test_cast_vote_broadcasts_voter_then_roster() {
        let mut room = room_of_two().await;

        assert!(room.votes.cast_vote(&room.bob.connection_id, 5.0).await);

        match room.alice_rx.try_recv().unwrap() {
            ServerEvent::WhoVoted(user) => {
                assert_eq!(user.username, "Bob");
                assert_eq!(user.vote, Some(5.0));
            }
            other => panic!("Expected Who_Voted, got {}", other.name()),
        }
        let roster = roster_of(room.alice_rx.try_recv().unwrap());
        assert_eq!(roster[0].vote, None);
        assert_eq!(roster[1].vote, Some(5.0));
    }

    #[tokio::test]
    async fn test_reveal_and_change_requests_are_relayed() {
        let mut room = room_of_two().await;

        assert!(
            room.votes
                .request_reveal_change(&room.alice.connection_id, true)
                .await
        );
        assert_eq!(
            room.alice_rx.try_recv().unwrap(),
            ServerEvent::ChangeVisibilityVotes(true)
        );

        assert!(room.votes.request_change_vote(&room.bob.connection_id).await);
        match room.alice_rx.try_recv().unwrap() {
            ServerEvent::WhoTryChangeVoted(user) => assert_eq!(user.username, "Bob"),
            other => panic!("Expected Who_Try_Change_Voted, got {}", other.name()),
        }
    }

    #[tokio::test]
    async fn test_reset_emits_roster_then_signal_once() {
        let mut room = room_of_two().await;
        room.votes.cast_vote(&room.alice.connection_id, 3.0).await;
        room.votes.cast_vote(&room.bob.connection_id, 8.0).await;
        while room.alice_rx.try_recv().is_ok() {}

        assert!(room.votes.reset_votes(&room.bob.connection_id).await);

        let roster = roster_of(room.alice_rx.try_recv().unwrap());
        assert!(roster.iter().all(|u| u.vote.is_none()));
        assert_eq!(
            room.alice_rx.try_recv().unwrap(),
            ServerEvent::IsRedefinedVotes
        );
        assert!(room.alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_events_without_room_are_dropped() {
        let mut room = room_of_two().await;
        let stranger = ConnectionId::new();

        assert!(!room.votes.cast_vote(&stranger, 1.0).await);
        assert!(!room.votes.request_reveal_change(&stranger, true).await);
        assert!(!room.votes.request_change_vote(&stranger).await);
        assert!(!room.votes.reset_votes(&stranger).await);

        assert!(room.alice_rx.try_recv().is_err());
        assert_eq!(room.state.get_stats().await.active_users, 2);
    }
}
