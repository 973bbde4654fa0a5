//! Session registry
//!
//! Owns every live user and room. Each method is one logical operation and
//! takes `&mut self`, so callers holding the registry lock never observe a
//! half-applied change.

use std::collections::HashMap;

use crate::error::{SessionError, SessionResult};
use crate::room_code::RoomCodeGenerator;
use crate::types::{ConnectionId, Room, RoomCode, User, Vote};

/// Result of removing a user from the registry
#[derive(Debug, Clone, PartialEq)]
pub struct Departure {
    /// The removed user, as it was before removal
    pub user: User,
    /// Roster left behind in the user's room, in join order
    pub remaining: Vec<User>,
    /// True if the room was deleted because it became empty
    pub room_closed: bool,
}

/// Counts reported by the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryStats {
    pub rooms: usize,
    pub users: usize,
}

/// Authoritative mapping of connections to users and codes to rooms
#[derive(Debug, Default)]
pub struct SessionRegistry {
    users: HashMap<ConnectionId, User>,
    rooms: HashMap<RoomCode, Room>,
    codes: RoomCodeGenerator,
}

impl SessionRegistry {
    pub fn new(codes: RoomCodeGenerator) -> Self {
        Self {
            users: HashMap::new(),
            rooms: HashMap::new(),
            codes,
        }
    }

    /// Create a room with the caller as its only member
    pub fn create_room(
        &mut self,
        connection_id: ConnectionId,
        username: impl Into<String>,
        is_admin: bool,
    ) -> SessionResult<User> {
        self.ensure_unregistered(connection_id)?;

        let code = self.codes.generate(&self.rooms)?;
        let user = User::new(connection_id, username, is_admin, code.clone());

        let mut room = Room::new(code.clone());
        room.add_member(connection_id);
        self.rooms.insert(code.clone(), room);
        self.users.insert(connection_id, user.clone());

        tracing::info!(
            room_code = %code,
            connection_id = %connection_id,
            live_rooms = self.rooms.len(),
            "Room created"
        );

        Ok(user)
    }

    /// Add a non-admin user to an existing room
    ///
    /// Fails without touching any state if the room does not exist.
    pub fn join_room(
        &mut self,
        connection_id: ConnectionId,
        username: impl Into<String>,
        room_code: &RoomCode,
    ) -> SessionResult<User> {
        self.ensure_unregistered(connection_id)?;

        let room = self
            .rooms
            .get_mut(room_code)
            .ok_or_else(|| SessionError::RoomNotFound(room_code.clone()))?;

        let user = User::new(connection_id, username, false, room_code.clone());
        room.add_member(connection_id);
        let room_size = room.len();
        self.users.insert(connection_id, user.clone());

        tracing::debug!(
            room_code = %room_code,
            connection_id = %connection_id,
            room_size,
            "User joined room"
        );

        Ok(user)
    }

    /// Remove the user owned by a connection
    ///
    /// Room membership goes first, deleting the room if it empties, then the
    /// global user entry. Returns `None` if the connection has no user.
    pub fn remove_user(&mut self, connection_id: &ConnectionId) -> Option<Departure> {
        let room_code = self.users.get(connection_id)?.room_code.clone();

        let mut room_closed = false;
        if let Some(room) = self.rooms.get_mut(&room_code) {
            room.remove_member(connection_id);
            if room.is_empty() {
                self.rooms.remove(&room_code);
                room_closed = true;
                tracing::info!(
                    room_code = %room_code,
                    live_rooms = self.rooms.len(),
                    "Removed empty room"
                );
            }
        }

        let user = self.users.remove(connection_id)?;
        let remaining = self.roster(&room_code);

        Some(Departure {
            user,
            remaining,
            room_closed,
        })
    }

    pub fn find_user_by_connection(&self, connection_id: &ConnectionId) -> Option<&User> {
        self.users.get(connection_id)
    }

    pub fn find_room(&self, room_code: &RoomCode) -> Option<&Room> {
        self.rooms.get(room_code)
    }

    /// Resolve a connection to its user and that user's live room
    pub fn find_member(&self, connection_id: &ConnectionId) -> Option<(&User, &Room)> {
        let user = self.users.get(connection_id)?;
        let room = self.rooms.get(&user.room_code)?;
        Some((user, room))
    }

    /// Users of a room in join order; empty if the room does not exist
    pub fn roster(&self, room_code: &RoomCode) -> Vec<User> {
        self.rooms
            .get(room_code)
            .map(|room| {
                room.members()
                    .iter()
                    .filter_map(|id| self.users.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Set a user's vote. No-op if the user or their room is missing.
    pub fn update_vote(
        &mut self,
        connection_id: &ConnectionId,
        vote: Option<Vote>,
    ) -> Option<&User> {
        let room_code = &self.users.get(connection_id)?.room_code;
        if !self.rooms.get(room_code)?.contains(connection_id) {
            return None;
        }

        let user = self.users.get_mut(connection_id)?;
        user.vote = vote;
        Some(user)
    }

    /// Clear every member's vote and return the refreshed roster
    pub fn reset_votes(&mut self, room_code: &RoomCode) -> Option<Vec<User>> {
        let room = self.rooms.get(room_code)?;
        for member in room.members() {
            if let Some(user) = self.users.get_mut(member) {
                user.vote = None;
            }
        }
        Some(self.roster(room_code))
    }

    pub fn room_codes(&self) -> impl Iterator<Item = &RoomCode> {
        self.rooms.keys()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            rooms: self.rooms.len(),
            users: self.users.len(),
        }
    }

    fn ensure_unregistered(&self, connection_id: ConnectionId) -> SessionResult<()> {
        if self.users.contains_key(&connection_id) {
            return Err(SessionError::DuplicateConnection(connection_id));
        }
        Ok(())
    }
}
