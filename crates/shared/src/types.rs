//! Common types used across the planning poker server

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ID Wrappers
// =============================================================================

/// Connection ID wrapper, one per live WebSocket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ConnectionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// User ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// Short numeric code clients use to join a room, e.g. `"042"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Number of digits in a room code
    pub const DIGITS: usize = 3;

    /// Number of distinct codes (`000` through `999`)
    pub const SPACE: u16 = 1000;

    /// Format a numeric draw as a zero-padded code. Values outside the code
    /// space wrap around.
    pub fn from_number(value: u16) -> Self {
        Self(format!("{:03}", value % Self::SPACE))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<String> for RoomCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Session Types
// =============================================================================

/// A vote value. Decks commonly include fractions such as `0.5`.
pub type Vote = f64;

/// A participant bound to one live connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(rename = "socketId")]
    pub connection_id: ConnectionId,
    pub username: String,
    pub is_admin: bool,
    pub room_code: RoomCode,
    /// `None` until the user votes, serialized as `null`
    pub vote: Option<Vote>,
}

impl User {
    pub fn new(
        connection_id: ConnectionId,
        username: impl Into<String>,
        is_admin: bool,
        room_code: RoomCode,
    ) -> Self {
        Self {
            id: UserId::new(),
            connection_id,
            username: username.into(),
            is_admin,
            room_code,
            vote: None,
        }
    }
}

/// A voting session. Holds member connection IDs in join order; the user
/// records themselves live in the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub code: RoomCode,
    members: Vec<ConnectionId>,
}

impl Room {
    pub fn new(code: RoomCode) -> Self {
        Self {
            code,
            members: Vec::new(),
        }
    }

    /// Members in join order
    pub fn members(&self) -> &[ConnectionId] {
        &self.members
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.members.contains(connection_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Append a member. Returns false if it was already present.
    pub(crate) fn add_member(&mut self, connection_id: ConnectionId) -> bool {
        if self.contains(&connection_id) {
            return false;
        }
        self.members.push(connection_id);
        true
    }

    /// Remove a member. Returns false if it was not present.
    pub(crate) fn remove_member(&mut self, connection_id: &ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != connection_id);
        self.members.len() < before
    }
}
