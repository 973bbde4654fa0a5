//! WebSocket event types and serialization
//!
//! Every frame is a JSON object `{"event": "<Name>", "data": <payload>}`.
//! Server events without a payload omit `data`. Client events without a
//! payload may omit it, send `null`, or send `{}`.

use planning_poker_shared::{RoomCode, SessionError, User, Vote};
use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

// =============================================================================
// Client-to-Server Events
// =============================================================================

/// Events sent from client to server
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Open a new room with the sender as its first member
    #[serde(rename = "Create_Room", rename_all = "camelCase")]
    CreateRoom {
        username: String,
        #[serde(default = "creator_is_admin")]
        is_admin: bool,
    },

    /// Join an existing room by code
    #[serde(rename = "Join_Room", rename_all = "camelCase")]
    JoinRoom { username: String, room_code: RoomCode },

    /// Cast or change a vote
    #[serde(rename = "To_Vote")]
    ToVote { vote: Vote },

    /// Ask everyone in the room to show or hide votes
    #[serde(rename = "Show_Votes", rename_all = "camelCase")]
    ShowVotes { is_visible: bool },

    /// Announce an intent to re-vote
    #[serde(rename = "Try_Change_Vote")]
    TryChangeVote(NoPayload),

    /// Clear every vote in the room
    #[serde(rename = "Reset_Votes")]
    ResetVotes(NoPayload),
}

fn creator_is_admin() -> bool {
    true
}

/// Payload of a client event that carries no data. Whatever `data` holds is
/// ignored, and a missing `data` is accepted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoPayload;

impl<'de> Deserialize<'de> for NoPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<IgnoredAny>::deserialize(deserializer).map(|_| NoPayload)
    }
}

// =============================================================================
// Server-to-Client Events
// =============================================================================

/// Events sent from server to client
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// The receiving connection's own user record
    #[serde(rename = "Me")]
    Me(User),

    /// Full room roster in join order, votes included
    #[serde(rename = "Room_Users")]
    RoomUsers(Vec<User>),

    /// The user whose vote just changed
    #[serde(rename = "Who_Voted")]
    WhoVoted(User),

    /// Vote visibility requested by a room member
    #[serde(rename = "Change_Visibility_Votes")]
    ChangeVisibilityVotes(bool),

    /// The user asking to change their vote
    #[serde(rename = "Who_Try_Change_Voted")]
    WhoTryChangeVoted(User),

    /// All votes in the room were cleared
    #[serde(rename = "Is_Redefined_Votes")]
    IsRedefinedVotes,

    /// Request failed; only sent to the originating connection
    #[serde(rename = "Error")]
    Error { code: String, message: String },
}

impl ServerEvent {
    /// Wire name of the event, for logging
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Me(_) => "Me",
            ServerEvent::RoomUsers(_) => "Room_Users",
            ServerEvent::WhoVoted(_) => "Who_Voted",
            ServerEvent::ChangeVisibilityVotes(_) => "Change_Visibility_Votes",
            ServerEvent::WhoTryChangeVoted(_) => "Who_Try_Change_Voted",
            ServerEvent::IsRedefinedVotes => "Is_Redefined_Votes",
            ServerEvent::Error { .. } => "Error",
        }
    }

    /// Frame sent back when an inbound frame cannot be decoded
    pub fn invalid_event() -> Self {
        ServerEvent::Error {
            code: "INVALID_EVENT".to_string(),
            message: "Invalid event format".to_string(),
        }
    }
}

impl From<&SessionError> for ServerEvent {
    fn from(err: &SessionError) -> Self {
        ServerEvent::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}
