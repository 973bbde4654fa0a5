//! Error types for session operations

use thiserror::Error;

use crate::types::{ConnectionId, RoomCode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Room not found: {0}")]
    RoomNotFound(RoomCode),

    #[error("No free room code after {attempts} attempts")]
    RoomSpaceExhausted { attempts: usize },

    #[error("Connection already has a user: {0}")]
    DuplicateConnection(ConnectionId),
}

impl SessionError {
    /// Stable code sent to clients alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::RoomNotFound(_) => "ROOM_NOT_FOUND",
            SessionError::RoomSpaceExhausted { .. } => "ROOM_SPACE_EXHAUSTED",
            SessionError::DuplicateConnection(_) => "DUPLICATE_CONNECTION",
        }
    }
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;
