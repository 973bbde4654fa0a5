//! Planning Poker Shared Types and Session State
//!
//! This crate contains the room/user model, session errors, room code
//! allocation and the session registry used by the server.

pub mod error;
pub mod registry;
pub mod room_code;
pub mod types;

pub use error::*;
pub use registry::{Departure, RegistryStats, SessionRegistry};
pub use room_code::{CodeSource, RandomCodeSource, RoomCodeGenerator, SequenceCodeSource};
pub use types::*;
