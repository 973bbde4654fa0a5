//! WebSocket support for real-time voting sessions
//!
//! Provides the WebSocket infrastructure behind a planning poker room:
//! - Room creation and joining by short code
//! - Vote casting, reveal requests and resets
//! - Roster broadcasts whenever membership or votes change
//!
//! # Architecture
//!
//! - **Connection**: One live WebSocket and its outbound channel
//! - **Room**: Room-code multicast groups for broadcasting events
//! - **State**: Connections, room groups and the session registry
//! - **Lifecycle**: Create/join handling and disconnect cleanup
//! - **Votes**: Vote mutations and their broadcasts
//! - **Handler**: Axum WebSocket route handler
//! - **Events**: Type-safe event definitions for client/server communication

pub mod connection;
pub mod events;
pub mod handler;
pub mod lifecycle;
pub mod room;
pub mod state;
pub mod votes;

pub use handler::ws_handler;
pub use lifecycle::ConnectionLifecycle;
pub use state::WebSocketState;
pub use votes::VoteCoordinator;
