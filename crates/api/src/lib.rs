//! Planning Poker API Library
//!
//! This crate contains the HTTP and WebSocket server for planning poker
//! sessions.

pub mod config;
pub mod routes;
pub mod state;
pub mod websocket;

pub use config::Config;
pub use routes::create_router;
pub use state::AppState;
