//! Shared application state

use std::sync::Arc;

use planning_poker_shared::{RandomCodeSource, RoomCodeGenerator, SessionRegistry};

use crate::config::Config;
use crate::websocket::WebSocketState;

/// State handed to every route
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ws_state: WebSocketState,
}

impl AppState {
    /// Build state with a random room code generator capped per the config
    pub fn new(config: Config) -> Self {
        let codes = RoomCodeGenerator::new(RandomCodeSource, config.room_code_max_attempts);
        Self::with_registry(config, SessionRegistry::new(codes))
    }

    /// Build state around an existing registry
    pub fn with_registry(config: Config, registry: SessionRegistry) -> Self {
        Self {
            config: Arc::new(config),
            ws_state: WebSocketState::new(registry),
        }
    }
}
