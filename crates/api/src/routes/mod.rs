//! HTTP routes

pub mod health;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{state::AppState, websocket::ws_handler};

/// Create all routes
pub fn create_router(state: AppState) -> Router {
    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness));

    Router::new()
        .merge(health_routes)
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        // Browser clients are served from a different origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
