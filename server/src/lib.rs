//! Wicket Server - live scoring over HTTP and WebSocket.
//!
//! Hosts any number of matches in memory, each scored through
//! `wicket-engine`, and pushes a full scoreboard snapshot to every live
//! subscriber after each admitted command.

pub mod config;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod routes;
pub mod websocket;

use crate::config::Config;
use crate::registry::MatchRegistry;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<MatchRegistry>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            registry: MatchRegistry::new_shared(config),
        }
    }
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
