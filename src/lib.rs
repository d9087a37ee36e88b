//! Real-time chat service: HTTP auth and history around a WebSocket
//! broadcast hub.

pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;
pub mod utils {
    pub mod jwt;
}

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Extension, Router};
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir};

use crate::{
    chat::{heartbeat, queue, Hub, Registry, SqliteStore},
    config::Config,
    state::AppState,
};

const BODY_LIMIT: usize = 64 * 1024;

/// Build the process-wide registry and queue, start the hub (and heartbeat,
/// if enabled), and return the shared state. Call before accepting anything.
pub fn start(pool: sqlx::SqlitePool, config: Config) -> AppState {
    let store    = SqliteStore::new(pool.clone());
    let registry = Registry::new();
    let (queue, rx) = queue::channel(config.queue_capacity, config.overflow);

    tokio::spawn(Hub::new(registry.clone(), Arc::new(store.clone())).run(rx));
    if let Some(every) = config.ping_interval {
        tokio::spawn(heartbeat::task(registry.clone(), every));
    }

    AppState { pool, store, registry, queue, config: Arc::new(config) }
}

pub fn app(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    Router::new()
        .merge(routes::router())
        .fallback_service(ServeDir::new(static_dir))
        .layer(Extension(state))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
}
