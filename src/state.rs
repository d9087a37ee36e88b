use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{
    chat::{Queue, Registry, SqliteStore},
    config::Config,
};

/// Everything a request handler may need, shared through `Extension`.
#[derive(Clone)]
pub struct AppState {
    pub pool:     SqlitePool,
    pub store:    SqliteStore,
    pub registry: Registry,
    pub queue:    Queue,
    pub config:   Arc<Config>,
}
