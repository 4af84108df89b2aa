use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (the pool is an `Arc` internally, the config is
/// behind one explicitly).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, constructed at startup and injected here --
    /// the one shared mutable resource in the system.
    pub pool: aiforge_db::DbPool,
    /// Server configuration (JWT secret, CORS, timeouts).
    pub config: Arc<ServerConfig>,
}
