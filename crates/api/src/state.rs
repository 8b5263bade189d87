use std::sync::Arc;

use bonusdesk_core::ingestion::NameSplitter;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted and the rest sits
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: bonusdesk_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Strategy for splitting inbound full names into name and surname.
    pub name_splitter: Arc<dyn NameSplitter>,
}
