//! Application state wiring the session service together.
//!
//! AppState holds the concrete service instance used by both CLI and REST API.
//! `SessionService` is generic over the chat repository; AppState pins it to
//! the SQLite implementation.

use std::path::PathBuf;
use std::sync::Arc;

use parlor_core::chat::service::SessionService;
use parlor_infra::config::{load_global_config, resolve_cache_size, resolve_data_dir};
use parlor_infra::sqlite::chat::SqliteChatRepository;
use parlor_infra::sqlite::pool::DatabasePool;

/// Session service pinned to the SQLite chat store.
pub type ConcreteSessionService = SessionService<SqliteChatRepository>;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<ConcreteSessionService>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state in the resolved data directory.
    pub async fn init() -> anyhow::Result<Self> {
        Self::init_in(resolve_data_dir()).await
    }

    /// Connect to the database in `data_dir` and wire the session service.
    pub async fn init_in(data_dir: PathBuf) -> anyhow::Result<Self> {
        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_pool = DatabasePool::open_in(&data_dir).await?;

        let config = load_global_config(&data_dir).await;
        let cache_size = resolve_cache_size(&config);

        let chat_repo = SqliteChatRepository::new(db_pool.clone());
        let session_service = SessionService::new(chat_repo, cache_size);

        tracing::debug!(
            data_dir = %data_dir.display(),
            cache_size,
            "Application state initialized"
        );

        Ok(Self {
            session_service: Arc::new(session_service),
            data_dir,
            db_pool,
        })
    }
}
