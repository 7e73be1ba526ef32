use crate::config::AppConfig;
use crate::db::pool::DbPool;
use crate::llm::LlmManager;

/// Shared application state for the web server.
///
/// The pool and the LLM manager are both internally synchronized, so the
/// state needs no locking of its own.
pub struct AppState {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub llm_manager: LlmManager,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: AppConfig, db_pool: DbPool, llm_manager: LlmManager) -> Self {
        Self {
            config,
            db_pool,
            llm_manager,
            startup_time: chrono::Utc::now(),
        }
    }
}
