use std::sync::Arc;

use sqlx::PgPool;

use crate::assistant::cache::RemedyCache;
use crate::catalog::RemedyCatalog;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Static remedy dataset with its fuzzy index, loaded once at startup.
    pub catalog: Arc<RemedyCatalog>,
    pub llm: LlmClient,
    /// Pluggable AI result cache. Redis when REDIS_URL is set, otherwise a no-op.
    pub ai_cache: Arc<dyn RemedyCache>,
}
