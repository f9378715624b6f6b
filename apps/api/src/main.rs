mod assistant;
mod catalog;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod routes;
mod search;
mod state;
mod tracking;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assistant::cache::{NoopRemedyCache, RedisRemedyCache, RemedyCache};
use crate::catalog::RemedyCatalog;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Remedy API v{}", env!("CARGO_PKG_VERSION"));

    // Load the remedy dataset and build its fuzzy index
    let catalog = RemedyCatalog::load(&config.remedies_path, config.fuzzy_options())?;
    if catalog.is_empty() {
        warn!("Remedy dataset is empty; dataset searches will return nothing");
    }

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize the AI result cache (Redis is optional)
    let ai_cache: Arc<dyn RemedyCache> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Redis AI cache enabled (ttl {}s)", config.ai_cache_ttl_secs);
            Arc::new(RedisRemedyCache::new(client, config.ai_cache_ttl_secs))
        }
        None => {
            info!("REDIS_URL not set, AI results will not be cached");
            Arc::new(NoopRemedyCache)
        }
    };

    // Initialize LLM client
    let mut llm = LlmClient::new(config.llm_api_key.clone())?;
    if let Some(url) = &config.llm_api_url {
        llm = llm.with_endpoint(url.as_str());
    }
    info!(
        "LLM client initialized (model: {}, endpoint: {})",
        llm_client::MODEL,
        llm.endpoint()
    );

    let state = AppState {
        db,
        catalog: Arc::new(catalog),
        llm,
        ai_cache,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
