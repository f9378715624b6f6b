//! Cache for AI-generated remedies, keyed by normalized query.
//!
//! The dataset is static, so the same query always yields the same dataset
//! names in the prompt; caching on the query alone is enough.
//! `AppState` holds an `Arc<dyn RemedyCache>`: Redis when `REDIS_URL` is set,
//! otherwise a no-op. Cache failures never fail a request.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, warn};

use crate::models::remedy::AiRemedy;

const KEY_PREFIX: &str = "remedies:ai:";

#[async_trait]
pub trait RemedyCache: Send + Sync {
    async fn get(&self, query: &str) -> Option<Vec<AiRemedy>>;
    async fn put(&self, query: &str, remedies: &[AiRemedy]);
}

/// Collapses whitespace and lowercases so trivially different queries share an entry.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn cache_key(query: &str) -> String {
    format!("{KEY_PREFIX}{}", normalize_query(query))
}

pub struct RedisRemedyCache {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisRemedyCache {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }
}

#[async_trait]
impl RemedyCache for RedisRemedyCache {
    async fn get(&self, query: &str) -> Option<Vec<AiRemedy>> {
        let key = cache_key(query);
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Redis unavailable, skipping AI cache read: {e}");
                return None;
            }
        };

        let raw: Option<String> = match conn.get(&key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("AI cache read failed for {key}: {e}");
                return None;
            }
        };

        let remedies = serde_json::from_str(&raw?)
            .map_err(|e| warn!("Discarding unreadable AI cache entry {key}: {e}"))
            .ok()?;
        debug!("AI cache hit for {key}");
        Some(remedies)
    }

    async fn put(&self, query: &str, remedies: &[AiRemedy]) {
        let key = cache_key(query);
        let payload = match serde_json::to_string(remedies) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to encode AI remedies for cache: {e}");
                return;
            }
        };

        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Redis unavailable, skipping AI cache write: {e}");
                return;
            }
        };

        if let Err(e) = conn
            .set_ex::<_, _, ()>(&key, payload, self.ttl_secs)
            .await
        {
            warn!("AI cache write failed for {key}: {e}");
        }
    }
}

/// Used when no Redis is configured.
pub struct NoopRemedyCache;

#[async_trait]
impl RemedyCache for NoopRemedyCache {
    async fn get(&self, _query: &str) -> Option<Vec<AiRemedy>> {
        None
    }

    async fn put(&self, _query: &str, _remedies: &[AiRemedy]) {}
}

#[cfg(test)]
pub mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory cache for tests.
    #[derive(Default)]
    pub struct MemoryRemedyCache {
        pub entries: Mutex<HashMap<String, Vec<AiRemedy>>>,
    }

    #[async_trait]
    impl RemedyCache for MemoryRemedyCache {
        async fn get(&self, query: &str) -> Option<Vec<AiRemedy>> {
            self.entries.lock().unwrap().get(&cache_key(query)).cloned()
        }

        async fn put(&self, query: &str, remedies: &[AiRemedy]) {
            self.entries
                .lock()
                .unwrap()
                .insert(cache_key(query), remedies.to_vec());
        }
    }
}
