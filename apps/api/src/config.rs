use std::path::PathBuf;

use anyhow::{ensure, Context, Result};

use crate::search::FuzzyOptions;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// No AI result cache when unset.
    pub redis_url: Option<String>,
    pub llm_api_key: String,
    /// OpenAI-compatible chat-completions URL; OpenRouter when unset.
    pub llm_api_url: Option<String>,
    pub remedies_path: PathBuf,
    pub search_threshold: f64,
    pub search_distance: usize,
    pub ai_cache_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: &str| optional(key).unwrap_or_else(|| default.to_string());

        let search_threshold = or_default("SEARCH_THRESHOLD", "0.3")
            .parse::<f64>()
            .context("SEARCH_THRESHOLD must be a number")?;
        ensure!(
            (0.0..=1.0).contains(&search_threshold),
            "SEARCH_THRESHOLD must be between 0 and 1"
        );

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            redis_url: optional("REDIS_URL"),
            llm_api_key: require("LLM_API_KEY")?,
            llm_api_url: optional("LLM_API_URL"),
            remedies_path: PathBuf::from(or_default("REMEDIES_PATH", "data/remedies.json")),
            search_threshold,
            search_distance: or_default("SEARCH_DISTANCE", "100")
                .parse::<usize>()
                .context("SEARCH_DISTANCE must be a non-negative integer")?,
            ai_cache_ttl_secs: or_default("AI_CACHE_TTL_SECS", "3600")
                .parse::<u64>()
                .context("AI_CACHE_TTL_SECS must be a non-negative integer")?,
            port: or_default("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: or_default("RUST_LOG", "info"),
        })
    }

    pub fn fuzzy_options(&self) -> FuzzyOptions {
        FuzzyOptions {
            threshold: self.search_threshold,
            distance: self.search_distance,
            ..FuzzyOptions::default()
        }
    }
}
