use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Registry API consumer credential. The registry accepts "test" for
    /// unregistered consumers with tight rate limits.
    pub law_api_oc: String,
    pub snapshot_dir: String,
    pub cache_ttl_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            law_api_oc: env::var("LAW_API_OC").unwrap_or_else(|_| "test".to_string()),
            snapshot_dir: env::var("SNAPSHOT_DIR").unwrap_or_else(|_| "snapshots".to_string()),
            cache_ttl_secs: env::var("CACHE_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .context("CACHE_TTL_SECS must be a valid number")?,
        })
    }
}
