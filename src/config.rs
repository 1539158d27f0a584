use anyhow::{Context, Result};
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "sqlite://videos.db?mode=rwc";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_APP_NAME: &str = "Programming Tutorials";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_QUERY_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub listen_addr: String,
    /// Category title shown on the home page.
    pub app_name: String,
    pub db_max_connections: u32,
    pub query_timeout: Duration,
}

impl Settings {
    /// Reads settings from the process environment, falling back to defaults
    /// for anything unset. Call `dotenv::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("DB_MAX_CONNECTIONS must be a positive integer, got {raw:?}"))?,
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };

        let query_timeout_ms = match lookup("QUERY_TIMEOUT_MS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("QUERY_TIMEOUT_MS must be a number of milliseconds, got {raw:?}"))?,
            None => DEFAULT_QUERY_TIMEOUT_MS,
        };

        Ok(Settings {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            listen_addr: lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            app_name: lookup("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            db_max_connections,
            query_timeout: Duration::from_millis(query_timeout_ms),
        })
    }
}
