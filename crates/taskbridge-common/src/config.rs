//! Bridge configuration loaded from the process environment.
//!
//! # Example
//! ```rust,ignore
//! use taskbridge_common::BridgeConfig;
//!
//! // Reads `.env` (if present) and then the process environment
//! let config = BridgeConfig::from_env()?;
//!
//! // Or explicit configuration
//! let config = BridgeConfig::new("mongodb://localhost:27017/e2e");
//! ```

use crate::error::{BridgeError, Result};
use std::time::Duration;

/// Connection string variable, shared with the rest of the e2e tooling
pub const MONGO_URL_VAR: &str = "MONGO_PUBLIC_URL";
pub const DATABASE_VAR: &str = "TASKBRIDGE_DATABASE";
pub const CONNECT_TIMEOUT_VAR: &str = "TASKBRIDGE_CONNECT_TIMEOUT_MS";
pub const SERVER_SELECTION_TIMEOUT_VAR: &str = "TASKBRIDGE_SERVER_SELECTION_TIMEOUT_MS";
pub const APP_NAME_VAR: &str = "TASKBRIDGE_APP_NAME";

/// Database used when neither the override nor the connection string names one
pub const FALLBACK_DATABASE: &str = "test";

/// Settings every task uses to open its connection
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// MongoDB connection string
    pub mongo_url: String,
    /// Database override; `None` uses the connection string's database
    pub database: Option<String>,
    /// Connection timeout (default: 10s)
    pub connect_timeout: Duration,
    /// Server selection timeout (default: 30s)
    pub server_selection_timeout: Duration,
    /// Application name for server logs
    pub app_name: String,
}

impl BridgeConfig {
    /// Create a configuration with default timeouts for the given connection string
    pub fn new(mongo_url: impl Into<String>) -> Self {
        Self {
            mongo_url: mongo_url.into(),
            database: None,
            connect_timeout: Duration::from_secs(10),
            server_selection_timeout: Duration::from_secs(30),
            app_name: "taskbridge".to_string(),
        }
    }

    /// Use a specific database instead of the connection string's
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_server_selection_timeout(mut self, timeout: Duration) -> Self {
        self.server_selection_timeout = timeout;
        self
    }

    /// Load configuration from `.env` and the process environment.
    ///
    /// A missing `.env` file is not an error; a malformed one is.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mongo_url = lookup(MONGO_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| BridgeError::Config(format!("{} is not set", MONGO_URL_VAR)))?;

        let mut config = Self::new(mongo_url);

        if let Some(database) = lookup(DATABASE_VAR).filter(|db| !db.is_empty()) {
            config.database = Some(database);
        }
        if let Some(ms) = lookup(CONNECT_TIMEOUT_VAR) {
            config.connect_timeout = parse_millis(CONNECT_TIMEOUT_VAR, &ms)?;
        }
        if let Some(ms) = lookup(SERVER_SELECTION_TIMEOUT_VAR) {
            config.server_selection_timeout = parse_millis(SERVER_SELECTION_TIMEOUT_VAR, &ms)?;
        }
        if let Some(app_name) = lookup(APP_NAME_VAR).filter(|name| !name.is_empty()) {
            config.app_name = app_name;
        }

        Ok(config)
    }
}

fn parse_millis(var: &str, raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| {
            BridgeError::Config(format!(
                "{} must be a whole number of milliseconds, got '{}'",
                var, raw
            ))
        })
}
