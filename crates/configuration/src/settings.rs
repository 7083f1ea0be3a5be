use crate::error::ConfigError;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

/// Where the HTTP server listens.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// How to reach the (already populated, read-only) store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// A full `postgres://` URL. When set, the individual fields below are ignored.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub max_connections: u32,
    /// Seconds to wait for a free pooled connection before the query fails.
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive, e.g. `info` or `web_server=debug,info`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs go to a daily-rolling file in this directory instead of stdout.
    pub directory: Option<String>,
}

impl Settings {
    /// Checks the values serde cannot: ranges and required combinations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
