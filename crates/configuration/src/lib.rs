use crate::error::ConfigError;
use config::builder::DefaultState;
use config::ConfigBuilder;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{DatabaseSettings, LoggingSettings, ServerSettings, Settings};

/// Prefix of the environment variables that override settings,
/// e.g. `EPI__SERVER__PORT=8080`.
const ENV_PREFIX: &str = "EPI";

/// Loads the application settings.
///
/// Sources, lowest precedence first: built-in defaults, an optional
/// `config.toml` in the working directory, then `EPI__*` environment variables.
/// A `.env` file is read first when present, and the conventional
/// `DATABASE_URL` variable overrides `database.url`.
pub fn load_settings() -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();

    let builder = config::Config::builder()
        // Tells the builder to look for a file named `config.toml`
        .add_source(config::File::with_name("config.toml").required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?;

    settings_from(builder)
}

/// Applies the defaults under whatever sources `builder` already carries,
/// then deserializes and validates.
fn settings_from(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigError> {
    let config = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("database.host", "localhost")?
        .set_default("database.port", 5432)?
        .set_default("database.max_connections", 10)?
        .set_default("database.acquire_timeout_secs", 5)?
        .set_default("logging.level", "info")?
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = config.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn from_toml(toml: &str) -> Result<Settings, ConfigError> {
        settings_from(config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn defaults_fill_every_section() {
        let settings = from_toml("").unwrap();

        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.database.host, "localhost");
        assert_eq!(settings.database.port, 5432);
        assert_eq!(settings.database.max_connections, 10);
        assert_eq!(settings.database.acquire_timeout_secs, 5);
        assert!(settings.database.url.is_none());
        assert_eq!(settings.logging.level, "info");
        assert!(settings.logging.directory.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let settings = from_toml(
            r#"
            [server]
            port = 8080

            [database]
            name = "covid"
            user = "reader"
            max_connections = 3

            [logging]
            level = "debug"
            directory = "logs"
            "#,
        )
        .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.database.name.as_deref(), Some("covid"));
        assert_eq!(settings.database.user.as_deref(), Some("reader"));
        assert_eq!(settings.database.max_connections, 3);
        assert_eq!(settings.logging.directory.as_deref(), Some("logs"));
    }

    #[test]
    fn zero_port_is_rejected() {
        let err = from_toml("[server]\nport = 0").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn empty_pool_is_rejected() {
        let err = from_toml("[database]\nmax_connections = 0").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn wrong_types_fail_to_load() {
        let err = from_toml("[server]\nport = \"eighty\"").unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }

    #[test]
    fn settings_are_exported_from_the_crate_root() {
        let settings: crate::Settings = from_toml("[server]\nport = 9000").unwrap();
        let server: &crate::ServerSettings = &settings.server;
        assert_eq!(server.port, 9000);
    }
}
