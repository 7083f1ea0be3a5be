use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL database.
///
/// The pool is created once at startup and shared by every request; each query
/// borrows one connection from it for the duration of a single round trip.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    let options = connect_options(settings)?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .connect_with(options)
        .await?;

    tracing::info!(
        host = %settings.host,
        max_connections = settings.max_connections,
        "Connected to the database."
    );
    Ok(pool)
}

/// Resolves connection options: a full URL wins, otherwise the individual
/// host/port/name/user/password settings are used.
pub fn connect_options(settings: &DatabaseSettings) -> Result<PgConnectOptions, DbError> {
    if let Some(url) = &settings.url {
        return Ok(PgConnectOptions::from_str(url)?);
    }

    let name = settings.name.as_deref().ok_or_else(|| {
        DbError::ConnectionConfigError(
            "either database.url or database.name must be set".to_string(),
        )
    })?;

    let mut options = PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .database(name);
    if let Some(user) = &settings.user {
        options = options.username(user);
    }
    if let Some(password) = &settings.password {
        options = options.password(password);
    }
    Ok(options)
}
