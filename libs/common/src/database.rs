//! Database module for handling PostgreSQL connections and operations
//!
//! This module provides connection pooling, configuration, schema bootstrap
//! and health checks for the PostgreSQL database.

use crate::error::{DatabaseError, DatabaseResult};
use serde::Deserialize;
use sqlx::{
    PgPool, Postgres, Transaction,
    pool::PoolConnection,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use std::time::Duration;
use tracing::{debug, error, info};

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username TEXT UNIQUE NOT NULL,
        password TEXT NOT NULL
    )
"#;

fn default_min_connections() -> u32 {
    1
}

fn default_max_connections() -> u32 {
    20
}

fn default_acquire_timeout() -> u64 {
    30
}

/// Database configuration struct
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database host address
    pub host: String,
    /// Database name
    #[serde(rename = "name")]
    pub database: String,
    /// Database port
    pub port: u16,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Seconds to wait for a free connection before giving up
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout: u64,
}

impl DatabaseConfig {
    /// Create a new DatabaseConfig from environment variables
    ///
    /// # Environment Variables
    /// - `DB_HOST`, `DB_NAME`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`: required
    /// - `DB_MIN_CONNECTIONS`: Minimum number of connections (default: 1)
    /// - `DB_MAX_CONNECTIONS`: Maximum number of connections (default: 20)
    /// - `DB_ACQUIRE_TIMEOUT`: Acquire timeout in seconds (default: 30)
    pub fn from_env() -> DatabaseResult<Self> {
        let config: DatabaseConfig = config::Config::builder()
            .add_source(config::Environment::with_prefix("DB"))
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| DatabaseError::Configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject pool bounds the driver would misbehave with
    pub fn validate(&self) -> DatabaseResult<()> {
        if self.max_connections == 0 {
            return Err(DatabaseError::Configuration(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(DatabaseError::Configuration(format!(
                "DB_MIN_CONNECTIONS ({}) exceeds DB_MAX_CONNECTIONS ({})",
                self.min_connections, self.max_connections
            )));
        }

        Ok(())
    }

    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }
}

/// Initialize a PostgreSQL connection pool
///
/// At least one connection is established before this returns, so a bad host
/// or bad credentials fail here rather than on the first request.
///
/// # Arguments
///
/// * `config` - Database configuration
///
/// # Returns
///
/// * `DatabaseResult<PgPool>` - PostgreSQL connection pool or error
pub async fn init_pool(config: &DatabaseConfig) -> DatabaseResult<PgPool> {
    config.validate()?;

    info!(
        host = %config.host,
        database = %config.database,
        max_connections = config.max_connections,
        "Initializing database connection pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout))
        .connect_with(config.connect_options())
        .await
        .map_err(DatabaseError::Connection)?;

    info!("Database connection pool initialized successfully");
    Ok(pool)
}

/// Pooled access to the users database
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Build the pool described by `config`
    pub async fn connect(config: &DatabaseConfig) -> DatabaseResult<Self> {
        let pool = init_pool(config).await?;
        Ok(Self { pool })
    }

    /// Lease a connection from the pool
    ///
    /// Waits up to the configured acquire timeout; when every connection is
    /// still leased after that, fails with [`DatabaseError::PoolExhausted`].
    pub async fn acquire(&self) -> DatabaseResult<PoolConnection<Postgres>> {
        let conn = self.pool.acquire().await.map_err(|e| {
            error!("Failed to acquire database connection: {}", e);
            DatabaseError::from(e)
        })?;

        debug!(
            size = self.pool.size(),
            idle = self.pool.num_idle(),
            "Database connection acquired"
        );
        Ok(conn)
    }

    /// Return a leased connection to the pool
    ///
    /// Taking the handle by value means it cannot be released twice. Handles
    /// dropped on an error path go back to the pool the same way.
    pub fn release(&self, conn: PoolConnection<Postgres>) {
        drop(conn);
        debug!(idle = self.pool.num_idle(), "Database connection released");
    }

    /// Lease a connection and open a transaction on it
    ///
    /// Dropping the transaction without committing rolls it back.
    pub async fn begin(&self) -> DatabaseResult<Transaction<'static, Postgres>> {
        let tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            DatabaseError::from(e)
        })?;
        Ok(tx)
    }

    /// Create the `users` table if it does not exist yet
    pub async fn init_db(&self) -> DatabaseResult<()> {
        let mut conn = self.acquire().await?;

        sqlx::query(CREATE_USERS_TABLE)
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::Query)?;

        self.release(conn);
        info!("Database schema ready");
        Ok(())
    }

    /// Check database connectivity
    ///
    /// # Returns
    ///
    /// * `DatabaseResult<bool>` - True if connection is successful
    pub async fn health_check(&self) -> DatabaseResult<bool> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        Ok(true)
    }

    /// Close every connection; further acquires fail
    pub async fn shutdown(&self) {
        if self.pool.is_closed() {
            return;
        }

        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Whether [`Database::shutdown`] has run
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const REQUIRED: [(&str, &str); 5] = [
        ("DB_HOST", "localhost"),
        ("DB_NAME", "accounts"),
        ("DB_PORT", "5432"),
        ("DB_USER", "postgres"),
        ("DB_PASSWORD", "postgres"),
    ];

    const OPTIONAL: [&str; 3] = [
        "DB_MIN_CONNECTIONS",
        "DB_MAX_CONNECTIONS",
        "DB_ACQUIRE_TIMEOUT",
    ];

    fn clear_env() {
        unsafe {
            for (key, _) in REQUIRED {
                std::env::remove_var(key);
            }
            for key in OPTIONAL {
                std::env::remove_var(key);
            }
        }
    }

    fn set_required_env() {
        unsafe {
            for (key, value) in REQUIRED {
                std::env::set_var(key, value);
            }
        }
    }

    #[test]
    #[serial]
    fn test_database_config_from_env() {
        clear_env();
        set_required_env();

        let config = DatabaseConfig::from_env().unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.database, "accounts");
        assert_eq!(config.port, 5432);
        assert_eq!(config.user, "postgres");
        assert_eq!(config.password, "postgres");
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.acquire_timeout, 30);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_database_config_from_env_with_custom_values() {
        clear_env();
        set_required_env();
        unsafe {
            std::env::set_var("DB_MIN_CONNECTIONS", "2");
            std::env::set_var("DB_MAX_CONNECTIONS", "8");
            std::env::set_var("DB_ACQUIRE_TIMEOUT", "5");
        }

        let config = DatabaseConfig::from_env().unwrap();
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.acquire_timeout, 5);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_database_config_requires_credentials() {
        clear_env();
        set_required_env();
        unsafe {
            std::env::remove_var("DB_PASSWORD");
        }

        let err = DatabaseConfig::from_env().unwrap_err();
        assert!(matches!(err, DatabaseError::Configuration(_)));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_database_config_rejects_inverted_bounds() {
        clear_env();
        set_required_env();
        unsafe {
            std::env::set_var("DB_MIN_CONNECTIONS", "10");
            std::env::set_var("DB_MAX_CONNECTIONS", "2");
        }

        let err = DatabaseConfig::from_env().unwrap_err();
        assert!(matches!(err, DatabaseError::Configuration(_)));

        clear_env();
    }
}
