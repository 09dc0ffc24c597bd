//! Service configuration loaded from the environment

use anyhow::{Context, Result};
use common::DatabaseConfig;
use serde::Deserialize;

/// Minimum length of `APP_SECRET_KEY`, in bytes
pub const MIN_SECRET_KEY_LEN: usize = 32;

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

#[derive(Deserialize)]
struct AppSettings {
    secret_key: String,
    #[serde(default = "default_bind_address")]
    bind_address: String,
    #[serde(default)]
    secure_cookies: bool,
}

/// Everything the service needs at startup
#[derive(Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    /// Master secret the session signing key is derived from
    pub secret_key: String,
    pub bind_address: String,
    pub secure_cookies: bool,
}

impl AppConfig {
    /// Create a new AppConfig from environment variables
    ///
    /// # Environment Variables
    /// - `DB_*`: see [`DatabaseConfig::from_env`]
    /// - `APP_SECRET_KEY`: session signing secret, at least 32 bytes
    /// - `APP_BIND_ADDRESS`: listen address (default: "0.0.0.0:3000")
    /// - `APP_SECURE_COOKIES`: mark cookies `Secure` (default: false)
    pub fn from_env() -> Result<Self> {
        let database = DatabaseConfig::from_env()?;

        let settings: AppSettings = config::Config::builder()
            .add_source(config::Environment::with_prefix("APP"))
            .build()
            .and_then(|settings| settings.try_deserialize())
            .context("Failed to load application settings (is APP_SECRET_KEY set?)")?;

        if settings.secret_key.len() < MIN_SECRET_KEY_LEN {
            anyhow::bail!(
                "APP_SECRET_KEY must be at least {} bytes long",
                MIN_SECRET_KEY_LEN
            );
        }

        Ok(AppConfig {
            database,
            secret_key: settings.secret_key,
            bind_address: settings.bind_address,
            secure_cookies: settings.secure_cookies,
        })
    }
}
