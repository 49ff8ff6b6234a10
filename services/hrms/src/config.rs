//! Service configuration
//!
//! Settings are read once at startup from an optional `hrms.{toml,yaml,json}`
//! file, overlaid by environment variables with the same (unprefixed) names,
//! e.g. `DATABASE_URL` or `ACCESS_TOKEN_EXPIRE_MINUTES`.

use anyhow::Result;
use argon2::Params;
use common::database::DatabaseConfig;
use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::jwt::JwtConfig;

/// Placeholder secret that must be replaced outside local development
pub const DEFAULT_SECRET_KEY: &str = "change_me";

/// Application settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_min_connections: u32,
    /// Seconds to wait for a pooled connection
    pub database_connection_timeout: u64,
    pub secret_key: String,
    pub jwt_algorithm: String,
    pub access_token_expire_minutes: u64,
    pub refresh_token_expire_minutes: u64,
    /// Argon2 memory cost in KiB
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
    pub admin_username: String,
    pub admin_email: String,
    /// The initial administrator is only seeded when this is set
    pub admin_password: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let database = DatabaseConfig::default();
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            database_url: database.database_url,
            database_max_connections: database.max_connections,
            database_min_connections: database.min_connections,
            database_connection_timeout: database.connection_timeout,
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            jwt_algorithm: "HS256".to_string(),
            access_token_expire_minutes: 30,
            refresh_token_expire_minutes: 60 * 24 * 7,
            argon2_memory_kib: Params::DEFAULT_M_COST,
            argon2_iterations: Params::DEFAULT_T_COST,
            argon2_parallelism: Params::DEFAULT_P_COST,
            admin_username: "admin".to_string(),
            admin_email: "admin@example.com".to_string(),
            admin_password: None,
        }
    }
}

impl Settings {
    /// Load settings from the optional config file and the environment
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name("hrms").required(false))
            .add_source(Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig {
            database_url: self.database_url.clone(),
            max_connections: self.database_max_connections,
            min_connections: self.database_min_connections,
            connection_timeout: self.database_connection_timeout,
        }
    }

    /// Token settings, with expiry windows converted to seconds
    pub fn jwt(&self) -> Result<JwtConfig> {
        JwtConfig::new(
            self.secret_key.clone(),
            &self.jwt_algorithm,
            self.access_token_expire_minutes * 60,
            self.refresh_token_expire_minutes * 60,
        )
    }

    pub fn password_params(&self) -> Result<Params> {
        Params::new(
            self.argon2_memory_kib,
            self.argon2_iterations,
            self.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid argon2 parameters: {}", e))
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}
