//! Application configuration loading from config.toml
//!
//! `config.toml` carries non-secret settings (bind address, token lifetimes)
//! and the list of administrator accounts to seed at startup. Secrets such as
//! `JWT_SECRET` and `ADMIN_PASSWORD` are read from the environment directly
//! before use and are never stored here.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Token lifetimes
    #[serde(default)]
    pub auth: AuthConfig,
    /// Administrator accounts to create if missing
    #[serde(default)]
    pub admins: Vec<AdminConfig>,
}

/// HTTP server settings
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Token lifetimes
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Access token lifetime in minutes
    #[serde(default = "default_access_token_minutes")]
    pub access_token_minutes: i64,
    /// Refresh token lifetime in days
    #[serde(default = "default_refresh_token_days")]
    pub refresh_token_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_minutes: default_access_token_minutes(),
            refresh_token_days: default_refresh_token_days(),
        }
    }
}

/// An administrator account to seed
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    /// Login name
    pub username: String,
    /// Contact e-mail
    pub email: String,
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

const fn default_access_token_minutes() -> i64 {
    60
}

const fn default_refresh_token_days() -> i64 {
    7
}

/// Loads application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Token lifetimes are not positive
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Parses and validates configuration text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if config.auth.access_token_minutes <= 0 || config.auth.refresh_token_days <= 0 {
        return Err(Error::Config {
            message: "Token lifetimes must be positive".to_string(),
        });
    }

    Ok(config)
}

/// Loads configuration from `./config.toml`, falling back to defaults when
/// the file does not exist.
pub fn load_default_config() -> Result<AppConfig> {
    let path = Path::new("config.toml");
    if path.exists() {
        load_config(path)
    } else {
        tracing::info!("No config.toml found, using default configuration");
        Ok(AppConfig::default())
    }
}
