use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

const DEFAULT_DATABASE_URL: &str = "sqlite://craving-companion.db?mode=rwc";
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} must be set together with {1}")]
    Incomplete(&'static str, &'static str),

    #[error("Failed to load environment file {path}: {source}")]
    EnvFile {
        path: String,
        source: dotenvy::Error,
    },
}

#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub session_ttl_hours: i64,
    pub session_cleanup_interval_secs: u64,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            session_cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
            bootstrap_admin: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let database_url = dotenvy::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(defaults.database_url);

        let session_ttl_hours = parse_var("SESSION_TTL_HOURS", defaults.session_ttl_hours)?;
        if session_ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "SESSION_TTL_HOURS",
                value: session_ttl_hours.to_string(),
            });
        }

        let session_cleanup_interval_secs = parse_var(
            "SESSION_CLEANUP_INTERVAL_SECS",
            defaults.session_cleanup_interval_secs,
        )?;
        if session_cleanup_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SESSION_CLEANUP_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }

        let bootstrap_admin = match (
            dotenvy::var("BOOTSTRAP_ADMIN_EMAIL").ok(),
            dotenvy::var("BOOTSTRAP_ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::Incomplete(
                    "BOOTSTRAP_ADMIN_EMAIL",
                    "BOOTSTRAP_ADMIN_PASSWORD",
                ));
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete(
                    "BOOTSTRAP_ADMIN_PASSWORD",
                    "BOOTSTRAP_ADMIN_EMAIL",
                ));
            }
        };

        Ok(Self {
            database_url,
            session_ttl_hours,
            session_cleanup_interval_secs,
            bootstrap_admin,
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match dotenvy::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default),
    }
}

pub fn load_environment() -> Result<(), ConfigError> {
    let is_production =
        dotenvy::var("ROCKET_PROFILE").unwrap_or("development".to_string()) == "production";

    let env_files = if is_production {
        vec!["config/common.env", "config/prod.env", ".secrets.env"]
    } else {
        vec!["config/common.env", "config/dev.env", ".secrets.env"]
    };

    for env_file in env_files {
        load_env_file(env_file)?;
    }

    Ok(())
}

fn load_env_file(path: &str) -> Result<(), ConfigError> {
    if !Path::new(path).exists() {
        warn!("Environment file {} not found, skipping", path);
        return Ok(());
    }

    dotenvy::from_filename_override(path).map_err(|source| ConfigError::EnvFile {
        path: path.to_string(),
        source,
    })?;
    info!("Loaded environment from: {}", path);
    Ok(())
}
