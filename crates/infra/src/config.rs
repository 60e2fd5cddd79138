//! Process configuration read from environment variables.
//!
//! Parsing goes through `from_lookup` so tests can feed a map instead of
//! touching the process environment.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use stocklookup_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_JWT_SECRET: &str = "dev-secret";
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Credentials of the account seeded at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevUser {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// `None` runs on the in-memory stores.
    pub database_url: Option<String>,
    pub store_timeout: Duration,
    pub session_ttl: chrono::Duration,
    pub log_format: LogFormat,
    pub dev_user: DevUser,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = parse_or("BIND_ADDR", get("BIND_ADDR"), DEFAULT_BIND_ADDR.parse::<SocketAddr>())?;

        let store_timeout_ms: u64 = parse_or("STORE_TIMEOUT_MS", get("STORE_TIMEOUT_MS"), Ok(DEFAULT_STORE_TIMEOUT_MS))?;
        if store_timeout_ms == 0 {
            return Err(invalid("STORE_TIMEOUT_MS", "0", "must be greater than zero"));
        }

        let ttl_hours: i64 = parse_or("SESSION_TTL_HOURS", get("SESSION_TTL_HOURS"), Ok(DEFAULT_SESSION_TTL_HOURS))?;
        if !(1..=24 * 365).contains(&ttl_hours) {
            return Err(invalid("SESSION_TTL_HOURS", &ttl_hours.to_string(), "must be between 1 and 8760"));
        }

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| invalid("LOG_FORMAT", &raw, &e.to_string()))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            jwt_secret: get("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
            database_url: get("DATABASE_URL"),
            store_timeout: Duration::from_millis(store_timeout_ms),
            session_ttl: chrono::Duration::hours(ttl_hours),
            log_format,
            dev_user: DevUser {
                name: get("DEV_USER_NAME").unwrap_or_else(|| "admin".to_string()),
                password: get("DEV_USER_PASSWORD").unwrap_or_else(|| "admin".to_string()),
            },
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: Result<T, T::Err>) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.parse::<T>().map_err(|e| invalid(key, &raw, &e.to_string())),
        None => default.map_err(|e| invalid(key, "<default>", &e.to_string())),
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
