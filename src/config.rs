//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::settlement::SettlementConfig;
use crate::validation::{Denylist, FaultInjection};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL; in-memory stores are used when absent
    pub database_url: Option<String>,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Lifetime of a login session
    pub session_ttl_minutes: i64,

    /// Settlement delay bounds (seconds, inclusive)
    pub settlement_min_delay_secs: u64,
    pub settlement_max_delay_secs: u64,

    /// Probability that a settlement simulation succeeds
    pub settlement_success_rate: f64,

    /// Simulated network and insufficient-funds rejections at submission
    pub fault_injection_enabled: bool,
    pub network_failure_rate: f64,
    pub insufficient_funds_rate: f64,

    /// Extra accounts blocked on top of the built-in denylist
    pub blocked_accounts: Vec<String>,

    /// Allowed CORS origins; `*` allows any
    pub cors_allowed_origins: Vec<String>,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(&lookup, "PORT", 8001)?;
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let session_ttl_minutes: i64 = parse_or(&lookup, "SESSION_TTL_MINUTES", 30)?;
        if session_ttl_minutes <= 0 {
            return Err(ConfigError::InvalidValue("SESSION_TTL_MINUTES"));
        }

        let settlement_min_delay_secs: u64 = parse_or(&lookup, "SETTLEMENT_MIN_DELAY_SECS", 3)?;
        let settlement_max_delay_secs: u64 = parse_or(&lookup, "SETTLEMENT_MAX_DELAY_SECS", 15)?;
        if settlement_min_delay_secs > settlement_max_delay_secs {
            return Err(ConfigError::InvalidValue("SETTLEMENT_MIN_DELAY_SECS"));
        }

        let settlement_success_rate = parse_rate(&lookup, "SETTLEMENT_SUCCESS_RATE", 0.85)?;
        let fault_injection_enabled = parse_bool(&lookup, "FAULT_INJECTION_ENABLED", true)?;
        let network_failure_rate = parse_rate(&lookup, "NETWORK_FAILURE_RATE", 0.05)?;
        let insufficient_funds_rate = parse_rate(&lookup, "INSUFFICIENT_FUNDS_RATE", 0.10)?;

        let blocked_accounts = parse_list(lookup("BLOCKED_ACCOUNTS"));
        let cors_allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(value) => parse_list(Some(value)),
            None => vec!["*".to_string()],
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(_) => return Err(ConfigError::InvalidValue("LOG_FORMAT")),
        };

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            session_ttl_minutes,
            settlement_min_delay_secs,
            settlement_max_delay_secs,
            settlement_success_rate,
            fault_injection_enabled,
            network_failure_rate,
            insufficient_funds_rate,
            blocked_accounts,
            cors_allowed_origins,
            log_format,
        })
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_ttl_minutes)
    }

    pub fn settlement(&self) -> SettlementConfig {
        SettlementConfig {
            min_delay: Duration::from_secs(self.settlement_min_delay_secs),
            max_delay: Duration::from_secs(self.settlement_max_delay_secs),
            success_rate: self.settlement_success_rate,
        }
    }

    pub fn fault_injection(&self) -> FaultInjection {
        FaultInjection {
            enabled: self.fault_injection_enabled,
            network_failure_rate: self.network_failure_rate,
            insufficient_funds_rate: self.insufficient_funds_rate,
        }
    }

    pub fn denylist(&self) -> Denylist {
        Denylist::with_defaults().extend(&self.blocked_accounts)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue(key)),
        None => Ok(default),
    }
}

fn parse_rate<F>(lookup: &F, key: &'static str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let rate: f64 = parse_or(lookup, key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidValue(key))
    }
}

fn parse_bool<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|raw| raw.trim().to_ascii_lowercase()).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(_) => Err(ConfigError::InvalidValue(key)),
    }
}

fn parse_list(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
