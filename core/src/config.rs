//! Typed `EngineConfig`, loaded once at startup from the environment variables listed in §6's
//! configuration table. Grounded on the environment-driven credential loader pattern used
//! elsewhere in the pack (`ExchangeCredentials::from_env`) but returning a `thiserror` enum
//! instead of a boxed error, matching this workspace's error-handling convention.

use algotrade_instrument::AccountId;
use chrono::NaiveTime;
use thiserror::Error;

const DEFAULT_LISTEN_PORT: u16 = 2260;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("environment variable {var} has an invalid value {value:?}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Fluentd log-shipping settings (§6 `FLUENTD_ENABLE/HOST/PORT/LEVEL`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FluentdConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub level: String,
}

/// Persistence backend connection settings (§6 `DB_HOSTNAME/PASSWORD/NAME`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub hostname: String,
    pub password: String,
    pub name: String,
}

/// Startup configuration for the engine binary, parsed once and handed to every component that
/// needs it (§9 "Configuration").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub log_level: String,
    pub log_json: bool,
    pub trading_enabled: bool,
    pub daily_clean_time: NaiveTime,
    pub fluentd: FluentdConfig,
    pub ws_baseurl: String,
    pub ws_ssl_verify: bool,
    pub db: DatabaseConfig,
    pub account_id: AccountId,
    pub listen_port: u16,
}

impl EngineConfig {
    /// Loads configuration from the process environment. `ACCOUNT_ID` is the only variable
    /// without a sensible default (§1: the engine drives exactly one account).
    pub fn from_env() -> Result<Self, ConfigError> {
        let account_id = require("ACCOUNT_ID")?;

        Ok(Self {
            log_level: optional("LOG_LEVEL", "info"),
            log_json: optional_bool("LOG_QUERY", false)?,
            trading_enabled: optional_bool("TRADING_ENABLE", true)?,
            daily_clean_time: parse_daily_clean_time(&optional("DAILY_CLEAN_TIME", "18:00"))?,
            fluentd: FluentdConfig {
                enabled: optional_bool("FLUENTD_ENABLE", false)?,
                host: optional("FLUENTD_HOST", "localhost"),
                port: optional_parsed("FLUENTD_PORT", 24224)?,
                level: optional("FLUENTD_LEVEL", "info"),
            },
            ws_baseurl: optional("WS_BASEURL", "ws://localhost:8080"),
            ws_ssl_verify: optional_bool("WS_SSL_VERIFY", true)?,
            db: DatabaseConfig {
                hostname: optional("DB_HOSTNAME", "localhost"),
                password: optional("DB_PASSWORD", ""),
                name: optional("DB_NAME", "algotrade"),
            },
            account_id: AccountId(account_id),
            listen_port: optional_parsed("LISTEN_PORT", DEFAULT_LISTEN_PORT)?,
        })
    }
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::MissingVar(var))
}

fn optional(var: &'static str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

fn optional_bool(var: &'static str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(var) {
        Err(_) => Ok(default),
        Ok(value) => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                var,
                value,
                reason: "expected a boolean (true/false/1/0/yes/no/on/off)".to_string(),
            }),
        },
    }
}

fn optional_parsed<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Err(_) => Ok(default),
        Ok(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
            var,
            value,
            reason: "could not parse value".to_string(),
        }),
    }
}

fn parse_daily_clean_time(value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| ConfigError::InvalidValue {
        var: "DAILY_CLEAN_TIME",
        value: value.to_string(),
        reason: "expected HH:MM".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_daily_clean_time() {
        assert_eq!(
            parse_daily_clean_time("18:00").unwrap(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap()
        );
    }

    #[test]
    fn rejects_malformed_daily_clean_time() {
        assert!(parse_daily_clean_time("not-a-time").is_err());
    }

    #[test]
    fn optional_bool_accepts_common_spellings() {
        std::env::remove_var("TEST_FLAG_ACCEPTS");
        assert!(optional_bool("TEST_FLAG_ACCEPTS", true).unwrap());
    }
}
