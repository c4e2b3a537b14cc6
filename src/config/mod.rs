use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::models::{ContactKind, ContactPolicy};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value `{value}`: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

// Top-level configuration, one section per concern
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub reservation: ReservationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_json: bool,
}

// No URL means the in-memory store
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub pool_size: u32,
}

// No URL means seat snapshots are not cached
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: Option<String>,
    pub seat_cache_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservationConfig {
    pub contact: ContactPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            app: AppConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                environment: "development".to_string(),
                rust_log: "cinema_reservations=debug,tower_http=debug".to_string(),
                log_json: false,
            },
            database: DatabaseConfig {
                url: None,
                pool_size: 10,
            },
            redis: RedisConfig {
                url: None,
                seat_cache_ttl_seconds: 300,
            },
            reservation: ReservationConfig {
                contact: ContactPolicy::default(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds the config from any variable source; unset variables keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let string = |var: &str, default: String| lookup(var).unwrap_or(default);
        let optional = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        Ok(Config {
            app: AppConfig {
                host: string("HOST", defaults.app.host),
                port: parse(&lookup, "PORT", defaults.app.port)?,
                environment: string("ENVIRONMENT", defaults.app.environment),
                rust_log: string("RUST_LOG", defaults.app.rust_log),
                log_json: lookup("LOG_FORMAT")
                    .map(|f| f.eq_ignore_ascii_case("json"))
                    .unwrap_or(defaults.app.log_json),
            },
            database: DatabaseConfig {
                url: optional("DATABASE_URL"),
                pool_size: parse(&lookup, "DB_POOL_SIZE", defaults.database.pool_size)?,
            },
            redis: RedisConfig {
                url: optional("REDIS_URL"),
                seat_cache_ttl_seconds: parse(
                    &lookup,
                    "SEAT_CACHE_TTL_SECONDS",
                    defaults.redis.seat_cache_ttl_seconds,
                )?,
            },
            reservation: ReservationConfig {
                contact: ContactPolicy {
                    kind: parse::<ContactKind, _>(&lookup, "CONTACT_KIND", defaults.reservation.contact.kind)?,
                    required: parse(&lookup, "CONTACT_REQUIRED", defaults.reservation.contact.required)?,
                },
            },
        })
    }
}

fn parse<T, F>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}
