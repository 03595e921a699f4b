//! Configuration loader for the `sensormap` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::{env, net::SocketAddr, time::Duration};

use anyhow::{anyhow, bail, Result};

use crate::focus::DEFAULT_FALLBACK;
use crate::models::{Channel, Position};
use crate::validity::SentinelPolicy;

/// Parse an optional environment variable of the given type with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.trim().parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Where refresh cycles read raw records from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// The local `sensor_data` table.
    Postgres,
    /// An upstream list endpoint.
    Http { url: String },
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,

    pub source: SourceKind,

    /// Records requested per refresh.
    pub fetch_limit: u32,

    pub refresh_interval: Duration,

    /// Local time offset for calendar-day grouping, minutes east of UTC.
    pub utc_offset_minutes: i32,

    /// Viewport center when no reading has a GPS fix.
    pub fallback: Position,

    pub sentinel_policy: SentinelPolicy,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – PostgreSQL connection string
/// - `SENSOR_API_URL` – only when `READINGS_SOURCE=http`
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `BIND_ADDR` – listen address (default: 0.0.0.0:8080)
/// - `READINGS_SOURCE` – `postgres` or `http` (default: postgres)
/// - `FETCH_LIMIT` – records per refresh (default: 100)
/// - `REFRESH_INTERVAL_SECS` – refresh period (default: 5)
/// - `DISPLAY_UTC_OFFSET_MINUTES` – local day offset (default: -180)
/// - `FALLBACK_LAT`, `FALLBACK_LNG` – default map center (São Paulo)
/// - `ZERO_IS_DATA` – comma-separated channels where 0 is a real reading
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DATABASE_URL");
    let db_pool_max = parse_env!("DB_POOL_MAX", u32, 5);
    let bind_addr = parse_env!("BIND_ADDR", SocketAddr, SocketAddr::from(([0, 0, 0, 0], 8080)));

    let source = match env::var("READINGS_SOURCE").ok().as_deref().map(str::trim) {
        None | Some("") | Some("postgres") => SourceKind::Postgres,
        Some("http") => SourceKind::Http {
            url: require_env!("SENSOR_API_URL"),
        },
        Some(other) => bail!("Invalid READINGS_SOURCE: {} (expected postgres or http)", other),
    };

    let fetch_limit = parse_env!("FETCH_LIMIT", u32, 100);
    let refresh_secs = parse_env!("REFRESH_INTERVAL_SECS", u64, 5);
    if refresh_secs == 0 {
        bail!("Invalid REFRESH_INTERVAL_SECS: must be at least 1");
    }
    let utc_offset_minutes = parse_env!("DISPLAY_UTC_OFFSET_MINUTES", i32, -180);
    let fallback = Position::new(
        parse_env!("FALLBACK_LAT", f64, DEFAULT_FALLBACK.lat),
        parse_env!("FALLBACK_LNG", f64, DEFAULT_FALLBACK.lng),
    );

    let sentinel_policy = match env::var("ZERO_IS_DATA") {
        Ok(list) => parse_zero_is_data(&list)?,
        Err(_) => SentinelPolicy::default(),
    };

    Ok(Config {
        db_url,
        db_pool_max,
        bind_addr,
        source,
        fetch_limit,
        refresh_interval: Duration::from_secs(refresh_secs),
        utc_offset_minutes,
        fallback,
        sentinel_policy,
    })
}

/// Parse a comma-separated channel list such as `humidity,mq9`.
fn parse_zero_is_data(list: &str) -> Result<SentinelPolicy> {
    // ---
    let channels = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Channel>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow!("Invalid ZERO_IS_DATA: {}", e))?;
    Ok(SentinelPolicy::zero_is_data_for(&channels))
}

/// Mask the password in a connection URL for logging.
fn mask_db_url(db_url: &str) -> String {
    // ---
    if let Some(at_pos) = db_url.rfind('@') {
        if let Some(colon_pos) = db_url[..at_pos].rfind(':') {
            // A colon right after "scheme://" means there is no password.
            if !db_url[..colon_pos].ends_with('/') && db_url[..colon_pos].contains("//") {
                return format!("{}:****{}", &db_url[..colon_pos], &db_url[at_pos..]);
            }
        }
    }
    db_url.to_string()
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks sensitive information like database passwords while showing
    /// all configuration values that were loaded.
    pub fn log_config(&self) {
        // ---
        let source = match &self.source {
            SourceKind::Postgres => "postgres".to_string(),
            SourceKind::Http { url } => format!("http ({})", url),
        };
        let zero_is_data: Vec<&str> = Channel::ALL
            .iter()
            .filter(|c| !self.sentinel_policy.zero_is_missing(**c))
            .map(|c| c.as_str())
            .collect();

        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL               : {}", mask_db_url(&self.db_url));
        tracing::info!("  DB_POOL_MAX                : {}", self.db_pool_max);
        tracing::info!("  BIND_ADDR                  : {}", self.bind_addr);
        tracing::info!("  READINGS_SOURCE            : {}", source);
        tracing::info!("  FETCH_LIMIT                : {}", self.fetch_limit);
        tracing::info!("  REFRESH_INTERVAL_SECS      : {}", self.refresh_interval.as_secs());
        tracing::info!("  DISPLAY_UTC_OFFSET_MINUTES : {}", self.utc_offset_minutes);
        tracing::info!("  FALLBACK                   : ({}, {})", self.fallback.lat, self.fallback.lng);
        tracing::info!("  ZERO_IS_DATA               : {:?}", zero_is_data);
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_mask_db_url() {
        // ---
        assert_eq!(
            mask_db_url("postgres://sensor:secret@db:5432/readings"),
            "postgres://sensor:****@db:5432/readings"
        );
        assert_eq!(
            mask_db_url("postgres://sensor@db/readings"),
            "postgres://sensor@db/readings"
        );
        assert_eq!(mask_db_url("postgres://localhost/readings"), "postgres://localhost/readings");
    }

    #[test]
    fn test_parse_zero_is_data() {
        // ---
        let policy = parse_zero_is_data("humidity, mq9").unwrap();
        assert!(!policy.zero_is_missing(Channel::Humidity));
        assert!(!policy.zero_is_missing(Channel::GasChannelA));
        assert!(policy.zero_is_missing(Channel::Temperature));

        assert_eq!(parse_zero_is_data("").unwrap(), SentinelPolicy::default());
        assert!(parse_zero_is_data("humidity,pressure").is_err());
    }
}
