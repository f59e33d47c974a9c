//! Configuration loader for the `weather-monitor` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::{env, fs, net::SocketAddr, path::Path, path::PathBuf};

use anyhow::{anyhow, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::{AlertPolicy, Units, Zone};

/// Default OpenWeatherMap current weather endpoint.
pub const DEFAULT_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Parse an optional environment variable with a default value.
macro_rules! parse_env {
    ($lookup:expr, $var_name:expr, $ty:ty, $default:expr) => {
        $lookup($var_name)
            .map(|v| v.trim().parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($lookup:expr, $var_name:expr) => {
        $lookup($var_name)
            .ok_or_else(|| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// OpenWeatherMap API key.
    pub api_key: String,

    /// Provider endpoint.
    pub api_url: String,

    /// Location query, e.g. `Delhi,IN`.
    pub location: String,

    /// Unit system requested from the provider.
    pub units: Units,

    /// Alert threshold in °C.
    pub temp_threshold: f64,

    /// Consecutive breaches needed to raise an alert.
    pub consecutive_updates: u32,

    /// Minutes between polls.
    pub update_interval_minutes: u32,

    /// Wall-clock time of the daily summary.
    pub daily_summary_time: NaiveTime,

    /// SQLite connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool. In-memory
    /// databases always get one connection, see [`Config::pool_size`].
    pub db_pool_max: u32,

    /// Calendar used for dates and the summary schedule.
    pub zone: Zone,

    /// Where the startup configuration snapshot is written.
    pub snapshot_path: PathBuf,

    /// Output directory for charts.
    pub chart_dir: PathBuf,

    /// Bind address of the read-only HTTP API.
    pub http_addr: SocketAddr,
}

/// The persisted subset of [`Config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub location: String,
    pub temp_threshold: f64,
    pub consecutive_updates: u32,
    pub update_interval_minutes: u32,
    pub daily_summary_time: String,
}

/// Parse an `HH:MM` time of day.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|e| anyhow!("Invalid time of day '{}', expected HH:MM: {}", value, e))
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `OPENWEATHER_API_KEY` – provider API key
///
/// Optional:
/// - `WEATHER_LOCATION` – location query (default: `Delhi,IN`)
/// - `WEATHER_UNITS` – `metric`, `imperial` or `standard` (default: `metric`)
/// - `WEATHER_API_URL` – provider endpoint (default: OpenWeatherMap)
/// - `TEMP_THRESHOLD` – alert threshold in °C (default: 35)
/// - `CONSECUTIVE_UPDATES` – breaches before alerting (default: 2)
/// - `UPDATE_INTERVAL_MINUTES` – poll interval (default: 5)
/// - `DAILY_SUMMARY_TIME` – `HH:MM` (default: `23:59`)
/// - `DATABASE_URL` – SQLite connection string (default: `sqlite://weather_data.db`)
/// - `DB_POOL_MAX` – max DB connections (default: 5, ignored for in-memory URLs)
/// - `TZ_OFFSET_MINUTES` – fixed UTC offset for dates (default: system local zone)
/// - `CONFIG_SNAPSHOT_PATH` – snapshot file (default: `config.json`)
/// - `CHART_DIR` – chart output directory (default: `charts`)
/// - `HTTP_ADDR` – API bind address (default: `0.0.0.0:8080`)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    load_with(|name| env::var(name).ok())
}

/// Load configuration through an arbitrary variable lookup.
pub fn load_with<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    // ---
    let api_key = require_env!(lookup, "OPENWEATHER_API_KEY");
    let api_url = lookup("WEATHER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let location = lookup("WEATHER_LOCATION").unwrap_or_else(|| "Delhi,IN".to_string());
    let units = parse_env!(lookup, "WEATHER_UNITS", Units, Units::Metric);
    let temp_threshold = parse_env!(lookup, "TEMP_THRESHOLD", f64, 35.0);
    let consecutive_updates = parse_env!(lookup, "CONSECUTIVE_UPDATES", u32, 2);
    let update_interval_minutes = parse_env!(lookup, "UPDATE_INTERVAL_MINUTES", u32, 5);
    let daily_summary_time = match lookup("DAILY_SUMMARY_TIME") {
        Some(value) => parse_time_of_day(&value)?,
        None => NaiveTime::from_hms_opt(23, 59, 0)
            .ok_or_else(|| anyhow!("Invalid default summary time"))?,
    };
    let db_url = lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://weather_data.db".to_string());
    let db_pool_max = parse_env!(lookup, "DB_POOL_MAX", u32, 5);
    let zone = match lookup("TZ_OFFSET_MINUTES") {
        Some(value) => {
            let minutes = value
                .trim()
                .parse::<i32>()
                .map_err(|e| anyhow!("Invalid TZ_OFFSET_MINUTES: {}", e))?;
            Zone::from_offset_minutes(minutes)
                .ok_or_else(|| anyhow!("TZ_OFFSET_MINUTES out of range: {}", minutes))?
        }
        None => Zone::Local,
    };
    let snapshot_path = PathBuf::from(
        lookup("CONFIG_SNAPSHOT_PATH").unwrap_or_else(|| "config.json".to_string()),
    );
    let chart_dir = PathBuf::from(lookup("CHART_DIR").unwrap_or_else(|| "charts".to_string()));
    let http_addr = parse_env!(
        lookup,
        "HTTP_ADDR",
        SocketAddr,
        SocketAddr::from(([0, 0, 0, 0], 8080))
    );

    if consecutive_updates == 0 {
        return Err(anyhow!("CONSECUTIVE_UPDATES must be at least 1"));
    }
    if update_interval_minutes == 0 {
        return Err(anyhow!("UPDATE_INTERVAL_MINUTES must be at least 1"));
    }
    if db_pool_max == 0 {
        return Err(anyhow!("DB_POOL_MAX must be at least 1"));
    }
    if !temp_threshold.is_finite() {
        return Err(anyhow!("TEMP_THRESHOLD must be a finite number"));
    }

    Ok(Config {
        api_key,
        api_url,
        location,
        units,
        temp_threshold,
        consecutive_updates,
        update_interval_minutes,
        daily_summary_time,
        db_url,
        db_pool_max,
        zone,
        snapshot_path,
        chart_dir,
        http_addr,
    })
}

impl Config {
    // ---
    pub fn alert_policy(&self) -> AlertPolicy {
        AlertPolicy {
            threshold: self.temp_threshold,
            required_streak: self.consecutive_updates,
        }
    }

    /// Whether `db_url` names an in-memory SQLite database.
    pub fn is_in_memory_db(&self) -> bool {
        self.db_url.contains(":memory:") || self.db_url.contains("mode=memory")
    }

    /// Connections to open for `db_url`.
    ///
    /// Every connection to an in-memory database gets its own empty database,
    /// so those are limited to one.
    pub fn pool_size(&self) -> u32 {
        if self.is_in_memory_db() {
            1
        } else {
            self.db_pool_max
        }
    }

    pub fn poll_interval(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.update_interval_minutes))
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        // ---
        ConfigSnapshot {
            location: self.location.clone(),
            temp_threshold: self.temp_threshold,
            consecutive_updates: self.consecutive_updates,
            update_interval_minutes: self.update_interval_minutes,
            daily_summary_time: self.daily_summary_time.format("%H:%M").to_string(),
        }
    }

    /// Write the snapshot as JSON. The API key is never included.
    pub fn write_snapshot(&self, path: &Path) -> Result<()> {
        // ---
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        fs::write(path, json)
            .map_err(|e| anyhow!("Failed to write config snapshot '{}': {}", path.display(), e))?;
        tracing::info!("Configuration snapshot written to {}", path.display());
        Ok(())
    }

    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks the API key while showing all configuration values that were
    /// loaded.
    pub fn log_config(&self) {
        // ---
        let masked_key = match self.api_key.len() {
            0..=4 => "****".to_string(),
            n => format!("****{}", self.api_key.get(n - 4..).unwrap_or_default()),
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  OPENWEATHER_API_KEY     : {}", masked_key);
        tracing::info!("  WEATHER_API_URL         : {}", self.api_url);
        tracing::info!("  WEATHER_LOCATION        : {}", self.location);
        tracing::info!("  WEATHER_UNITS           : {}", self.units.as_query());
        tracing::info!("  TEMP_THRESHOLD          : {}", self.temp_threshold);
        tracing::info!("  CONSECUTIVE_UPDATES     : {}", self.consecutive_updates);
        tracing::info!("  UPDATE_INTERVAL_MINUTES : {}", self.update_interval_minutes);
        tracing::info!("  DAILY_SUMMARY_TIME      : {}", self.daily_summary_time.format("%H:%M"));
        tracing::info!("  DATABASE_URL            : {}", self.db_url);
        tracing::info!("  DB_POOL_MAX             : {}", self.db_pool_max);
        tracing::info!("  TZ                      : {:?}", self.zone);
        tracing::info!("  CHART_DIR               : {}", self.chart_dir.display());
        tracing::info!("  HTTP_ADDR               : {}", self.http_addr);
    }
}
