//! Configuration loading and validation.
//!
//! The configuration surface is the process environment, injected into the
//! components at construction. Required values fail fast at startup, before
//! the poll timer ever starts. The Influx block is all-or-none: leaving it
//! out disables the persistent sink without affecting the live view.
//!
//! Variables:
//! - `BMS_URL` (required), `BMS_TOKEN` (required)
//! - `BMS_INSTALLATION_ID` (default `bms-live`)
//! - `POLL_INTERVAL_SECS` (default 300)
//! - `HISTORY_CAPACITY` (default 1000)
//! - `REQUEST_TIMEOUT_SECS` (default 30)
//! - `POINT_FILTER` (default `all`; one of all/pumps/valves/ahu/temp)
//! - `STALE_AFTER_INTERVALS` (default 2)
//! - `INFLUX_URL`, `INFLUX_TOKEN`, `INFLUX_ORG`, `INFLUX_BUCKET` (optional,
//!   all four together)

use crate::sink::InfluxConfig;
use crate::store::PointFilter;
use std::collections::HashMap;
use std::str::FromStr;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_STALE_AFTER_INTERVALS: u32 = 2;

/// Errors raised while loading configuration. All of them are fatal at
/// startup.
#[derive(Debug)]
pub enum ConfigError {
    MissingVar(String),
    InvalidVar(String),
    PartialSinkConfig(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVar(key) => write!(f, "Missing required variable: {}", key),
            ConfigError::InvalidVar(msg) => write!(f, "Invalid variable: {}", msg),
            ConfigError::PartialSinkConfig(msg) => {
                write!(f, "Partial sink configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Fully validated collector settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bms_url: String,
    pub bms_token: String,
    pub installation_id: String,
    pub poll_interval_secs: u64,
    pub history_capacity: usize,
    pub request_timeout_secs: u64,
    pub point_filter: PointFilter,
    pub stale_after_intervals: u32,
    pub influx: Option<InfluxConfig>,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_map(&vars)
    }

    /// Load settings from an explicit variable map.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bms_url = required(vars, "BMS_URL")?;
        let bms_token = required(vars, "BMS_TOKEN")?;

        let installation_id =
            optional(vars, "BMS_INSTALLATION_ID").unwrap_or_else(|| "bms-live".to_string());

        let poll_interval_secs =
            parsed(vars, "POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?;
        if poll_interval_secs == 0 {
            return Err(ConfigError::InvalidVar(
                "POLL_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }

        let history_capacity = parsed(vars, "HISTORY_CAPACITY", DEFAULT_HISTORY_CAPACITY)?;
        if history_capacity == 0 {
            return Err(ConfigError::InvalidVar(
                "HISTORY_CAPACITY must be greater than zero".to_string(),
            ));
        }

        let request_timeout_secs =
            parsed(vars, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        let point_filter = match optional(vars, "POINT_FILTER") {
            Some(name) => PointFilter::parse(&name).ok_or_else(|| {
                ConfigError::InvalidVar(format!(
                    "POINT_FILTER '{}' is not one of all, pumps, valves, ahu, temp",
                    name
                ))
            })?,
            None => PointFilter::All,
        };

        let stale_after_intervals =
            parsed(vars, "STALE_AFTER_INTERVALS", DEFAULT_STALE_AFTER_INTERVALS)?;

        let influx = load_influx(vars)?;

        Ok(Settings {
            bms_url,
            bms_token,
            installation_id,
            poll_interval_secs,
            history_capacity,
            request_timeout_secs,
            point_filter,
            stale_after_intervals,
            influx,
        })
    }
}

fn load_influx(vars: &HashMap<String, String>) -> Result<Option<InfluxConfig>, ConfigError> {
    let keys = ["INFLUX_URL", "INFLUX_TOKEN", "INFLUX_ORG", "INFLUX_BUCKET"];
    let present: Vec<&str> =
        keys.iter().copied().filter(|key| optional(vars, key).is_some()).collect();

    if present.is_empty() {
        return Ok(None);
    }

    if present.len() != keys.len() {
        let missing: Vec<&str> =
            keys.iter().copied().filter(|key| !present.contains(key)).collect();
        return Err(ConfigError::PartialSinkConfig(format!(
            "set all of INFLUX_URL, INFLUX_TOKEN, INFLUX_ORG, INFLUX_BUCKET or none (missing: {})",
            missing.join(", ")
        )));
    }

    Ok(Some(InfluxConfig {
        url: required(vars, "INFLUX_URL")?,
        token: required(vars, "INFLUX_TOKEN")?,
        org: required(vars, "INFLUX_ORG")?,
        bucket: required(vars, "INFLUX_BUCKET")?,
    }))
}

fn required(vars: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    optional(vars, key).ok_or_else(|| ConfigError::MissingVar(key.to_string()))
}

fn optional(vars: &HashMap<String, String>, key: &str) -> Option<String> {
    vars.get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(
    vars: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match optional(vars, key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidVar(format!("{} has invalid value '{}'", key, raw))),
        None => Ok(default),
    }
}
