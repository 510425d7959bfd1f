//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Read a `.env` file into the process environment, if one exists
//! 2. Load from `CARESLOT_*` environment variables when `CARESLOT_DB_PATH` is
//!    set
//! 3. Otherwise probe for a config file (JSON or TOML)
//!
//! ## Environment Variables
//! - `CARESLOT_DB_PATH`: Database file path (required for env loading)
//! - `CARESLOT_DB_POOL_SIZE`: Connection pool size
//! - `CARESLOT_CALENDAR_TOKEN`: Calendar access token; enables the calendar
//! - `CARESLOT_CALENDAR_ID`: Calendar id (default `primary`)
//! - `CARESLOT_CALENDAR_API_URL`: Calendar API base URL
//! - `CARESLOT_STRIPE_SECRET_KEY`: Payment gateway key; enables payments
//! - `CARESLOT_STRIPE_API_URL`: Payment gateway base URL
//! - `CARESLOT_TIME_ZONE`: Clinic IANA time zone
//! - `CARESLOT_APPOINTMENT_MINUTES`: Appointment length in minutes
//! - `CARESLOT_LOG_LEVEL`: Log filter when `RUST_LOG` is unset
//! - `CARESLOT_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! `config.{json,toml}` and `careslot.{json,toml}` in the working directory,
//! its two parents, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use careslot_domain::constants::{
    DEFAULT_APPOINTMENT_MINUTES, DEFAULT_CALENDAR_API_URL, DEFAULT_CALENDAR_ID,
    DEFAULT_DB_POOL_SIZE, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_PAYMENTS_API_URL, DEFAULT_TIME_ZONE,
};
use careslot_domain::{
    CalendarConfig, CareslotError, ClinicConfig, Config, DatabaseConfig, LoggingConfig,
    PaymentsConfig, Result,
};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["config.json", "config.toml", "careslot.json", "careslot.toml"];

/// Load and validate configuration.
///
/// # Errors
/// Returns `CareslotError::Config` if no source yields a configuration or the
/// result fails [`Config::validate`].
pub fn load() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env file");
    }

    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = %e, "environment incomplete, trying config file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from `CARESLOT_*` environment variables.
///
/// # Errors
/// Returns `CareslotError::Config` if `CARESLOT_DB_PATH` is missing or a
/// numeric variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let path = env_var("CARESLOT_DB_PATH")?;
    let pool_size = env_parse("CARESLOT_DB_POOL_SIZE", DEFAULT_DB_POOL_SIZE)?;

    let calendar = optional_env("CARESLOT_CALENDAR_TOKEN").map(|access_token| CalendarConfig {
        api_base_url: optional_env("CARESLOT_CALENDAR_API_URL")
            .unwrap_or_else(|| DEFAULT_CALENDAR_API_URL.to_string()),
        calendar_id: optional_env("CARESLOT_CALENDAR_ID")
            .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string()),
        access_token,
        timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
    });

    let payments = optional_env("CARESLOT_STRIPE_SECRET_KEY").map(|secret_key| PaymentsConfig {
        api_base_url: optional_env("CARESLOT_STRIPE_API_URL")
            .unwrap_or_else(|| DEFAULT_PAYMENTS_API_URL.to_string()),
        secret_key,
        timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
    });

    let clinic = ClinicConfig {
        time_zone: optional_env("CARESLOT_TIME_ZONE")
            .unwrap_or_else(|| DEFAULT_TIME_ZONE.to_string()),
        appointment_duration_minutes: env_parse(
            "CARESLOT_APPOINTMENT_MINUTES",
            DEFAULT_APPOINTMENT_MINUTES,
        )?,
    };

    let logging = LoggingConfig {
        level: optional_env("CARESLOT_LOG_LEVEL").unwrap_or_else(|| LoggingConfig::default().level),
        json: env_bool("CARESLOT_LOG_JSON", false),
    };

    Ok(Config { database: DatabaseConfig { path, pool_size }, calendar, payments, clinic, logging })
}

/// Load configuration from a file.
///
/// If `path` is `None`, probes the standard locations (see
/// [`probe_config_paths`]). The format follows the file extension.
///
/// # Errors
/// Returns `CareslotError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CareslotError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CareslotError::Config("no config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CareslotError::Config(format!("failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CareslotError::Config(format!("invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CareslotError::Config(format!("invalid JSON format: {e}"))),
        _ => Err(CareslotError::Config(format!("unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    optional_env(key).ok_or_else(|| {
        CareslotError::Config(format!("missing required environment variable: {key}"))
    })
}

/// Set and non-blank.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| CareslotError::Config(format!("invalid value for {key}: {e}"))),
        None => Ok(default),
    }
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
