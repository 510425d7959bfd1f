//! Configuration management

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_APPOINTMENT_MINUTES, DEFAULT_CALENDAR_API_URL, DEFAULT_CALENDAR_ID, DEFAULT_DB_PATH,
    DEFAULT_DB_POOL_SIZE, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_PAYMENTS_API_URL, DEFAULT_TIME_ZONE,
};
use crate::errors::{CareslotError, Result};

/// Application configuration
///
/// `calendar` and `payments` are optional: a missing section means the
/// corresponding adapter reports itself as unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub calendar: Option<CalendarConfig>,
    #[serde(default)]
    pub payments: Option<PaymentsConfig>,
    #[serde(default)]
    pub clinic: ClinicConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Calendar provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_calendar_api_url")]
    pub api_base_url: String,
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Payment gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsConfig {
    #[serde(default = "default_payments_api_url")]
    pub api_base_url: String,
    #[serde(skip_serializing)]
    pub secret_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Clinic-local scheduling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicConfig {
    /// IANA time zone name, e.g. `America/New_York`
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default = "default_appointment_minutes")]
    pub appointment_duration_minutes: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            calendar: None,
            payments: None,
            clinic: ClinicConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DB_PATH.to_string(), pool_size: DEFAULT_DB_POOL_SIZE }
    }
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            appointment_duration_minutes: DEFAULT_APPOINTMENT_MINUTES,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}

impl Config {
    /// Check values the type system cannot.
    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 {
            return Err(CareslotError::Config("database.pool_size must be at least 1".into()));
        }
        if self.clinic.appointment_duration_minutes == 0 {
            return Err(CareslotError::Config(
                "clinic.appointment_duration_minutes must be at least 1".into(),
            ));
        }
        self.clinic.tz()?;
        if let Some(calendar) = &self.calendar {
            if calendar.access_token.trim().is_empty() {
                return Err(CareslotError::Config("calendar.access_token is empty".into()));
            }
        }
        if let Some(payments) = &self.payments {
            if payments.secret_key.trim().is_empty() {
                return Err(CareslotError::Config("payments.secret_key is empty".into()));
            }
        }
        Ok(())
    }
}

impl ClinicConfig {
    /// Parse the configured IANA time zone.
    pub fn tz(&self) -> Result<Tz> {
        self.time_zone
            .parse::<Tz>()
            .map_err(|_| CareslotError::Config(format!("unknown time zone: {}", self.time_zone)))
    }
}

fn default_pool_size() -> u32 {
    DEFAULT_DB_POOL_SIZE
}

fn default_calendar_api_url() -> String {
    DEFAULT_CALENDAR_API_URL.to_string()
}

fn default_calendar_id() -> String {
    DEFAULT_CALENDAR_ID.to_string()
}

fn default_payments_api_url() -> String {
    DEFAULT_PAYMENTS_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

fn default_appointment_minutes() -> u32 {
    DEFAULT_APPOINTMENT_MINUTES
}

fn default_log_level() -> String {
    "info".to_string()
}
