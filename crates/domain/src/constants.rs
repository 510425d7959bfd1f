//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Clinic defaults
pub const DEFAULT_TIME_ZONE: &str = "UTC";
pub const DEFAULT_APPOINTMENT_MINUTES: u32 = 60;
pub const DEFAULT_APPOINTMENT_TYPE: &str = "consultation";

// Record store defaults
pub const DEFAULT_DB_PATH: &str = "careslot.db";
pub const DEFAULT_DB_POOL_SIZE: u32 = 8;

// Remote APIs
pub const DEFAULT_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_CALENDAR_ID: &str = "primary";
pub const DEFAULT_PAYMENTS_API_URL: &str = "https://api.stripe.com";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// Calendar event metadata keys (extendedProperties.private)
pub const META_APPOINTMENT_TYPE: &str = "careslotType";
pub const META_DATE: &str = "careslotDate";
pub const META_TIME: &str = "careslotTime";
pub const META_PATIENT_NAME: &str = "careslotPatientName";
pub const META_PATIENT_PHONE: &str = "careslotPatientPhone";

pub const MAX_NOTES_LENGTH: usize = 4000;
