//! Calendar event payloads exchanged with the calendar provider
//!
//! Appointment type, date, time and patient details travel as structured
//! [`EventMetadata`] next to the human-readable summary, so nothing has to be
//! re-parsed out of free text.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Structured appointment details attached to a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    pub appointment_type: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub patient_name: String,
    pub patient_phone: String,
}

/// Event to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub summary: String,
    pub description: String,
    /// Local wall-clock start in `time_zone`.
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// IANA zone name the provider should interpret `start`/`end` in.
    pub time_zone: String,
    /// Attendee email addresses.
    pub attendees: Vec<String>,
    pub metadata: EventMetadata,
}

/// Partial event update. `None` fields are left untouched by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub time_zone: Option<String>,
    pub attendees: Option<Vec<String>>,
    pub metadata: Option<EventMetadata>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Event as reported back by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventData {
    pub external_id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
    pub status: Option<String>,
    pub attendees: Vec<String>,
    pub html_link: Option<String>,
    pub metadata: Option<EventMetadata>,
}

/// Result of a successful event creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    pub external_id: String,
    pub event: CalendarEventData,
}
