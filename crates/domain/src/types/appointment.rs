//! Appointment records and their lifecycle

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CareslotError, Result};

/// Lifecycle status of an appointment.
///
/// Rows written by older releases may carry a status outside the three known
/// values; those are kept verbatim in [`AppointmentStatus::Unknown`] and count
/// only towards totals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Unknown(String),
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Unknown(raw) => raw,
        }
    }

    /// Validate a change to `next`.
    ///
    /// Allowed: pending -> confirmed, pending -> cancelled,
    /// confirmed -> cancelled, and keeping the current status.
    pub fn transition_to(&self, next: &AppointmentStatus) -> Result<()> {
        if self == next {
            return Ok(());
        }
        match (self, next) {
            (Self::Pending, Self::Confirmed)
            | (Self::Pending, Self::Cancelled)
            | (Self::Confirmed, Self::Cancelled) => Ok(()),
            _ => Err(CareslotError::NotModifiable { from: self.clone(), to: next.clone() }),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for AppointmentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => Self::Pending,
            "confirmed" => Self::Confirmed,
            "cancelled" => Self::Cancelled,
            _ => Self::Unknown(value),
        }
    }
}

impl From<&str> for AppointmentStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<AppointmentStatus> for String {
    fn from(value: AppointmentStatus) -> Self {
        match value {
            AppointmentStatus::Unknown(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

/// A stored appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    /// Calendar event id; `None` for consultations booked without a calendar
    /// write.
    pub external_event_id: Option<String>,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(rename = "type")]
    pub appointment_type: String,
    pub status: AppointmentStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Appointment fields supplied on insert. Id and timestamps are assigned by
/// the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub external_event_id: Option<String>,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub appointment_type: String,
    pub status: AppointmentStatus,
    pub notes: String,
}

/// Mutable appointment fields. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentPatch {
    pub patient_name: Option<String>,
    pub patient_email: Option<String>,
    pub patient_phone: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub appointment_type: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

impl AppointmentPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply onto a copy of `current`; timestamps are left to the store.
    pub fn apply_to(&self, current: &Appointment) -> Appointment {
        let mut next = current.clone();
        if let Some(v) = &self.patient_name {
            next.patient_name = v.clone();
        }
        if let Some(v) = &self.patient_email {
            next.patient_email = v.clone();
        }
        if let Some(v) = &self.patient_phone {
            next.patient_phone = v.clone();
        }
        if let Some(v) = self.date {
            next.date = v;
        }
        if let Some(v) = self.time {
            next.time = v;
        }
        if let Some(v) = &self.appointment_type {
            next.appointment_type = v.clone();
        }
        if let Some(v) = &self.status {
            next.status = v.clone();
        }
        if let Some(v) = &self.notes {
            next.notes = v.clone();
        }
        next
    }
}

/// Conjunctive filter for appointment queries. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentFilter {
    /// Inclusive `[start, end]` range on the appointment date.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub status: Option<AppointmentStatus>,
    #[serde(rename = "type")]
    pub appointment_type: Option<String>,
}

impl AppointmentFilter {
    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some((start, end));
        self
    }

    pub fn with_status(mut self, status: AppointmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_type(mut self, appointment_type: impl Into<String>) -> Self {
        self.appointment_type = Some(appointment_type.into());
        self
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        if let Some((start, end)) = self.date_range {
            if appointment.date < start || appointment.date > end {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if &appointment.status != status {
                return false;
            }
        }
        if let Some(kind) = &self.appointment_type {
            if &appointment.appointment_type != kind {
                return false;
            }
        }
        true
    }
}

/// Result ordering for appointment queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentOrder {
    /// Newest first; equal timestamps break ties by id, descending.
    #[default]
    CreatedAtDesc,
}

impl AppointmentOrder {
    pub fn compare(self, a: &Appointment, b: &Appointment) -> Ordering {
        match self {
            Self::CreatedAtDesc => {
                b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
            }
        }
    }

    pub fn sort(self, appointments: &mut [Appointment]) {
        appointments.sort_by(|a, b| self.compare(a, b));
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn appointment(id: u128, created_ms: i64, status: AppointmentStatus) -> Appointment {
        let created = Utc.timestamp_millis_opt(created_ms).unwrap();
        Appointment {
            id: Uuid::from_u128(id),
            external_event_id: None,
            patient_name: "Ada".into(),
            patient_email: "ada@example.com".into(),
            patient_phone: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            appointment_type: "checkup".into(),
            status,
            notes: String::new(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn lifecycle_allows_forward_transitions() {
        use AppointmentStatus::*;
        assert!(Pending.transition_to(&Confirmed).is_ok());
        assert!(Pending.transition_to(&Cancelled).is_ok());
        assert!(Confirmed.transition_to(&Cancelled).is_ok());
        assert!(Confirmed.transition_to(&Confirmed).is_ok());
    }

    #[test]
    fn lifecycle_rejects_leaving_cancelled() {
        use AppointmentStatus::*;
        let err = Cancelled.transition_to(&Confirmed).unwrap_err();
        assert_eq!(err, CareslotError::NotModifiable { from: Cancelled, to: Confirmed });
        assert!(Cancelled.transition_to(&Pending).is_err());
        assert!(Confirmed.transition_to(&Pending).is_err());
    }

    #[test]
    fn unknown_status_is_preserved_and_frozen() {
        let legacy = AppointmentStatus::from("no_show");
        assert_eq!(legacy, AppointmentStatus::Unknown("no_show".into()));
        assert_eq!(String::from(legacy.clone()), "no_show");
        assert!(legacy.transition_to(&AppointmentStatus::Cancelled).is_err());
        assert!(AppointmentStatus::Pending.transition_to(&legacy).is_err());
    }

    #[test]
    fn status_parsing_is_exact() {
        assert_eq!(AppointmentStatus::from("confirmed"), AppointmentStatus::Confirmed);
        let shouted = AppointmentStatus::from("CONFIRMED");
        assert_eq!(shouted, AppointmentStatus::Unknown("CONFIRMED".into()));
        assert_eq!(String::from(shouted), "CONFIRMED");
        let json = serde_json::to_string(&AppointmentStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }

    #[test]
    fn order_breaks_timestamp_ties_by_id() {
        let mut rows = vec![
            appointment(1, 1_000, AppointmentStatus::Pending),
            appointment(3, 1_000, AppointmentStatus::Pending),
            appointment(2, 2_000, AppointmentStatus::Pending),
        ];
        AppointmentOrder::CreatedAtDesc.sort(&mut rows);
        let ids: Vec<u128> = rows.iter().map(|a| a.id.as_u128()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn filter_is_conjunctive() {
        let row = appointment(1, 0, AppointmentStatus::Pending);
        let day = row.date;

        assert!(AppointmentFilter::default().matches(&row));
        assert!(AppointmentFilter::default()
            .with_status(AppointmentStatus::Pending)
            .with_type("checkup")
            .with_date_range(day, day)
            .matches(&row));
        assert!(!AppointmentFilter::default()
            .with_status(AppointmentStatus::Pending)
            .with_type("surgery")
            .matches(&row));
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let row = appointment(1, 0, AppointmentStatus::Pending);
        let patch = AppointmentPatch { notes: Some("bring x-rays".into()), ..Default::default() };
        let next = patch.apply_to(&row);
        assert_eq!(next.notes, "bring x-rays");
        assert_eq!(next.patient_name, row.patient_name);
        assert!(AppointmentPatch::default().is_empty());
        assert!(!patch.is_empty());
    }
}
