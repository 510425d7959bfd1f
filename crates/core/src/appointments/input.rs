//! Validated request inputs
//!
//! Requests arrive loosely typed. Everything is checked here, before the
//! synchronizer makes any network call, so a malformed request can never
//! leave a half-written appointment behind.

use careslot_domain::constants::{DEFAULT_APPOINTMENT_TYPE, MAX_NOTES_LENGTH};
use careslot_domain::{AppointmentPatch, AppointmentStatus, CareslotError, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Raw create/booking request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentInput {
    pub patient_name: Option<String>,
    pub patient_email: Option<String>,
    pub patient_phone: Option<String>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    /// `HH:MM` or `HH:MM:SS`
    pub time: Option<String>,
    #[serde(rename = "type")]
    pub appointment_type: Option<String>,
    pub notes: Option<String>,
}

/// Raw update request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentInput {
    pub patient_name: Option<String>,
    pub patient_email: Option<String>,
    pub patient_phone: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(rename = "type")]
    pub appointment_type: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Appointment details after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentDetails {
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub appointment_type: String,
    pub notes: String,
}

impl CreateAppointmentInput {
    /// Requires a date, a time and an attendee (name or email).
    pub fn validate(&self) -> Result<AppointmentDetails> {
        let details = self.validate_consultation()?;
        if details.patient_name.is_empty() && details.patient_email.is_empty() {
            return Err(CareslotError::invalid_input(
                "patientName or patientEmail is required",
            ));
        }
        Ok(details)
    }

    /// Requires only a date and a time.
    pub fn validate_consultation(&self) -> Result<AppointmentDetails> {
        let date = parse_date(required(&self.date, "date")?)?;
        let time = parse_time(required(&self.time, "time")?)?;
        let patient_email = trimmed(&self.patient_email);
        if !patient_email.is_empty() {
            check_email(&patient_email)?;
        }
        let notes = self.notes.clone().unwrap_or_default();
        check_notes(&notes)?;

        let appointment_type = match trimmed(&self.appointment_type) {
            t if t.is_empty() => DEFAULT_APPOINTMENT_TYPE.to_string(),
            t => t,
        };

        Ok(AppointmentDetails {
            patient_name: trimmed(&self.patient_name),
            patient_email,
            patient_phone: trimmed(&self.patient_phone),
            date,
            time,
            appointment_type,
            notes,
        })
    }
}

impl UpdateAppointmentInput {
    /// Convert into a record patch; an update that changes nothing is
    /// rejected.
    pub fn validate(&self) -> Result<AppointmentPatch> {
        let patient_email = self.patient_email.as_deref().map(str::trim).map(str::to_string);
        if let Some(email) = patient_email.as_deref().filter(|e| !e.is_empty()) {
            check_email(email)?;
        }
        if let Some(notes) = &self.notes {
            check_notes(notes)?;
        }
        let status = match self.status.as_deref().map(str::trim) {
            None => None,
            Some(raw) => match AppointmentStatus::from(raw.to_ascii_lowercase()) {
                AppointmentStatus::Unknown(_) => {
                    return Err(CareslotError::invalid_input(format!("unknown status: {raw}")))
                }
                known => Some(known),
            },
        };
        let appointment_type = match self.appointment_type.as_deref().map(str::trim) {
            Some("") => {
                return Err(CareslotError::invalid_input("type cannot be empty"));
            }
            other => other.map(str::to_string),
        };

        let patch = AppointmentPatch {
            patient_name: self.patient_name.as_deref().map(str::trim).map(str::to_string),
            patient_email,
            patient_phone: self.patient_phone.as_deref().map(str::trim).map(str::to_string),
            date: self.date.as_deref().map(parse_date).transpose()?,
            time: self.time.as_deref().map(parse_time).transpose()?,
            appointment_type,
            status,
            notes: self.notes.clone(),
        };

        if patch.is_empty() {
            return Err(CareslotError::invalid_input("update contains no changes"));
        }
        Ok(patch)
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CareslotError::invalid_input(format!("{field} is required"))),
    }
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CareslotError::invalid_input(format!("invalid date: {raw}")))
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| CareslotError::invalid_input(format!("invalid time: {raw}")))
}

fn check_email(email: &str) -> Result<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(CareslotError::invalid_input(format!("invalid email: {email}"))),
    }
}

fn check_notes(notes: &str) -> Result<()> {
    if notes.chars().count() > MAX_NOTES_LENGTH {
        return Err(CareslotError::invalid_input(format!(
            "notes exceed {MAX_NOTES_LENGTH} characters"
        )));
    }
    Ok(())
}
