//! Statistics and status snapshots
//!
//! This module centralizes derived, non-persisted aggregates:
//! - Appointment statistics (counts by status and time window)
//! - Service status (which backing services are wired)

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::{Appointment, AppointmentStatus};

/* -------------------------------------------------------------------------- */
/* Appointment Statistics */
/* -------------------------------------------------------------------------- */

/// Appointment statistics snapshot
///
/// Recomputed on every request from the full set of appointments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentStats {
    /// Every appointment, including ones with an unrecognised status
    pub total_appointments: u64,

    pub confirmed_appointments: u64,
    pub pending_appointments: u64,
    pub cancelled_appointments: u64,

    /// Appointments dated between the last Sunday and today, inclusive
    pub this_week_appointments: u64,

    /// Appointments dated between the 1st of the month and today, inclusive
    pub this_month_appointments: u64,
}

impl AppointmentStats {
    /// Aggregate `appointments` relative to the local date `today`.
    pub fn compute(appointments: &[Appointment], today: NaiveDate) -> Self {
        let week_start = week_start(today);
        let month_start = today.with_day(1).unwrap_or(today);

        let mut stats = Self::default();
        for appointment in appointments {
            stats.total_appointments += 1;
            match appointment.status {
                AppointmentStatus::Confirmed => stats.confirmed_appointments += 1,
                AppointmentStatus::Pending => stats.pending_appointments += 1,
                AppointmentStatus::Cancelled => stats.cancelled_appointments += 1,
                AppointmentStatus::Unknown(_) => {}
            }
            if (week_start..=today).contains(&appointment.date) {
                stats.this_week_appointments += 1;
            }
            if (month_start..=today).contains(&appointment.date) {
                stats.this_month_appointments += 1;
            }
        }
        stats
    }
}

/// Most recent Sunday on or before `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    let offset = u64::from(day.weekday().num_days_from_sunday());
    day.checked_sub_days(Days::new(offset)).unwrap_or(day)
}

/* -------------------------------------------------------------------------- */
/* Service Status */
/* -------------------------------------------------------------------------- */

/// Wiring state of a backing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    Connected,
    NotConfigured,
    Unreachable,
}

crate::impl_domain_status_conversions!(ServiceState {
    Connected => "connected",
    NotConfigured => "not_configured",
    Unreachable => "unreachable",
});

/// Per-service status block reported by health checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub record_store: ServiceState,
    pub calendar: ServiceState,
    pub payments: ServiceState,
}

impl ServiceStatus {
    pub fn is_healthy(&self) -> bool {
        self.record_store == ServiceState::Connected
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, Utc};
    use uuid::Uuid;

    use super::*;

    fn on(date: NaiveDate, status: AppointmentStatus) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::now_v7(),
            external_event_id: None,
            patient_name: String::new(),
            patient_email: String::new(),
            patient_phone: String::new(),
            date,
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            appointment_type: "checkup".into(),
            status,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2024-03-06 is a Wednesday
        let wednesday = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        assert_eq!(week_start(wednesday), NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());

        let sunday = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        assert_eq!(week_start(sunday), sunday);
    }

    #[test]
    fn counts_by_status_and_window() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let eight_days_ago = today - Days::new(8);
        let rows = vec![
            on(today, AppointmentStatus::Confirmed),
            on(today, AppointmentStatus::Pending),
            on(eight_days_ago, AppointmentStatus::Cancelled),
        ];

        let stats = AppointmentStats::compute(&rows, today);
        assert_eq!(stats.total_appointments, 3);
        assert_eq!(stats.confirmed_appointments, 1);
        assert_eq!(stats.pending_appointments, 1);
        assert_eq!(stats.cancelled_appointments, 1);
        assert_eq!(stats.this_week_appointments, 2);
        assert_eq!(stats.this_month_appointments, 3);
    }

    #[test]
    fn future_and_unknown_rows_only_count_in_total() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let rows = vec![
            on(today + Days::new(1), AppointmentStatus::Pending),
            on(today, AppointmentStatus::Unknown("no_show".into())),
        ];

        let stats = AppointmentStats::compute(&rows, today);
        assert_eq!(stats.total_appointments, 2);
        assert_eq!(stats.pending_appointments, 1);
        assert_eq!(stats.confirmed_appointments + stats.cancelled_appointments, 0);
        assert_eq!(stats.this_week_appointments, 1);
    }

    #[test]
    fn status_counts_need_an_exact_match() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let rows = vec![
            on(today, AppointmentStatus::from("CONFIRMED")),
            on(today, AppointmentStatus::from("Pending")),
        ];

        let stats = AppointmentStats::compute(&rows, today);
        assert_eq!(stats.total_appointments, 2);
        assert_eq!(stats.confirmed_appointments, 0);
        assert_eq!(stats.pending_appointments, 0);
        assert_eq!(String::from(rows[0].status.clone()), "CONFIRMED");
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(AppointmentStats::default()).unwrap();
        assert!(json.get("thisWeekAppointments").is_some());
        assert!(json.get("totalAppointments").is_some());
    }
}
