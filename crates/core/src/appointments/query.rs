//! Read-side queries and statistics over the record store
//!
//! Reads only from the record store; the calendar is never consulted.

use std::sync::Arc;

use careslot_domain::{
    Appointment, AppointmentFilter, AppointmentOrder, AppointmentStats, CareslotError, Result,
    Store, SyncStep,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use super::ports::AppointmentRepository;

/// Filtered listing and derived statistics
pub struct AppointmentQueryService {
    repository: Arc<dyn AppointmentRepository>,
    time_zone: Tz,
}

impl AppointmentQueryService {
    pub fn new(repository: Arc<dyn AppointmentRepository>) -> Self {
        Self { repository, time_zone: chrono_tz::UTC }
    }

    /// Zone used to decide what "today" is for statistics windows
    pub fn with_time_zone(mut self, time_zone: Tz) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Appointments matching every set filter field, newest first.
    pub async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>> {
        if let Some((start, end)) = filter.date_range {
            if start > end {
                return Err(CareslotError::invalid_input(format!(
                    "date range start {start} is after end {end}"
                )));
            }
        }

        let order = AppointmentOrder::CreatedAtDesc;
        let mut rows = self
            .repository
            .query_all(filter, order)
            .await
            .map_err(|err| CareslotError::from_adapter(Store::RecordStore, SyncStep::QueryRecords, err))?;
        order.sort(&mut rows);

        debug!(count = rows.len(), "listed appointments");
        Ok(rows)
    }

    /// Statistics as of now.
    pub async fn compute_statistics(&self) -> Result<AppointmentStats> {
        self.compute_statistics_at(Utc::now()).await
    }

    /// Statistics as of `now`, with windows anchored on the clinic-local date.
    pub async fn compute_statistics_at(&self, now: DateTime<Utc>) -> Result<AppointmentStats> {
        let rows = self
            .repository
            .query_all(&AppointmentFilter::default(), AppointmentOrder::CreatedAtDesc)
            .await
            .map_err(|err| CareslotError::from_adapter(Store::RecordStore, SyncStep::QueryRecords, err))?;

        let today = now.with_timezone(&self.time_zone).date_naive();
        Ok(AppointmentStats::compute(&rows, today))
    }
}
