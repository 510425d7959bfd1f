//! Event mapping between calendar events and record-store rows
//!
//! The mapping is not a separate table: it is the `external_event_id` column
//! of the appointment row, kept unique by the record store. Rows are only
//! bound to an event right after that event was created, and updates always
//! modify the bound row in place.

use std::sync::Arc;

use careslot_domain::{
    AdapterResult, Appointment, CareslotError, NewAppointment, Result, Store, SyncStep,
};
use uuid::Uuid;

use super::ports::AppointmentRepository;

/// Bijective `external_event_id <-> record id` lookups
#[derive(Clone)]
pub struct EventMapping {
    repository: Arc<dyn AppointmentRepository>,
}

impl EventMapping {
    pub fn new(repository: Arc<dyn AppointmentRepository>) -> Self {
        Self { repository }
    }

    /// Row bound to a calendar event, if any.
    pub async fn lookup_by_external_id(&self, external_id: &str) -> Result<Option<Appointment>> {
        self.repository
            .find_by_external_id(external_id)
            .await
            .map_err(|err| CareslotError::from_adapter(Store::RecordStore, SyncStep::LookupMapping, err))
    }

    /// Row with this record id, if any.
    pub async fn lookup_by_record_id(&self, record_id: Uuid) -> Result<Option<Appointment>> {
        self.repository
            .find_by_id(record_id)
            .await
            .map_err(|err| CareslotError::from_adapter(Store::RecordStore, SyncStep::LookupMapping, err))
    }

    /// Like [`Self::lookup_by_external_id`] but a missing row is `NotFound`.
    pub async fn require(&self, external_id: &str) -> Result<Appointment> {
        self.lookup_by_external_id(external_id)
            .await?
            .ok_or_else(|| CareslotError::not_found("appointment", external_id))
    }

    /// Insert the row for a freshly created calendar event.
    ///
    /// Returns the raw adapter error so the caller can report the event as
    /// orphaned.
    pub(crate) async fn bind(
        &self,
        external_id: &str,
        mut appointment: NewAppointment,
    ) -> AdapterResult<Appointment> {
        appointment.external_event_id = Some(external_id.to_string());
        self.repository.insert(appointment).await
    }
}
