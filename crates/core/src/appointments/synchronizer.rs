//! Appointment synchronizer - dual writes across calendar and record store
//!
//! Every mutating operation writes the calendar first and the record store
//! second, strictly in sequence. There is no cross-store transaction: if the
//! second write fails the operation reports a `PartialWriteFailure` naming the
//! identifier that survived, and nothing is retried here. Retrying a calendar
//! create that actually went through would double-book the slot.

use std::sync::Arc;

use careslot_domain::constants::DEFAULT_APPOINTMENT_MINUTES;
use careslot_domain::{
    AdapterError, Appointment, AppointmentStatus, CareslotError, EventMetadata, EventPatch,
    EventPayload, NewAppointment, Result, Store, SyncOperation, SyncStep,
};
use chrono::{NaiveDateTime, TimeDelta};
use chrono_tz::Tz;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::input::{AppointmentDetails, CreateAppointmentInput, UpdateAppointmentInput};
use super::mapping::EventMapping;
use super::ports::{AppointmentRepository, CalendarProvider};

/// Orchestrates appointment writes across both stores
pub struct AppointmentSynchronizer {
    calendar: Arc<dyn CalendarProvider>,
    repository: Arc<dyn AppointmentRepository>,
    mapping: EventMapping,
    time_zone: Tz,
    duration: TimeDelta,
}

impl AppointmentSynchronizer {
    /// Create a synchronizer with UTC scheduling and the default slot length
    pub fn new(
        calendar: Arc<dyn CalendarProvider>,
        repository: Arc<dyn AppointmentRepository>,
    ) -> Self {
        let mapping = EventMapping::new(Arc::clone(&repository));
        Self {
            calendar,
            repository,
            mapping,
            time_zone: chrono_tz::UTC,
            duration: TimeDelta::minutes(i64::from(DEFAULT_APPOINTMENT_MINUTES)),
        }
    }

    /// Zone the appointment date and time are expressed in
    pub fn with_time_zone(mut self, time_zone: Tz) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Length of the calendar event created for an appointment
    pub fn with_appointment_duration(mut self, minutes: u32) -> Self {
        self.duration = TimeDelta::minutes(i64::from(minutes));
        self
    }

    pub fn mapping(&self) -> &EventMapping {
        &self.mapping
    }

    /// Book a confirmed appointment: calendar event first, then the record.
    pub async fn create_appointment(&self, input: &CreateAppointmentInput) -> Result<Appointment> {
        let details = input.validate()?;
        let appointment = new_appointment(details, AppointmentStatus::Confirmed);
        let payload = self.event_payload(&appointment)?;

        let created = self.calendar.create_event(&payload).await.map_err(|err| {
            warn!(error = %err, "calendar rejected appointment creation; nothing persisted");
            CareslotError::from_adapter(Store::Calendar, SyncStep::CreateEvent, err)
        })?;
        debug!(external_event_id = %created.external_id, "calendar event created");

        match self.mapping.bind(&created.external_id, appointment).await {
            Ok(stored) => {
                info!(
                    external_event_id = %created.external_id,
                    record_id = %stored.id,
                    "appointment created"
                );
                Ok(stored)
            }
            Err(err) => {
                error!(
                    external_event_id = %created.external_id,
                    store = %Store::RecordStore,
                    step = %SyncStep::InsertRecord,
                    error = %err,
                    "calendar event created but record insert failed; event is orphaned"
                );
                Err(partial_write(
                    SyncOperation::Create,
                    created.external_id,
                    SyncStep::InsertRecord,
                    &err,
                ))
            }
        }
    }

    /// Update the event and then its mapped row in place.
    ///
    /// A missing mapping is `NotFound` and leaves the calendar untouched.
    pub async fn update_appointment(
        &self,
        external_id: &str,
        input: &UpdateAppointmentInput,
    ) -> Result<Appointment> {
        let patch = input.validate()?;
        let current = self.mapping.require(external_id).await?;
        if let Some(next) = &patch.status {
            current.status.transition_to(next)?;
        }

        let merged = patch.apply_to(&current);
        let event_patch = self.event_patch(&merged)?;
        self.calendar.update_event(external_id, &event_patch).await.map_err(|err| {
            warn!(external_event_id = %external_id, error = %err, "calendar update failed");
            CareslotError::from_adapter(Store::Calendar, SyncStep::UpdateEvent, err)
        })?;

        match self.repository.update_by_id(current.id, &patch).await {
            Ok(stored) => {
                info!(external_event_id = %external_id, record_id = %stored.id, "appointment updated");
                Ok(stored)
            }
            Err(err) => {
                error!(
                    external_event_id = %external_id,
                    record_id = %current.id,
                    store = %Store::RecordStore,
                    step = %SyncStep::UpdateRecord,
                    error = %err,
                    "calendar updated but record update failed; stores diverge"
                );
                Err(partial_write(
                    SyncOperation::Update,
                    external_id.to_string(),
                    SyncStep::UpdateRecord,
                    &err,
                ))
            }
        }
    }

    /// Delete the event, then the mapped row.
    ///
    /// If the calendar delete fails the row is left alone. An event the
    /// calendar no longer knows about counts as deleted.
    pub async fn delete_appointment(&self, external_id: &str) -> Result<()> {
        let current = self.mapping.require(external_id).await?;

        match self.calendar.delete_event(external_id).await {
            Ok(()) => {}
            Err(AdapterError::NotFound(_)) => {
                warn!(
                    external_event_id = %external_id,
                    record_id = %current.id,
                    "calendar event already gone; deleting record"
                );
            }
            Err(err) => {
                warn!(external_event_id = %external_id, error = %err, "calendar delete failed");
                return Err(CareslotError::from_adapter(Store::Calendar, SyncStep::DeleteEvent, err));
            }
        }

        if let Err(err) = self.repository.delete_by_id(current.id).await {
            error!(
                external_event_id = %external_id,
                record_id = %current.id,
                store = %Store::RecordStore,
                step = %SyncStep::DeleteRecord,
                error = %err,
                "calendar event deleted but record delete failed; row is dangling"
            );
            return Err(partial_write(
                SyncOperation::Delete,
                current.id.to_string(),
                SyncStep::DeleteRecord,
                &err,
            ));
        }

        info!(external_event_id = %external_id, record_id = %current.id, "appointment deleted");
        Ok(())
    }

    /// Record a pending consultation without touching the calendar.
    pub async fn book_consultation(&self, input: &CreateAppointmentInput) -> Result<Appointment> {
        let details = input.validate_consultation()?;
        let stored = self
            .repository
            .insert(new_appointment(details, AppointmentStatus::Pending))
            .await
            .map_err(|err| CareslotError::from_adapter(Store::RecordStore, SyncStep::InsertRecord, err))?;

        info!(record_id = %stored.id, "consultation booked");
        Ok(stored)
    }

    /// Appointment mapped to a calendar event.
    pub async fn get_appointment(&self, external_id: &str) -> Result<Appointment> {
        self.mapping.require(external_id).await
    }

    /// Compensating delete for an event left behind by a failed create.
    ///
    /// Refused while a record is still mapped to the event.
    pub async fn discard_orphaned_event(&self, external_id: &str) -> Result<()> {
        if let Some(mapped) = self.mapping.lookup_by_external_id(external_id).await? {
            return Err(CareslotError::invalid_input(format!(
                "event {external_id} is mapped to record {}; delete the appointment instead",
                mapped.id
            )));
        }

        self.calendar
            .delete_event(external_id)
            .await
            .map_err(|err| CareslotError::from_adapter(Store::Calendar, SyncStep::DeleteEvent, err))?;

        info!(external_event_id = %external_id, "orphaned calendar event discarded");
        Ok(())
    }

    /// Delete a row left dangling by a failed delete.
    pub async fn purge_record(&self, record_id: Uuid) -> Result<()> {
        let row = self
            .mapping
            .lookup_by_record_id(record_id)
            .await?
            .ok_or_else(|| CareslotError::not_found("appointment", record_id.to_string()))?;

        self.repository
            .delete_by_id(row.id)
            .await
            .map_err(|err| CareslotError::from_adapter(Store::RecordStore, SyncStep::DeleteRecord, err))?;

        warn!(
            record_id = %row.id,
            external_event_id = row.external_event_id.as_deref().unwrap_or_default(),
            "record purged without calendar write"
        );
        Ok(())
    }

    fn event_payload(&self, appointment: &NewAppointment) -> Result<EventPayload> {
        let start = NaiveDateTime::new(appointment.date, appointment.time);
        let end = start.checked_add_signed(self.duration).ok_or_else(|| {
            CareslotError::invalid_input(format!("appointment end overflows: {start}"))
        })?;

        let attendee = if appointment.patient_name.is_empty() {
            appointment.patient_email.as_str()
        } else {
            appointment.patient_name.as_str()
        };

        Ok(EventPayload {
            summary: format!("{}: {}", appointment.appointment_type, attendee),
            description: describe(appointment),
            start,
            end,
            time_zone: self.time_zone.name().to_string(),
            attendees: if appointment.patient_email.is_empty() {
                Vec::new()
            } else {
                vec![appointment.patient_email.clone()]
            },
            metadata: EventMetadata {
                appointment_type: appointment.appointment_type.clone(),
                date: appointment.date,
                time: appointment.time,
                patient_name: appointment.patient_name.clone(),
                patient_phone: appointment.patient_phone.clone(),
            },
        })
    }

    /// Full replacement of the synced event fields from the merged row.
    fn event_patch(&self, merged: &Appointment) -> Result<EventPatch> {
        let payload = self.event_payload(&NewAppointment {
            external_event_id: merged.external_event_id.clone(),
            patient_name: merged.patient_name.clone(),
            patient_email: merged.patient_email.clone(),
            patient_phone: merged.patient_phone.clone(),
            date: merged.date,
            time: merged.time,
            appointment_type: merged.appointment_type.clone(),
            status: merged.status.clone(),
            notes: merged.notes.clone(),
        })?;

        Ok(EventPatch {
            summary: Some(payload.summary),
            description: Some(payload.description),
            start: Some(payload.start),
            end: Some(payload.end),
            time_zone: Some(payload.time_zone),
            attendees: Some(payload.attendees),
            metadata: Some(payload.metadata),
        })
    }
}

fn new_appointment(details: AppointmentDetails, status: AppointmentStatus) -> NewAppointment {
    NewAppointment {
        external_event_id: None,
        patient_name: details.patient_name,
        patient_email: details.patient_email,
        patient_phone: details.patient_phone,
        date: details.date,
        time: details.time,
        appointment_type: details.appointment_type,
        status,
        notes: details.notes,
    }
}

fn describe(appointment: &NewAppointment) -> String {
    let mut lines = vec![format!("Status: {}", appointment.status)];
    if !appointment.patient_name.is_empty() {
        lines.push(format!("Patient: {}", appointment.patient_name));
    }
    if !appointment.patient_email.is_empty() {
        lines.push(format!("Email: {}", appointment.patient_email));
    }
    if !appointment.patient_phone.is_empty() {
        lines.push(format!("Phone: {}", appointment.patient_phone));
    }
    if !appointment.notes.is_empty() {
        lines.push(format!("Notes: {}", appointment.notes));
    }
    lines.join("\n")
}

fn partial_write(
    operation: SyncOperation,
    orphaned_id: String,
    step: SyncStep,
    err: &AdapterError,
) -> CareslotError {
    CareslotError::PartialWriteFailure {
        operation,
        committed: Store::Calendar,
        failed: Store::RecordStore,
        orphaned_id,
        message: format!("{step}: {err}"),
    }
}
