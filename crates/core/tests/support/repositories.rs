//! In-memory record store fakes

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use careslot_core::AppointmentRepository;
use careslot_domain::{
    AdapterError, AdapterResult, Appointment, AppointmentFilter, AppointmentOrder,
    AppointmentPatch, NewAppointment,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Failures;

/// In-memory mock for `AppointmentRepository`.
///
/// Enforces the same unique `external_event_id` rule as the SQLite store.
/// `with_fixed_clock` pins `created_at`/`updated_at` so ordering tie-breaks
/// can be tested.
#[derive(Default, Clone)]
pub struct MockAppointmentRepository {
    rows: Arc<Mutex<Vec<Appointment>>>,
    clock: Arc<Mutex<Option<DateTime<Utc>>>>,
    pub failures: Failures,
}

impl MockAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `operation` (`insert`, `update_by_id`, `delete_by_id`,
    /// `find_by_external_id`, `find_by_id`, `query_all`) with `error`.
    pub fn failing(self, operation: &'static str, error: AdapterError) -> Self {
        self.failures.set(operation, error);
        self
    }

    pub fn with_fixed_clock(self, now: DateTime<Utc>) -> Self {
        *self.clock.lock().unwrap() = Some(now);
        self
    }

    /// Store a fully formed row, bypassing id and timestamp assignment.
    pub fn seed(&self, appointment: Appointment) {
        self.rows.lock().unwrap().push(appointment);
    }

    pub fn rows(&self) -> Vec<Appointment> {
        self.rows.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn rows_for_event(&self, external_id: &str) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.external_event_id.as_deref() == Some(external_id))
            .count()
    }

    /// Drop a row behind the synchronizer's back.
    pub fn remove_out_of_band(&self, id: Uuid) {
        self.rows.lock().unwrap().retain(|a| a.id != id);
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.lock().unwrap().unwrap_or_else(Utc::now)
    }
}

#[async_trait]
impl AppointmentRepository for MockAppointmentRepository {
    async fn insert(&self, appointment: NewAppointment) -> AdapterResult<Appointment> {
        self.failures.check("insert")?;
        let now = self.now();
        let mut rows = self.rows.lock().unwrap();
        if let Some(external_id) = &appointment.external_event_id {
            if rows.iter().any(|a| a.external_event_id.as_ref() == Some(external_id)) {
                return Err(AdapterError::Conflict(format!(
                    "external_event_id {external_id} already mapped"
                )));
            }
        }
        let stored = Appointment {
            id: Uuid::now_v7(),
            external_event_id: appointment.external_event_id,
            patient_name: appointment.patient_name,
            patient_email: appointment.patient_email,
            patient_phone: appointment.patient_phone,
            date: appointment.date,
            time: appointment.time,
            appointment_type: appointment.appointment_type,
            status: appointment.status,
            notes: appointment.notes,
            created_at: now,
            updated_at: now,
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn update_by_id(&self, id: Uuid, patch: &AppointmentPatch) -> AdapterResult<Appointment> {
        self.failures.check("update_by_id")?;
        let now = self.now();
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AdapterError::NotFound(id.to_string()))?;
        *row = patch.apply_to(row);
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> AdapterResult<()> {
        self.failures.check("delete_by_id")?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|a| a.id != id);
        if rows.len() == before {
            return Err(AdapterError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn find_by_external_id(&self, external_id: &str) -> AdapterResult<Option<Appointment>> {
        self.failures.check("find_by_external_id")?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.external_event_id.as_deref() == Some(external_id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AdapterResult<Option<Appointment>> {
        self.failures.check("find_by_id")?;
        Ok(self.rows.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }

    async fn query_all(
        &self,
        filter: &AppointmentFilter,
        _order: AppointmentOrder,
    ) -> AdapterResult<Vec<Appointment>> {
        self.failures.check("query_all")?;
        // Insertion order on purpose: the query service owns the ordering.
        Ok(self.rows.lock().unwrap().iter().filter(|a| filter.matches(a)).cloned().collect())
    }
}
