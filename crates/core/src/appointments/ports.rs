//! Port interfaces for appointment storage and the calendar provider

use async_trait::async_trait;
use careslot_domain::{
    AdapterResult, Appointment, AppointmentFilter, AppointmentOrder, AppointmentPatch,
    CalendarEventData, CreatedEvent, EventPatch, EventPayload, NewAppointment,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Record store for appointment rows
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Persist a new row; the store assigns `id`, `created_at` and
    /// `updated_at`. A second row for the same `external_event_id` fails with
    /// `AdapterError::Conflict`.
    async fn insert(&self, appointment: NewAppointment) -> AdapterResult<Appointment>;

    /// Apply `patch` to the row and bump `updated_at`. Fails with
    /// `AdapterError::NotFound` when no row has this id.
    async fn update_by_id(&self, id: Uuid, patch: &AppointmentPatch) -> AdapterResult<Appointment>;

    /// Fails with `AdapterError::NotFound` when no row has this id.
    async fn delete_by_id(&self, id: Uuid) -> AdapterResult<()>;

    async fn find_by_external_id(&self, external_id: &str) -> AdapterResult<Option<Appointment>>;

    async fn find_by_id(&self, id: Uuid) -> AdapterResult<Option<Appointment>>;

    async fn query_all(
        &self,
        filter: &AppointmentFilter,
        order: AppointmentOrder,
    ) -> AdapterResult<Vec<Appointment>>;
}

/// External calendar holding one event per synced appointment
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn create_event(&self, payload: &EventPayload) -> AdapterResult<CreatedEvent>;

    async fn update_event(
        &self,
        external_id: &str,
        patch: &EventPatch,
    ) -> AdapterResult<CalendarEventData>;

    /// Fails with `AdapterError::NotFound` when the event is already gone.
    async fn delete_event(&self, external_id: &str) -> AdapterResult<()>;

    /// Events overlapping `[time_min, time_max)`.
    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> AdapterResult<Vec<CalendarEventData>>;

    /// Whether the provider has credentials wired. Unconfigured providers
    /// fail every call with `AdapterError::Unavailable`.
    fn is_configured(&self) -> bool {
        true
    }
}
