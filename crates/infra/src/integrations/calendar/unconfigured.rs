//! Stand-in provider used when no calendar is configured.

use async_trait::async_trait;
use careslot_core::CalendarProvider;
use careslot_domain::{
    AdapterError, AdapterResult, CalendarEventData, CreatedEvent, EventPatch, EventPayload,
};
use chrono::{DateTime, Utc};

const NOT_CONFIGURED: &str = "calendar provider is not configured";

/// Fails every call with [`AdapterError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredCalendarProvider;

#[async_trait]
impl CalendarProvider for UnconfiguredCalendarProvider {
    async fn create_event(&self, _payload: &EventPayload) -> AdapterResult<CreatedEvent> {
        Err(AdapterError::Unavailable(NOT_CONFIGURED.into()))
    }

    async fn update_event(
        &self,
        _external_id: &str,
        _patch: &EventPatch,
    ) -> AdapterResult<CalendarEventData> {
        Err(AdapterError::Unavailable(NOT_CONFIGURED.into()))
    }

    async fn delete_event(&self, _external_id: &str) -> AdapterResult<()> {
        Err(AdapterError::Unavailable(NOT_CONFIGURED.into()))
    }

    async fn list_events(
        &self,
        _time_min: DateTime<Utc>,
        _time_max: DateTime<Utc>,
    ) -> AdapterResult<Vec<CalendarEventData>> {
        Err(AdapterError::Unavailable(NOT_CONFIGURED.into()))
    }

    fn is_configured(&self) -> bool {
        false
    }
}
