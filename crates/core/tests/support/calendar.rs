use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use careslot_core::CalendarProvider;
use careslot_domain::{
    AdapterError, AdapterResult, CalendarEventData, CreatedEvent, EventPatch, EventPayload,
};
use chrono::{DateTime, Utc};

use super::Failures;

/// In-memory calendar provider.
///
/// Event ids are `evt-1`, `evt-2`, ... in creation order. Every create and
/// update payload is kept so tests can inspect what was sent.
#[derive(Default, Clone)]
pub struct MockCalendarProvider {
    events: Arc<Mutex<Vec<CalendarEventData>>>,
    created: Arc<Mutex<Vec<EventPayload>>>,
    patches: Arc<Mutex<Vec<(String, EventPatch)>>>,
    next_id: Arc<AtomicUsize>,
    pub failures: Failures,
}

impl MockCalendarProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `operation` (`create_event`, `update_event`, `delete_event`,
    /// `list_events`) with `error`.
    pub fn failing(self, operation: &'static str, error: AdapterError) -> Self {
        self.failures.set(operation, error);
        self
    }

    pub fn event_ids(&self) -> Vec<String> {
        self.events.lock().unwrap().iter().map(|e| e.external_id.clone()).collect()
    }

    pub fn contains(&self, external_id: &str) -> bool {
        self.events.lock().unwrap().iter().any(|e| e.external_id == external_id)
    }

    pub fn created_payloads(&self) -> Vec<EventPayload> {
        self.created.lock().unwrap().clone()
    }

    pub fn patches(&self) -> Vec<(String, EventPatch)> {
        self.patches.lock().unwrap().clone()
    }

    /// Drop an event behind the synchronizer's back.
    pub fn remove_out_of_band(&self, external_id: &str) {
        self.events.lock().unwrap().retain(|e| e.external_id != external_id);
    }
}

#[async_trait]
impl CalendarProvider for MockCalendarProvider {
    async fn create_event(&self, payload: &EventPayload) -> AdapterResult<CreatedEvent> {
        self.failures.check("create_event")?;
        let external_id = format!("evt-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let event = CalendarEventData {
            external_id: external_id.clone(),
            summary: Some(payload.summary.clone()),
            description: Some(payload.description.clone()),
            start: Some(payload.start.and_utc().fixed_offset()),
            end: Some(payload.end.and_utc().fixed_offset()),
            status: Some("confirmed".into()),
            attendees: payload.attendees.clone(),
            html_link: None,
            metadata: Some(payload.metadata.clone()),
        };
        self.events.lock().unwrap().push(event.clone());
        self.created.lock().unwrap().push(payload.clone());
        Ok(CreatedEvent { external_id, event })
    }

    async fn update_event(
        &self,
        external_id: &str,
        patch: &EventPatch,
    ) -> AdapterResult<CalendarEventData> {
        self.failures.check("update_event")?;
        let mut events = self.events.lock().unwrap();
        let event = events
            .iter_mut()
            .find(|e| e.external_id == external_id)
            .ok_or_else(|| AdapterError::NotFound(external_id.to_string()))?;
        if let Some(summary) = &patch.summary {
            event.summary = Some(summary.clone());
        }
        if let Some(description) = &patch.description {
            event.description = Some(description.clone());
        }
        if let Some(start) = patch.start {
            event.start = Some(start.and_utc().fixed_offset());
        }
        if let Some(end) = patch.end {
            event.end = Some(end.and_utc().fixed_offset());
        }
        if let Some(metadata) = &patch.metadata {
            event.metadata = Some(metadata.clone());
        }
        self.patches.lock().unwrap().push((external_id.to_string(), patch.clone()));
        Ok(event.clone())
    }

    async fn delete_event(&self, external_id: &str) -> AdapterResult<()> {
        self.failures.check("delete_event")?;
        let mut events = self.events.lock().unwrap();
        let before = events.len();
        events.retain(|e| e.external_id != external_id);
        if events.len() == before {
            return Err(AdapterError::NotFound(external_id.to_string()));
        }
        Ok(())
    }

    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> AdapterResult<Vec<CalendarEventData>> {
        self.failures.check("list_events")?;
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| {
                e.start
                    .map(|start| start.with_timezone(&Utc))
                    .map(|start| start >= time_min && start < time_max)
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}
