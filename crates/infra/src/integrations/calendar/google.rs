//! Google Calendar provider implementation

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use careslot_core::CalendarProvider;
use careslot_domain::constants::{
    META_APPOINTMENT_TYPE, META_DATE, META_PATIENT_NAME, META_PATIENT_PHONE, META_TIME,
};
use careslot_domain::{
    AdapterError, AdapterResult, CalendarConfig, CalendarEventData, CreatedEvent, EventMetadata,
    EventPatch, EventPayload,
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::http::{check_response, HttpClient};

const LOCAL_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const MAX_PAGES: usize = 50;

/// Google Calendar REST provider for a single calendar.
pub struct GoogleCalendarProvider {
    http: HttpClient,
    base_url: String,
    calendar_id: String,
    access_token: String,
    max_pages: usize,
}

impl GoogleCalendarProvider {
    pub fn new(config: &CalendarConfig) -> AdapterResult<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!("careslot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            calendar_id: config.calendar_id.clone(),
            access_token: config.access_token.clone(),
            max_pages: MAX_PAGES,
        })
    }

    /// Cap on result pages fetched by `list_events`. Listings that need more
    /// pages fail instead of returning a partial set.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.base_url, urlencoding::encode(&self.calendar_id))
    }

    fn event_url(&self, event_id: &str) -> String {
        format!("{}/{}", self.events_url(), urlencoding::encode(event_id))
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    async fn create_event(&self, payload: &EventPayload) -> AdapterResult<CreatedEvent> {
        let body = GoogleEventWrite::from(payload);
        let request = self
            .http
            .request(Method::POST, self.events_url())
            .bearer_auth(&self.access_token)
            .json(&body);

        let response = check_response(self.http.send(request).await?).await?;
        let event: GoogleEvent = response.json().await.map_err(decode_error)?;
        debug!(external_event_id = %event.id, "calendar event created");

        let data = event.into_data();
        Ok(CreatedEvent { external_id: data.external_id.clone(), event: data })
    }

    async fn update_event(
        &self,
        external_id: &str,
        patch: &EventPatch,
    ) -> AdapterResult<CalendarEventData> {
        let body = GoogleEventWrite::from(patch);
        let request = self
            .http
            .request(Method::PATCH, self.event_url(external_id))
            .bearer_auth(&self.access_token)
            .json(&body);

        let response = check_response(self.http.send(request).await?).await?;
        let event: GoogleEvent = response.json().await.map_err(decode_error)?;
        Ok(event.into_data())
    }

    async fn delete_event(&self, external_id: &str) -> AdapterResult<()> {
        let request = self
            .http
            .request(Method::DELETE, self.event_url(external_id))
            .bearer_auth(&self.access_token);

        check_response(self.http.send(request).await?).await?;
        Ok(())
    }

    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> AdapterResult<Vec<CalendarEventData>> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..self.max_pages {
            let mut query = vec![
                ("timeMin", time_min.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("timeMax", time_max.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let request = self
                .http
                .request(Method::GET, self.events_url())
                .bearer_auth(&self.access_token)
                .query(&query);

            let response = check_response(self.http.send(request).await?).await?;
            let page: GoogleEventsPage = response.json().await.map_err(decode_error)?;
            events.extend(page.items.into_iter().map(GoogleEvent::into_data));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => return Ok(events),
            }
        }

        warn!(pages = self.max_pages, fetched = events.len(), "calendar listing exceeded page cap");
        Err(AdapterError::Internal(format!(
            "calendar listing did not finish within {} pages",
            self.max_pages
        )))
    }
}

fn decode_error(err: reqwest::Error) -> AdapterError {
    AdapterError::Internal(format!("invalid calendar response: {err}"))
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEventWrite {
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attendees: Option<Vec<GoogleAttendee>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extended_properties: Option<ExtendedProperties>,
}

impl From<&EventPayload> for GoogleEventWrite {
    fn from(payload: &EventPayload) -> Self {
        Self {
            summary: Some(payload.summary.clone()),
            description: Some(payload.description.clone()),
            start: Some(EventDateTime::local(payload.start, Some(&payload.time_zone))),
            end: Some(EventDateTime::local(payload.end, Some(&payload.time_zone))),
            attendees: Some(attendees(&payload.attendees)),
            extended_properties: Some(ExtendedProperties::from(&payload.metadata)),
        }
    }
}

impl From<&EventPatch> for GoogleEventWrite {
    fn from(patch: &EventPatch) -> Self {
        let zone = patch.time_zone.as_deref();
        Self {
            summary: patch.summary.clone(),
            description: patch.description.clone(),
            start: patch.start.map(|start| EventDateTime::local(start, zone)),
            end: patch.end.map(|end| EventDateTime::local(end, zone)),
            attendees: patch.attendees.as_deref().map(attendees),
            extended_properties: patch.metadata.as_ref().map(ExtendedProperties::from),
        }
    }
}

fn attendees(emails: &[String]) -> Vec<GoogleAttendee> {
    emails.iter().map(|email| GoogleAttendee { email: email.clone() }).collect()
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

impl EventDateTime {
    fn local(at: NaiveDateTime, time_zone: Option<&str>) -> Self {
        Self {
            date_time: Some(at.format(LOCAL_DATE_TIME_FORMAT).to_string()),
            date: None,
            time_zone: time_zone.map(str::to_string),
        }
    }

    fn parse(&self) -> Option<DateTime<FixedOffset>> {
        self.date_time.as_deref().and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GoogleAttendee {
    email: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ExtendedProperties {
    #[serde(default)]
    private: HashMap<String, String>,
}

impl From<&EventMetadata> for ExtendedProperties {
    fn from(metadata: &EventMetadata) -> Self {
        let private = HashMap::from([
            (META_APPOINTMENT_TYPE.to_string(), metadata.appointment_type.clone()),
            (META_DATE.to_string(), metadata.date.format("%Y-%m-%d").to_string()),
            (META_TIME.to_string(), metadata.time.format("%H:%M:%S").to_string()),
            (META_PATIENT_NAME.to_string(), metadata.patient_name.clone()),
            (META_PATIENT_PHONE.to_string(), metadata.patient_phone.clone()),
        ]);
        Self { private }
    }
}

impl ExtendedProperties {
    /// `None` for events that were not created by this service.
    fn metadata(&self) -> Option<EventMetadata> {
        let get = |key: &str| self.private.get(key);
        let date = NaiveDate::parse_from_str(get(META_DATE)?, "%Y-%m-%d").ok()?;
        let raw_time = get(META_TIME)?;
        let time = NaiveTime::parse_from_str(raw_time, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw_time, "%H:%M"))
            .ok()?;

        Some(EventMetadata {
            appointment_type: get(META_APPOINTMENT_TYPE)?.clone(),
            date,
            time,
            patient_name: get(META_PATIENT_NAME).cloned().unwrap_or_default(),
            patient_phone: get(META_PATIENT_PHONE).cloned().unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEventsPage {
    #[serde(default)]
    items: Vec<GoogleEvent>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEvent {
    id: String,
    summary: Option<String>,
    description: Option<String>,
    #[serde(default)]
    start: EventDateTime,
    #[serde(default)]
    end: EventDateTime,
    status: Option<String>,
    #[serde(default)]
    attendees: Vec<GoogleAttendee>,
    html_link: Option<String>,
    extended_properties: Option<ExtendedProperties>,
}

impl GoogleEvent {
    fn into_data(self) -> CalendarEventData {
        let metadata = self.extended_properties.as_ref().and_then(ExtendedProperties::metadata);
        CalendarEventData {
            start: self.start.parse(),
            end: self.end.parse(),
            external_id: self.id,
            summary: self.summary,
            description: self.description,
            status: self.status,
            attendees: self.attendees.into_iter().map(|a| a.email).collect(),
            html_link: self.html_link,
            metadata,
        }
    }
}
