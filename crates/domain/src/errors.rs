//! Error types used throughout the application
//!
//! Two layers:
//! - [`AdapterError`] is what a port implementation (record store, calendar
//!   provider, payment gateway) reports about its own call.
//! - [`CareslotError`] is what a service operation reports to its caller. It
//!   carries the store and step that failed so the transport layer can map it
//!   to a status code and an operator can reconcile partial writes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::AppointmentStatus;

/// Error reported by a single adapter call.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum AdapterError {
    /// Backend is not configured or cannot be reached.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Backend refused the payload (malformed date, invalid field, ...).
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Uniqueness violation, e.g. a second row for the same calendar event.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal: {0}")]
    Internal(String),
}

/// Result type alias for adapter (port) calls
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// The backing system an operation step talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Store {
    Calendar,
    RecordStore,
    PaymentGateway,
}

crate::impl_domain_status_conversions!(Store {
    Calendar => "calendar",
    RecordStore => "record_store",
    PaymentGateway => "payment_gateway",
});

/// The individual step inside an operation at which an adapter failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStep {
    LookupMapping,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    InsertRecord,
    UpdateRecord,
    DeleteRecord,
    QueryRecords,
    RetrievePayment,
    RecordPayment,
}

crate::impl_domain_status_conversions!(SyncStep {
    LookupMapping => "lookup_mapping",
    CreateEvent => "create_event",
    UpdateEvent => "update_event",
    DeleteEvent => "delete_event",
    InsertRecord => "insert_record",
    UpdateRecord => "update_record",
    DeleteRecord => "delete_record",
    QueryRecords => "query_records",
    RetrievePayment => "retrieve_payment",
    RecordPayment => "record_payment",
});

/// Logical dual-write operation, used to qualify partial write failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
}

crate::impl_domain_status_conversions!(SyncOperation {
    Create => "create",
    Update => "update",
    Delete => "delete",
});

/// Main error type for CareSlot operations
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CareslotError {
    #[error("{store} unavailable during {step}: {message}")]
    AdapterUnavailable { store: Store, step: SyncStep, message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// `store` is `None` when the request failed local validation before any
    /// network call was made.
    #[error("validation rejected{}: {message}", store.map(|s| format!(" by {s}")).unwrap_or_default())]
    ValidationRejected { store: Option<Store>, message: String },

    /// One store was mutated and the other was not. `orphaned_id` is the
    /// identifier that survives on the committed side.
    #[error(
        "partial write during {operation}: {committed} committed, {failed} failed \
         (orphaned id {orphaned_id}): {message}"
    )]
    PartialWriteFailure {
        operation: SyncOperation,
        committed: Store,
        failed: Store,
        orphaned_id: String,
        message: String,
    },

    #[error("status transition {from} -> {to} is not allowed")]
    NotModifiable { from: AppointmentStatus, to: AppointmentStatus },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for CareSlot operations
pub type Result<T> = std::result::Result<T, CareslotError>;

impl CareslotError {
    /// Wrap an adapter error with the store and step it came from.
    pub fn from_adapter(store: Store, step: SyncStep, err: AdapterError) -> Self {
        match err {
            AdapterError::Unavailable(message) => Self::AdapterUnavailable { store, step, message },
            AdapterError::Rejected(message) | AdapterError::Conflict(message) => {
                Self::ValidationRejected { store: Some(store), message: format!("{step}: {message}") }
            }
            AdapterError::NotFound(id) => Self::NotFound { entity: store.to_string(), id },
            AdapterError::Internal(message) => {
                Self::Internal(format!("{store} failed during {step}: {message}"))
            }
        }
    }

    /// Up-front request validation failure.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::ValidationRejected { store: None, message: message.into() }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound { entity: entity.into(), id: id.into() }
    }

    /// Error category used by the transport layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AdapterUnavailable { .. } => ErrorKind::AdapterUnavailable,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ValidationRejected { .. } => ErrorKind::ValidationRejected,
            Self::PartialWriteFailure { .. } => ErrorKind::PartialWriteFailure,
            Self::NotModifiable { .. } => ErrorKind::NotModifiable,
            Self::Config(_) => ErrorKind::Config,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Identifier left behind by a partial write, if any.
    pub fn orphaned_id(&self) -> Option<&str> {
        match self {
            Self::PartialWriteFailure { orphaned_id, .. } => Some(orphaned_id),
            _ => None,
        }
    }

    /// Operator guidance for partial writes.
    pub fn recovery_hint(&self) -> Option<&'static str> {
        match self {
            Self::PartialWriteFailure { operation: SyncOperation::Create, .. } => Some(
                "calendar event exists without a record: delete the orphaned event or retry persistence",
            ),
            Self::PartialWriteFailure { operation: SyncOperation::Update, .. } => Some(
                "calendar holds the new state: re-apply the same update, do not re-create the appointment",
            ),
            Self::PartialWriteFailure { operation: SyncOperation::Delete, .. } => {
                Some("calendar event is gone but the record remains: delete the record by id")
            }
            _ => None,
        }
    }

    /// True when the calendar provider could not be reached or is not
    /// configured.
    pub fn is_calendar_unavailable(&self) -> bool {
        matches!(self, Self::AdapterUnavailable { store: Store::Calendar, .. })
    }

    /// True when the calendar provider refused the payload.
    pub fn is_calendar_rejected(&self) -> bool {
        matches!(self, Self::ValidationRejected { store: Some(Store::Calendar), .. })
    }
}

/// Error category, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AdapterUnavailable,
    NotFound,
    ValidationRejected,
    PartialWriteFailure,
    NotModifiable,
    Config,
    Internal,
}

crate::impl_domain_status_conversions!(ErrorKind {
    AdapterUnavailable => "adapter_unavailable",
    NotFound => "not_found",
    ValidationRejected => "validation_rejected",
    PartialWriteFailure => "partial_write_failure",
    NotModifiable => "not_modifiable",
    Config => "config",
    Internal => "internal",
});

impl ErrorKind {
    /// Suggested HTTP status code for the transport layer.
    pub fn http_status(self) -> u16 {
        match self {
            Self::AdapterUnavailable => 503,
            Self::NotFound => 404,
            Self::ValidationRejected => 400,
            Self::NotModifiable => 409,
            Self::PartialWriteFailure | Self::Config | Self::Internal => 500,
        }
    }
}

/// Structured error body returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orphaned_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery: Option<String>,
}

impl From<&CareslotError> for ErrorResponse {
    fn from(err: &CareslotError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            orphaned_id: err.orphaned_id().map(str::to_string),
            recovery: err.recovery_hint().map(str::to_string),
        }
    }
}
