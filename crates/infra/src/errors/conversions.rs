//! Conversions from external infrastructure errors into adapter errors.

use careslot_domain::AdapterError;
use reqwest::{Error as HttpError, StatusCode};
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the port-level error.
#[derive(Debug)]
pub struct InfraError(pub AdapterError);

impl From<InfraError> for AdapterError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<AdapterError> for InfraError {
    fn from(value: AdapterError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoAdapterError {
    fn into_adapter(self) -> AdapterError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → AdapterError */
/* -------------------------------------------------------------------------- */

impl IntoAdapterError for SqlError {
    fn into_adapter(self) -> AdapterError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        AdapterError::Unavailable("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        AdapterError::Unavailable("database is locked".into())
                    }
                    (ErrorCode::CannotOpen, _) => {
                        AdapterError::Unavailable(format!("cannot open database: {message}"))
                    }
                    // SQLITE_CONSTRAINT_UNIQUE / SQLITE_CONSTRAINT_PRIMARYKEY
                    (ErrorCode::ConstraintViolation, 2067 | 1555) => {
                        AdapterError::Conflict(format!("unique constraint violation: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, _) => {
                        AdapterError::Rejected(format!("constraint violation: {message}"))
                    }
                    _ => AdapterError::Internal(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => AdapterError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                AdapterError::Internal(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                AdapterError::Internal(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => AdapterError::Unavailable(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => AdapterError::Internal(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_adapter())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → AdapterError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(AdapterError::Unavailable(format!("connection pool: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → AdapterError */
/* -------------------------------------------------------------------------- */

impl IntoAdapterError for HttpError {
    fn into_adapter(self) -> AdapterError {
        if self.is_timeout() {
            return AdapterError::Unavailable("HTTP request timed out".into());
        }

        if self.is_connect() {
            return AdapterError::Unavailable("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            return map_status(status, "");
        }

        if self.is_decode() {
            return AdapterError::Internal(format!("invalid response body: {self}"));
        }

        AdapterError::Unavailable(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_adapter())
    }
}

/// Map a non-success HTTP status from a remote API.
///
/// `detail` is the provider's error message, if one could be read.
pub fn map_status(status: StatusCode, detail: &str) -> AdapterError {
    let code = status.as_u16();
    let mut message =
        format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));
    if !detail.is_empty() {
        message.push_str(": ");
        message.push_str(detail);
    }

    match code {
        401 | 403 => AdapterError::Unavailable(message),
        404 | 410 => AdapterError::NotFound(message),
        409 => AdapterError::Conflict(message),
        408 | 429 => AdapterError::Unavailable(message),
        400..=499 => AdapterError::Rejected(message),
        _ => AdapterError::Unavailable(message),
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
