//! Appointment repository implementation
//!
//! Stores one row per appointment. `external_event_id` is a UNIQUE column, so
//! the record store itself refuses a second row for the same calendar event.

use std::sync::Arc;

use async_trait::async_trait;
use careslot_core::AppointmentRepository;
use careslot_domain::{
    AdapterError, AdapterResult, Appointment, AppointmentFilter, AppointmentOrder,
    AppointmentPatch, AppointmentStatus, NewAppointment,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tokio::task;
use uuid::Uuid;

use super::manager::DbManager;
use crate::errors::InfraError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const SELECT_COLUMNS: &str = "SELECT id, external_event_id, patient_name, patient_email, \
     patient_phone, date, time, appointment_type, status, notes, created_at, updated_at \
     FROM appointments";

/// SQLite-based appointment repository
pub struct SqliteAppointmentRepository {
    db: Arc<DbManager>,
}

impl SqliteAppointmentRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AppointmentRepository for SqliteAppointmentRepository {
    async fn insert(&self, appointment: NewAppointment) -> AdapterResult<Appointment> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AdapterResult<Appointment> {
            let conn = db.get_connection()?;
            insert_appointment(&conn, appointment).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update_by_id(&self, id: Uuid, patch: &AppointmentPatch) -> AdapterResult<Appointment> {
        let db = Arc::clone(&self.db);
        let patch = patch.clone();

        task::spawn_blocking(move || -> AdapterResult<Appointment> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;
            let changed = update_appointment(&tx, id, &patch).map_err(map_sql_error)?;
            if changed == 0 {
                return Err(AdapterError::NotFound(format!("appointment {id}")));
            }
            let stored = query_by_id(&tx, id)
                .map_err(map_sql_error)?
                .ok_or_else(|| AdapterError::NotFound(format!("appointment {id}")))?;
            tx.commit().map_err(map_sql_error)?;
            Ok(stored)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete_by_id(&self, id: Uuid) -> AdapterResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AdapterResult<()> {
            let conn = db.get_connection()?;
            let deleted = conn
                .execute("DELETE FROM appointments WHERE id = ?1", params![id.to_string()])
                .map_err(map_sql_error)?;
            if deleted == 0 {
                return Err(AdapterError::NotFound(format!("appointment {id}")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_external_id(&self, external_id: &str) -> AdapterResult<Option<Appointment>> {
        let db = Arc::clone(&self.db);
        let external_id = external_id.to_string();

        task::spawn_blocking(move || -> AdapterResult<Option<Appointment>> {
            let conn = db.get_connection()?;
            let sql = format!("{SELECT_COLUMNS} WHERE external_event_id = ?1");
            conn.query_row(&sql, params![external_id], map_appointment_row)
                .optional()
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_id(&self, id: Uuid) -> AdapterResult<Option<Appointment>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AdapterResult<Option<Appointment>> {
            let conn = db.get_connection()?;
            query_by_id(&conn, id).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn query_all(
        &self,
        filter: &AppointmentFilter,
        order: AppointmentOrder,
    ) -> AdapterResult<Vec<Appointment>> {
        let db = Arc::clone(&self.db);
        let filter = filter.clone();

        task::spawn_blocking(move || -> AdapterResult<Vec<Appointment>> {
            let conn = db.get_connection()?;
            query_appointments(&conn, &filter, order).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// SQL Operations (synchronous)
// ============================================================================

fn insert_appointment(
    conn: &Connection,
    appointment: NewAppointment,
) -> rusqlite::Result<Appointment> {
    let id = Uuid::now_v7();
    let now = now_millis();

    conn.execute(
        "INSERT INTO appointments (id, external_event_id, patient_name, patient_email,
            patient_phone, date, time, appointment_type, status, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
        params![
            id.to_string(),
            appointment.external_event_id,
            appointment.patient_name,
            appointment.patient_email,
            appointment.patient_phone,
            format_date(appointment.date),
            format_time(appointment.time),
            appointment.appointment_type,
            String::from(appointment.status.clone()),
            appointment.notes,
            now,
        ],
    )?;

    let timestamp = from_millis(now);
    Ok(Appointment {
        id,
        external_event_id: appointment.external_event_id,
        patient_name: appointment.patient_name,
        patient_email: appointment.patient_email,
        patient_phone: appointment.patient_phone,
        date: appointment.date,
        time: appointment.time,
        appointment_type: appointment.appointment_type,
        status: appointment.status,
        notes: appointment.notes,
        created_at: timestamp,
        updated_at: timestamp,
    })
}

fn update_appointment(
    conn: &Connection,
    id: Uuid,
    patch: &AppointmentPatch,
) -> rusqlite::Result<usize> {
    let mut assignments: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    let text_fields = [
        ("patient_name = ?", &patch.patient_name),
        ("patient_email = ?", &patch.patient_email),
        ("patient_phone = ?", &patch.patient_phone),
        ("appointment_type = ?", &patch.appointment_type),
        ("notes = ?", &patch.notes),
    ];
    for (assignment, value) in text_fields {
        if let Some(value) = value {
            assignments.push(assignment);
            values.push(Value::Text(value.clone()));
        }
    }
    if let Some(date) = patch.date {
        assignments.push("date = ?");
        values.push(Value::Text(format_date(date)));
    }
    if let Some(time) = patch.time {
        assignments.push("time = ?");
        values.push(Value::Text(format_time(time)));
    }
    if let Some(status) = &patch.status {
        assignments.push("status = ?");
        values.push(Value::Text(String::from(status.clone())));
    }

    assignments.push("updated_at = ?");
    values.push(Value::Integer(now_millis()));
    values.push(Value::Text(id.to_string()));

    let sql = format!("UPDATE appointments SET {} WHERE id = ?", assignments.join(", "));
    conn.execute(&sql, params_from_iter(values))
}

fn query_by_id(conn: &Connection, id: Uuid) -> rusqlite::Result<Option<Appointment>> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
    conn.query_row(&sql, params![id.to_string()], map_appointment_row).optional()
}

fn query_appointments(
    conn: &Connection,
    filter: &AppointmentFilter,
    order: AppointmentOrder,
) -> rusqlite::Result<Vec<Appointment>> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some((start, end)) = filter.date_range {
        clauses.push("date >= ? AND date <= ?");
        values.push(Value::Text(format_date(start)));
        values.push(Value::Text(format_date(end)));
    }
    if let Some(status) = &filter.status {
        clauses.push("status = ?");
        values.push(Value::Text(String::from(status.clone())));
    }
    if let Some(kind) = &filter.appointment_type {
        clauses.push("appointment_type = ?");
        values.push(Value::Text(kind.clone()));
    }

    let mut sql = SELECT_COLUMNS.to_string();
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(match order {
        AppointmentOrder::CreatedAtDesc => " ORDER BY created_at DESC, id DESC",
    });

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), map_appointment_row)?;
    rows.collect()
}

fn map_appointment_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    let id: String = row.get(0)?;
    let date: String = row.get(5)?;
    let time: String = row.get(6)?;
    let status: String = row.get(8)?;

    Ok(Appointment {
        id: Uuid::parse_str(&id).map_err(|err| conversion_error(0, err))?,
        external_event_id: row.get(1)?,
        patient_name: row.get(2)?,
        patient_email: row.get(3)?,
        patient_phone: row.get(4)?,
        date: NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .map_err(|err| conversion_error(5, err))?,
        time: NaiveTime::parse_from_str(&time, TIME_FORMAT)
            .map_err(|err| conversion_error(6, err))?,
        appointment_type: row.get(7)?,
        status: AppointmentStatus::from(status),
        notes: row.get(9)?,
        created_at: from_millis(row.get(10)?),
        updated_at: from_millis(row.get(11)?),
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub(crate) fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err))
}

// ============================================================================
// Error Mapping
// ============================================================================

pub(crate) fn map_sql_error(err: rusqlite::Error) -> AdapterError {
    AdapterError::from(InfraError::from(err))
}

pub(crate) fn map_join_error(err: task::JoinError) -> AdapterError {
    if err.is_cancelled() {
        AdapterError::Internal("blocking task cancelled".into())
    } else {
        AdapterError::Internal(format!("blocking task failed: {err}"))
    }
}

// ============================================================================
// Tests
// ============================================================================
