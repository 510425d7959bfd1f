//! Payment ledger repository

use std::sync::Arc;

use async_trait::async_trait;
use careslot_core::PaymentRepository;
use careslot_domain::{AdapterResult, NewPayment, PaymentRecord, PaymentStatus};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;
use uuid::Uuid;

use super::appointment_repository::{from_millis, map_join_error, map_sql_error, now_millis};
use super::manager::DbManager;

/// SQLite-backed ledger of completed charges.
pub struct SqlitePaymentRepository {
    db: Arc<DbManager>,
}

impl SqlitePaymentRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn record(&self, payment: NewPayment) -> AdapterResult<PaymentRecord> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AdapterResult<PaymentRecord> {
            let conn = db.get_connection()?;
            insert_payment(&conn, payment).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_provider_id(
        &self,
        provider_payment_id: &str,
    ) -> AdapterResult<Option<PaymentRecord>> {
        let db = Arc::clone(&self.db);
        let provider_payment_id = provider_payment_id.to_string();

        task::spawn_blocking(move || -> AdapterResult<Option<PaymentRecord>> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT id, provider_payment_id, amount_minor, currency, status, created_at
                 FROM payments WHERE provider_payment_id = ?1",
                params![provider_payment_id],
                map_payment_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn insert_payment(conn: &Connection, payment: NewPayment) -> rusqlite::Result<PaymentRecord> {
    let id = Uuid::now_v7();
    let created_at = now_millis();

    conn.execute(
        "INSERT INTO payments (id, provider_payment_id, amount_minor, currency, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id.to_string(),
            payment.provider_payment_id,
            payment.amount_minor,
            payment.currency,
            payment.status.to_string(),
            created_at,
        ],
    )?;

    Ok(PaymentRecord {
        id,
        provider_payment_id: payment.provider_payment_id,
        amount_minor: payment.amount_minor,
        currency: payment.currency,
        status: payment.status,
        created_at: from_millis(created_at),
    })
}

fn map_payment_row(row: &Row<'_>) -> rusqlite::Result<PaymentRecord> {
    let id: String = row.get(0)?;
    let status: String = row.get(4)?;

    Ok(PaymentRecord {
        id: Uuid::parse_str(&id).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err))
        })?,
        provider_payment_id: row.get(1)?,
        amount_minor: row.get(2)?,
        currency: row.get(3)?,
        status: status.parse::<PaymentStatus>().map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(4, Type::Text, err.into())
        })?,
        created_at: from_millis(row.get(5)?),
    })
}
