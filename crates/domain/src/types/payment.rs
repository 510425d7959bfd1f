//! Payment types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a recorded charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
    Refunded,
}

crate::impl_domain_status_conversions!(PaymentStatus {
    Completed => "completed",
    Refunded => "refunded",
});

/// Payment intent as reported by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Raw gateway status (`succeeded`, `requires_payment_method`, ...)
    pub status: String,
    /// Amount in the currency's minor unit (cents)
    pub amount_minor: i64,
    pub currency: String,
}

impl PaymentIntent {
    pub fn is_succeeded(&self) -> bool {
        self.status == "succeeded"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    pub provider_payment_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: PaymentStatus,
}

/// A charge recorded in the local ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: Uuid,
    pub provider_payment_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}
