use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use careslot_core::{PaymentGateway, PaymentRepository};
use careslot_domain::{
    AdapterError, AdapterResult, NewPayment, PaymentIntent, PaymentRecord,
};
use chrono::Utc;
use uuid::Uuid;

use super::Failures;

/// Payment gateway answering from a fixed set of intents.
#[derive(Default, Clone)]
pub struct MockPaymentGateway {
    intents: Arc<Mutex<HashMap<String, PaymentIntent>>>,
    calls: Arc<Mutex<usize>>,
    pub failures: Failures,
}

impl MockPaymentGateway {
    pub fn with_intent(self, id: &str, status: &str, amount_minor: i64) -> Self {
        self.intents.lock().unwrap().insert(
            id.to_string(),
            PaymentIntent {
                id: id.to_string(),
                status: status.to_string(),
                amount_minor,
                currency: "eur".into(),
            },
        );
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn retrieve_intent(&self, intent_id: &str) -> AdapterResult<PaymentIntent> {
        *self.calls.lock().unwrap() += 1;
        self.failures.check("retrieve_intent")?;
        self.intents
            .lock()
            .unwrap()
            .get(intent_id)
            .cloned()
            .ok_or_else(|| AdapterError::NotFound(intent_id.to_string()))
    }
}

/// In-memory payment ledger.
#[derive(Default, Clone)]
pub struct MockPaymentRepository {
    records: Arc<Mutex<Vec<PaymentRecord>>>,
    pub failures: Failures,
}

impl MockPaymentRepository {
    pub fn records(&self) -> Vec<PaymentRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentRepository for MockPaymentRepository {
    async fn record(&self, payment: NewPayment) -> AdapterResult<PaymentRecord> {
        self.failures.check("record")?;
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.provider_payment_id == payment.provider_payment_id) {
            return Err(AdapterError::Conflict(payment.provider_payment_id));
        }
        let record = PaymentRecord {
            id: Uuid::now_v7(),
            provider_payment_id: payment.provider_payment_id,
            amount_minor: payment.amount_minor,
            currency: payment.currency,
            status: payment.status,
            created_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn find_by_provider_id(
        &self,
        provider_payment_id: &str,
    ) -> AdapterResult<Option<PaymentRecord>> {
        self.failures.check("find_by_provider_id")?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.provider_payment_id == provider_payment_id)
            .cloned())
    }
}
