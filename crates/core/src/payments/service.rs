//! Payment confirmation service

use std::sync::Arc;

use careslot_domain::{
    AdapterError, CareslotError, NewPayment, PaymentRecord, PaymentStatus, Result, Store, SyncStep,
};
use tracing::{info, warn};

use super::ports::{PaymentGateway, PaymentRepository};

/// Records completed charges reported by the payment gateway
pub struct PaymentService {
    gateway: Arc<dyn PaymentGateway>,
    repository: Arc<dyn PaymentRepository>,
}

impl PaymentService {
    pub fn new(gateway: Arc<dyn PaymentGateway>, repository: Arc<dyn PaymentRepository>) -> Self {
        Self { gateway, repository }
    }

    /// Record a succeeded payment intent. Confirming the same intent twice
    /// returns the existing record.
    pub async fn confirm_payment(&self, intent_id: &str) -> Result<PaymentRecord> {
        let intent_id = intent_id.trim();
        if intent_id.is_empty() {
            return Err(CareslotError::invalid_input("paymentIntentId is required"));
        }

        if let Some(existing) = self.find_recorded(intent_id).await? {
            return Ok(existing);
        }

        let intent = self.gateway.retrieve_intent(intent_id).await.map_err(|err| {
            CareslotError::from_adapter(Store::PaymentGateway, SyncStep::RetrievePayment, err)
        })?;

        if !intent.is_succeeded() {
            warn!(payment_intent = %intent_id, status = %intent.status, "payment not succeeded");
            return Err(CareslotError::ValidationRejected {
                store: Some(Store::PaymentGateway),
                message: format!("payment {intent_id} has status {}", intent.status),
            });
        }

        let payment = NewPayment {
            provider_payment_id: intent.id,
            amount_minor: intent.amount_minor,
            currency: intent.currency,
            status: PaymentStatus::Completed,
        };

        match self.repository.record(payment).await {
            Ok(record) => {
                info!(payment_intent = %intent_id, record_id = %record.id, "payment recorded");
                Ok(record)
            }
            // Lost a race with a concurrent confirmation of the same intent
            Err(AdapterError::Conflict(_)) => self
                .find_recorded(intent_id)
                .await?
                .ok_or_else(|| CareslotError::not_found("payment", intent_id)),
            Err(err) => {
                Err(CareslotError::from_adapter(Store::RecordStore, SyncStep::RecordPayment, err))
            }
        }
    }

    async fn find_recorded(&self, intent_id: &str) -> Result<Option<PaymentRecord>> {
        self.repository
            .find_by_provider_id(intent_id)
            .await
            .map_err(|err| CareslotError::from_adapter(Store::RecordStore, SyncStep::RecordPayment, err))
    }
}
