//! Port interfaces for payments

use async_trait::async_trait;
use careslot_domain::{AdapterResult, NewPayment, PaymentIntent, PaymentRecord};

/// Remote payment gateway
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn retrieve_intent(&self, intent_id: &str) -> AdapterResult<PaymentIntent>;

    fn is_configured(&self) -> bool {
        true
    }
}

/// Local ledger of completed charges
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Fails with `AdapterError::Conflict` if the provider id is already
    /// recorded.
    async fn record(&self, payment: NewPayment) -> AdapterResult<PaymentRecord>;

    async fn find_by_provider_id(&self, provider_payment_id: &str)
        -> AdapterResult<Option<PaymentRecord>>;
}
