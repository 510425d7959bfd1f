use async_trait::async_trait;
use careslot_core::PaymentGateway;
use careslot_domain::{AdapterError, AdapterResult, PaymentIntent};

/// Payment gateway used when no secret key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredPaymentGateway;

#[async_trait]
impl PaymentGateway for UnconfiguredPaymentGateway {
    async fn retrieve_intent(&self, _intent_id: &str) -> AdapterResult<PaymentIntent> {
        Err(AdapterError::Unavailable("payment gateway is not configured".into()))
    }

    fn is_configured(&self) -> bool {
        false
    }
}
