//! Stripe payment gateway

use std::time::Duration;

use async_trait::async_trait;
use careslot_core::PaymentGateway;
use careslot_domain::{AdapterError, AdapterResult, PaymentIntent, PaymentsConfig};
use reqwest::Method;
use serde::Deserialize;

use crate::http::{check_response, HttpClient};

/// Reads payment intents from the Stripe REST API.
pub struct StripePaymentGateway {
    http: HttpClient,
    base_url: String,
    secret_key: String,
}

impl StripePaymentGateway {
    pub fn new(config: &PaymentsConfig) -> AdapterResult<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        })
    }
}

#[async_trait]
impl PaymentGateway for StripePaymentGateway {
    async fn retrieve_intent(&self, intent_id: &str) -> AdapterResult<PaymentIntent> {
        let url =
            format!("{}/v1/payment_intents/{}", self.base_url, urlencoding::encode(intent_id));
        let request = self.http.request(Method::GET, url).bearer_auth(&self.secret_key);

        let response = check_response(self.http.send(request).await?).await?;
        let intent: StripePaymentIntent = response.json().await.map_err(|err| {
            AdapterError::Internal(format!("invalid payment intent response: {err}"))
        })?;

        Ok(PaymentIntent {
            id: intent.id,
            status: intent.status,
            amount_minor: intent.amount,
            currency: intent.currency,
        })
    }
}

#[derive(Debug, Deserialize)]
struct StripePaymentIntent {
    id: String,
    status: String,
    amount: i64,
    currency: String,
}
