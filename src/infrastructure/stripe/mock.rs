//! In-process payment gateway
//!
//! Approves every PaymentIntent on creation unless told otherwise. Selected
//! with `payments.mode = "mock"`, which is refused in production.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;

use crate::application::ports::{
    ConnectedAccount, CreateIntentRequest, CreatedIntent, IntentStatus, PaymentGateway,
    PaymentGatewayError, PaymentIntent,
};

pub struct MockPaymentGateway {
    intents: DashMap<String, PaymentIntent>,
    /// Status given to newly created intents
    initial_status: IntentStatus,
    public_base_url: String,
}

impl MockPaymentGateway {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            intents: DashMap::new(),
            initial_status: IntentStatus::Succeeded,
            public_base_url: public_base_url.into(),
        }
    }

    /// Newly created intents start in `status` instead of `succeeded`.
    pub fn with_initial_status(mut self, status: IntentStatus) -> Self {
        self.initial_status = status;
        self
    }

    pub fn set_status(&self, id: &str, status: IntentStatus) {
        if let Some(mut intent) = self.intents.get_mut(id) {
            intent.status = status;
        }
    }

    /// Insert an intent directly, bypassing creation.
    pub fn insert_intent(&self, intent: PaymentIntent) {
        self.intents.insert(intent.id.clone(), intent);
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_payment_intent(
        &self,
        request: CreateIntentRequest,
    ) -> Result<CreatedIntent, PaymentGatewayError> {
        let id = format!("pi_mock_{}", uuid::Uuid::new_v4().simple());
        let metadata: HashMap<String, String> = request
            .metadata()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        self.intents.insert(
            id.clone(),
            PaymentIntent {
                id: id.clone(),
                status: self.initial_status.clone(),
                amount: request.amount_cents,
                currency: request.currency,
                metadata,
            },
        );
        info!(payment_intent_id = %id, amount = request.amount_cents, "Mock PaymentIntent created");

        Ok(CreatedIntent {
            client_secret: format!("{}_secret_mock", id),
            payment_intent_id: id,
        })
    }

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, PaymentGatewayError> {
        self.intents
            .get(id)
            .map(|i| i.clone())
            .ok_or_else(|| PaymentGatewayError::NotFound {
                entity: "PaymentIntent",
                id: id.to_string(),
            })
    }

    fn connect_oauth_url(
        &self,
        host_id: &str,
        return_url: &str,
    ) -> Result<String, PaymentGatewayError> {
        let _ = return_url;
        Ok(format!(
            "{}/host/stripe/callback?code=mock_code_{}&state={}",
            self.public_base_url.trim_end_matches('/'),
            host_id,
            host_id
        ))
    }

    async fn exchange_oauth_code(&self, code: &str) -> Result<String, PaymentGatewayError> {
        let suffix: String = code.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        if suffix.is_empty() {
            return Err(PaymentGatewayError::Rejected("Invalid authorization code".into()));
        }
        Ok(format!("acct_mock{}", suffix))
    }

    async fn get_account(&self, account_id: &str) -> Result<ConnectedAccount, PaymentGatewayError> {
        Ok(ConnectedAccount {
            id: account_id.to_string(),
            email: None,
            charges_enabled: true,
            payouts_enabled: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::host_account::is_valid_account_id;

    fn request() -> CreateIntentRequest {
        CreateIntentRequest {
            amount_cents: 418,
            currency: "usd".into(),
            destination_account: None,
            application_fee_cents: None,
            charger_id: "c-1".into(),
            booking_id: "b-1".into(),
            start_time: None,
            duration_hours: None,
        }
    }

    #[tokio::test]
    async fn created_intent_is_retrievable_with_metadata() {
        let gw = MockPaymentGateway::new("http://localhost:5173");
        let created = gw.create_payment_intent(request()).await.unwrap();
        let intent = gw.retrieve_payment_intent(&created.payment_intent_id).await.unwrap();
        assert!(intent.status.is_succeeded());
        assert_eq!(intent.amount, 418);
        assert_eq!(intent.booking_id(), Some("b-1"));
        assert!(created.client_secret.starts_with(&created.payment_intent_id));
    }

    #[tokio::test]
    async fn unknown_intent_is_not_found() {
        let gw = MockPaymentGateway::new("http://localhost");
        assert!(matches!(
            gw.retrieve_payment_intent("pi_missing").await,
            Err(PaymentGatewayError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn oauth_code_yields_valid_account_id() {
        let gw = MockPaymentGateway::new("http://localhost");
        let id = gw.exchange_oauth_code("mock_code_h-1").await.unwrap();
        assert!(is_valid_account_id(&id), "{}", id);
    }
}
