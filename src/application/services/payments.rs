//! Payment and Stripe Connect relay
//!
//! Thin operations over the [`PaymentGateway`](crate::application::ports::PaymentGateway)
//! used by clients that drive Stripe directly, plus webhook intake.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::application::ports::{CreateIntentRequest, CreatedIntent, PaymentIntent, SharedPaymentGateway};
use crate::config::PaymentsConfig;
use crate::domain::host_account::is_valid_account_id;
use crate::domain::{split_total_cents, DomainError, DomainResult, HostAccount, RepositoryProvider};
use crate::infrastructure::stripe::verify_signature;

/// Stripe's minimum charge in cents
pub const MIN_AMOUNT_CENTS: i64 = 50;
pub const MAX_AMOUNT_CENTS: i64 = 1_000_000;

#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub currency: String,
    pub webhook_secret: String,
    pub webhook_tolerance_secs: i64,
}

impl From<&PaymentsConfig> for PaymentSettings {
    fn from(cfg: &PaymentsConfig) -> Self {
        Self {
            currency: cfg.currency.to_lowercase(),
            webhook_secret: cfg.webhook_secret.clone(),
            webhook_tolerance_secs: cfg.webhook_tolerance_secs,
        }
    }
}

/// Relay request for a raw PaymentIntent
#[derive(Debug, Clone)]
pub struct IntentInput {
    pub amount_cents: i64,
    pub currency: Option<String>,
    pub host_account_id: Option<String>,
    pub charger_id: String,
    pub booking_id: String,
}

/// Outcome of a processed webhook event
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    PaymentSucceeded {
        payment_intent_id: String,
        /// A booking committed with this intent exists
        booking_recorded: bool,
    },
    PaymentFailed {
        payment_intent_id: String,
        reason: Option<String>,
    },
    Ignored(String),
}

pub struct PaymentService {
    repos: Arc<dyn RepositoryProvider>,
    gateway: SharedPaymentGateway,
    settings: PaymentSettings,
}

impl PaymentService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, gateway: SharedPaymentGateway, settings: PaymentSettings) -> Self {
        Self {
            repos,
            gateway,
            settings,
        }
    }

    /// Create a PaymentIntent for an amount the caller computed. With a host
    /// account the platform keeps its fee share of the total.
    pub async fn create_intent(&self, input: IntentInput) -> DomainResult<CreatedIntent> {
        if !(MIN_AMOUNT_CENTS..=MAX_AMOUNT_CENTS).contains(&input.amount_cents) {
            return Err(DomainError::Validation(format!(
                "Amount must be between {} and {} cents",
                MIN_AMOUNT_CENTS, MAX_AMOUNT_CENTS
            )));
        }
        if input.charger_id.trim().is_empty() || input.booking_id.trim().is_empty() {
            return Err(DomainError::Validation(
                "Missing required fields: chargerId, bookingId".into(),
            ));
        }
        let destination = input
            .host_account_id
            .filter(|a| !a.trim().is_empty());
        if let Some(account) = &destination {
            if !is_valid_account_id(account) {
                return Err(DomainError::Validation(format!(
                    "Invalid Stripe account ID: {}",
                    account
                )));
            }
        }

        let request = CreateIntentRequest {
            amount_cents: input.amount_cents,
            currency: input
                .currency
                .map(|c| c.to_lowercase())
                .unwrap_or_else(|| self.settings.currency.clone()),
            application_fee_cents: destination
                .as_ref()
                .map(|_| split_total_cents(input.amount_cents).1),
            destination_account: destination,
            charger_id: input.charger_id,
            booking_id: input.booking_id,
            start_time: None,
            duration_hours: None,
        };
        let booking_id = request.booking_id.clone();

        let created = self.gateway.create_payment_intent(request).await.map_err(|e| {
            metrics::counter!("plugspot_payments_failed_total", "stage" => "create").increment(1);
            DomainError::from(e)
        })?;
        info!(payment_intent_id = %created.payment_intent_id, booking_id = %booking_id, "PaymentIntent created");
        Ok(created)
    }

    /// Current state of a PaymentIntent.
    pub async fn confirm(&self, payment_intent_id: &str) -> DomainResult<PaymentIntent> {
        if payment_intent_id.trim().is_empty() {
            return Err(DomainError::Validation("paymentIntentId is required".into()));
        }
        let intent = self.gateway.retrieve_payment_intent(payment_intent_id).await?;
        debug!(payment_intent_id, status = %intent.status, "PaymentIntent retrieved");
        Ok(intent)
    }

    pub fn connect_oauth_url(&self, host_id: &str, return_url: &str) -> DomainResult<String> {
        if host_id.trim().is_empty() || return_url.trim().is_empty() {
            return Err(DomainError::Validation(
                "Missing required fields: hostId, returnUrl".into(),
            ));
        }
        Ok(self.gateway.connect_oauth_url(host_id, return_url)?)
    }

    /// Finish the Connect OAuth flow. `state` carries the host ID.
    pub async fn connect_callback(&self, code: &str, state: &str) -> DomainResult<HostAccount> {
        if code.trim().is_empty() || state.trim().is_empty() {
            return Err(DomainError::Validation(
                "Missing required fields: code, state".into(),
            ));
        }
        if self.repos.users().find_by_id(state).await?.is_none() {
            return Err(DomainError::not_found("User", "id", state));
        }

        let account_id = self.gateway.exchange_oauth_code(code).await?;
        let details = self.gateway.get_account(&account_id).await?;

        let account = HostAccount {
            host_id: state.to_string(),
            stripe_account_id: details.id,
            email: details.email,
            charges_enabled: details.charges_enabled,
            payouts_enabled: details.payouts_enabled,
            connected_at: Utc::now(),
        };
        self.repos.host_accounts().upsert(account.clone()).await?;
        info!(host_id = state, account_id = %account.stripe_account_id, "Stripe account connected");
        Ok(account)
    }

    pub async fn account(&self, host_id: &str) -> DomainResult<HostAccount> {
        self.repos
            .host_accounts()
            .find_by_host(host_id)
            .await?
            .ok_or_else(|| DomainError::not_found("HostAccount", "host_id", host_id))
    }

    /// Verify and process a Stripe webhook delivery.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
        now_unix: i64,
    ) -> DomainResult<WebhookOutcome> {
        verify_signature(
            payload,
            signature,
            &self.settings.webhook_secret,
            now_unix,
            self.settings.webhook_tolerance_secs,
        )
        .map_err(|e| {
            warn!(error = %e, "Webhook signature rejected");
            DomainError::Validation(format!("Webhook Error: {}", e))
        })?;

        let event: Value = serde_json::from_slice(payload)
            .map_err(|e| DomainError::Validation(format!("Webhook Error: {}", e)))?;
        let event_type = event["type"].as_str().unwrap_or_default().to_string();
        let object = &event["data"]["object"];
        let intent_id = object["id"].as_str().unwrap_or_default().to_string();

        metrics::counter!("plugspot_webhook_events_total", "type" => event_type.clone()).increment(1);

        match event_type.as_str() {
            "payment_intent.succeeded" => {
                let booking_recorded = self
                    .repos
                    .bookings()
                    .find_by_payment_intent(&intent_id)
                    .await?
                    .is_some();
                if booking_recorded {
                    info!(payment_intent_id = %intent_id, "Payment succeeded");
                } else {
                    // The client commits the booking; this only flags stragglers
                    warn!(
                        payment_intent_id = %intent_id,
                        booking_id = object["metadata"]["bookingId"].as_str().unwrap_or(""),
                        "Payment succeeded without a committed booking"
                    );
                }
                Ok(WebhookOutcome::PaymentSucceeded {
                    payment_intent_id: intent_id,
                    booking_recorded,
                })
            }
            "payment_intent.payment_failed" => {
                let reason = object["last_payment_error"]["message"]
                    .as_str()
                    .map(str::to_string);
                metrics::counter!("plugspot_payments_failed_total", "stage" => "webhook").increment(1);
                warn!(payment_intent_id = %intent_id, reason = reason.as_deref().unwrap_or(""), "Payment failed");
                Ok(WebhookOutcome::PaymentFailed {
                    payment_intent_id: intent_id,
                    reason,
                })
            }
            _ => {
                debug!(event_type = %event_type, "Unhandled webhook event");
                Ok(WebhookOutcome::Ignored(event_type))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::IntentStatus;
    use crate::application::services::fixtures::Harness;
    use crate::infrastructure::stripe::webhook::signature_header;

    const SECRET: &str = "whsec_test";

    fn service(h: &Harness) -> PaymentService {
        PaymentService::new(
            h.repos.clone(),
            h.gateway.clone(),
            PaymentSettings {
                currency: "usd".into(),
                webhook_secret: SECRET.into(),
                webhook_tolerance_secs: 300,
            },
        )
    }

    fn input(amount_cents: i64) -> IntentInput {
        IntentInput {
            amount_cents,
            currency: None,
            host_account_id: None,
            charger_id: "c-1".into(),
            booking_id: "b-1".into(),
        }
    }

    #[tokio::test]
    async fn intent_amount_bounds() {
        let h = Harness::new().await;
        let svc = service(&h);

        assert!(matches!(svc.create_intent(input(49)).await, Err(DomainError::Validation(_))));
        assert!(matches!(
            svc.create_intent(input(1_000_001)).await,
            Err(DomainError::Validation(_))
        ));

        let created = svc.create_intent(input(50)).await.unwrap();
        let intent = svc.confirm(&created.payment_intent_id).await.unwrap();
        assert_eq!(intent.amount, 50);
        assert_eq!(intent.currency, "usd");
        assert_eq!(intent.booking_id(), Some("b-1"));
    }

    #[tokio::test]
    async fn malformed_host_account_is_rejected() {
        let h = Harness::new().await;
        let mut req = input(500);
        req.host_account_id = Some("cus_123".into());
        assert!(matches!(
            service(&h).create_intent(req).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn confirm_reports_gateway_status() {
        let h = Harness::new().await;
        let svc = service(&h);
        let created = svc.create_intent(input(500)).await.unwrap();
        h.gateway.set_status(&created.payment_intent_id, IntentStatus::RequiresAction);

        let intent = svc.confirm(&created.payment_intent_id).await.unwrap();
        assert_eq!(intent.status, IntentStatus::RequiresAction);
        assert!(matches!(svc.confirm("pi_nope").await, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn connect_flow_stores_the_account() {
        let h = Harness::new().await;
        let svc = service(&h);

        let url = svc.connect_oauth_url(&h.host.user_id, "http://localhost/return").unwrap();
        assert!(url.contains(&h.host.user_id));
        assert!(matches!(svc.connect_oauth_url("", "x"), Err(DomainError::Validation(_))));

        assert!(matches!(svc.account(&h.host.user_id).await, Err(DomainError::NotFound { .. })));
        let account = svc.connect_callback("mock_code_1", &h.host.user_id).await.unwrap();
        assert!(is_valid_account_id(&account.stripe_account_id));
        assert!(account.can_receive_payments());
        assert_eq!(svc.account(&h.host.user_id).await.unwrap(), account);

        assert!(matches!(
            svc.connect_callback("mock_code_1", "unknown-host").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn webhook_events() {
        let h = Harness::new().await;
        let svc = service(&h);
        let now = 1_700_000_000;

        let body = br#"{"type":"payment_intent.payment_failed","data":{"object":{"id":"pi_1","last_payment_error":{"message":"Your card was declined."}}}}"#;
        let sig = signature_header(SECRET, now, body);
        assert_eq!(
            svc.handle_webhook(body, &sig, now).await.unwrap(),
            WebhookOutcome::PaymentFailed {
                payment_intent_id: "pi_1".into(),
                reason: Some("Your card was declined.".into()),
            }
        );

        let body = br#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_2","metadata":{"bookingId":"b-2"}}}}"#;
        let sig = signature_header(SECRET, now, body);
        assert_eq!(
            svc.handle_webhook(body, &sig, now).await.unwrap(),
            WebhookOutcome::PaymentSucceeded {
                payment_intent_id: "pi_2".into(),
                booking_recorded: false,
            }
        );

        let body = br#"{"type":"charge.refunded","data":{"object":{"id":"ch_1"}}}"#;
        let sig = signature_header(SECRET, now, body);
        assert_eq!(
            svc.handle_webhook(body, &sig, now).await.unwrap(),
            WebhookOutcome::Ignored("charge.refunded".into())
        );

        let sig = signature_header("whsec_wrong", now, body);
        assert!(matches!(
            svc.handle_webhook(body, &sig, now).await,
            Err(DomainError::Validation(_))
        ));
    }
}
