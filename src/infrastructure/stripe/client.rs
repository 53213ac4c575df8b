//! Stripe HTTP client
//!
//! Thin reqwest client for the handful of Stripe endpoints the marketplace
//! uses: PaymentIntents, Connect OAuth and account lookup. Requests are
//! form-encoded and authenticated with the secret key as a bearer token.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::application::ports::{
    ConnectedAccount, CreateIntentRequest, CreatedIntent, IntentStatus, PaymentGateway,
    PaymentGatewayError, PaymentIntent,
};
use crate::config::PaymentsConfig;
use crate::shared::retry::{retry_with_backoff, RetryConfig};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub struct StripeClient {
    http: Client,
    secret_key: String,
    connect_client_id: String,
    api_base: String,
    connect_base: String,
    retry: RetryConfig,
}

impl StripeClient {
    pub fn new(config: &PaymentsConfig) -> Result<Self, PaymentGatewayError> {
        if config.stripe_secret_key.is_empty() {
            return Err(PaymentGatewayError::NotConfigured(
                "STRIPE_SECRET_KEY is not set".to_string(),
            ));
        }
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PaymentGatewayError::NotConfigured(e.to_string()))?;

        Ok(Self {
            http,
            secret_key: config.stripe_secret_key.clone(),
            connect_client_id: config.connect_client_id.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            connect_base: config.connect_base.trim_end_matches('/').to_string(),
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Send a request built by `build`, retrying transient failures.
    async fn call<T, F>(
        &self,
        operation: &str,
        not_found: (&'static str, &str),
        build: F,
    ) -> Result<T, PaymentGatewayError>
    where
        T: DeserializeOwned + Send,
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        retry_with_backoff(
            self.retry.clone(),
            || execute::<T>(build(), not_found),
            PaymentGatewayError::is_transient,
            operation,
        )
        .await
    }
}

async fn execute<T: DeserializeOwned>(
    request: RequestBuilder,
    not_found: (&'static str, &str),
) -> Result<T, PaymentGatewayError> {
    let resp = request
        .send()
        .await
        .map_err(|e| PaymentGatewayError::Unavailable(e.to_string()))?;

    let status = resp.status().as_u16();
    let body = resp
        .text()
        .await
        .map_err(|e| PaymentGatewayError::Unavailable(e.to_string()))?;

    if !(200..300).contains(&status) {
        return Err(map_api_error(status, &body, not_found));
    }

    serde_json::from_str::<T>(&body)
        .map_err(|e| PaymentGatewayError::Unavailable(format!("invalid Stripe response: {}", e)))
}

/// Stripe API errors are `{"error": {"message": ..}}`; OAuth errors are
/// `{"error": "invalid_grant", "error_description": ..}`.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    if let Some(msg) = error.get("message").and_then(|m| m.as_str()) {
        return Some(msg.to_string());
    }
    value
        .get("error_description")
        .and_then(|d| d.as_str())
        .or_else(|| error.as_str())
        .map(str::to_string)
}

fn map_api_error(status: u16, body: &str, not_found: (&'static str, &str)) -> PaymentGatewayError {
    let message =
        error_message(body).unwrap_or_else(|| format!("Stripe returned HTTP {}", status));
    match status {
        404 => PaymentGatewayError::NotFound {
            entity: not_found.0,
            id: not_found.1.to_string(),
        },
        401 | 403 => PaymentGatewayError::NotConfigured(message),
        429 | 500..=599 => PaymentGatewayError::Unavailable(message),
        _ => PaymentGatewayError::Rejected(message),
    }
}

/// Form body for `POST /v1/payment_intents`.
fn intent_form(request: &CreateIntentRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("amount".to_string(), request.amount_cents.to_string()),
        ("currency".to_string(), request.currency.to_lowercase()),
        ("automatic_payment_methods[enabled]".to_string(), "true".to_string()),
    ];
    for (key, value) in request.metadata() {
        form.push((format!("metadata[{}]", key), value));
    }
    if let Some(account) = &request.destination_account {
        form.push(("on_behalf_of".to_string(), account.clone()));
        form.push(("transfer_data[destination]".to_string(), account.clone()));
        if let Some(fee) = request.application_fee_cents {
            form.push(("application_fee_amount".to_string(), fee.to_string()));
        }
    }
    form
}

fn oauth_authorize_url(
    connect_base: &str,
    client_id: &str,
    host_id: &str,
    return_url: &str,
) -> Result<String, PaymentGatewayError> {
    Url::parse_with_params(
        &format!("{}/oauth/authorize", connect_base),
        &[
            ("response_type", "code"),
            ("client_id", client_id),
            ("scope", "read_write"),
            ("redirect_uri", return_url),
            ("state", host_id),
        ],
    )
    .map(String::from)
    .map_err(|e| PaymentGatewayError::NotConfigured(format!("invalid connect_base: {}", e)))
}

#[derive(Debug, Deserialize)]
struct IntentBody {
    id: String,
    client_secret: Option<String>,
    status: String,
    amount: i64,
    currency: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

impl From<IntentBody> for PaymentIntent {
    fn from(b: IntentBody) -> Self {
        Self {
            id: b.id,
            status: IntentStatus::from_str(&b.status),
            amount: b.amount,
            currency: b.currency,
            metadata: b.metadata,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OAuthTokenBody {
    stripe_user_id: String,
}

#[derive(Debug, Deserialize)]
struct AccountBody {
    id: String,
    email: Option<String>,
    #[serde(default)]
    charges_enabled: bool,
    #[serde(default)]
    payouts_enabled: bool,
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_payment_intent(
        &self,
        request: CreateIntentRequest,
    ) -> Result<CreatedIntent, PaymentGatewayError> {
        let form = intent_form(&request);
        // Safe to retry: Stripe replays the first response for a repeated key.
        let idempotency_key = format!("pi-{}-{}", request.booking_id, request.amount_cents);
        let url = format!("{}/v1/payment_intents", self.api_base);

        let body: IntentBody = self
            .call("create_payment_intent", ("PaymentIntent", ""), || {
                self.http
                    .post(&url)
                    .bearer_auth(&self.secret_key)
                    .header("Idempotency-Key", &idempotency_key)
                    .form(&form)
            })
            .await?;

        info!(
            payment_intent_id = %body.id,
            amount = request.amount_cents,
            booking_id = %request.booking_id,
            split = request.destination_account.is_some(),
            "PaymentIntent created"
        );

        let client_secret = body.client_secret.ok_or_else(|| {
            PaymentGatewayError::Unavailable("PaymentIntent has no client_secret".to_string())
        })?;
        Ok(CreatedIntent {
            payment_intent_id: body.id,
            client_secret,
        })
    }

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, PaymentGatewayError> {
        let url = format!("{}/v1/payment_intents/{}", self.api_base, id);
        let body: IntentBody = self
            .call("retrieve_payment_intent", ("PaymentIntent", id), || {
                self.http.get(&url).bearer_auth(&self.secret_key)
            })
            .await?;
        debug!(payment_intent_id = %body.id, status = %body.status, "PaymentIntent retrieved");
        Ok(body.into())
    }

    fn connect_oauth_url(
        &self,
        host_id: &str,
        return_url: &str,
    ) -> Result<String, PaymentGatewayError> {
        if self.connect_client_id.is_empty() {
            return Err(PaymentGatewayError::NotConfigured(
                "STRIPE_CONNECT_CLIENT_ID is not set".to_string(),
            ));
        }
        oauth_authorize_url(&self.connect_base, &self.connect_client_id, host_id, return_url)
    }

    async fn exchange_oauth_code(&self, code: &str) -> Result<String, PaymentGatewayError> {
        let url = format!("{}/oauth/token", self.connect_base);
        let form = [("grant_type", "authorization_code"), ("code", code)];
        let body: OAuthTokenBody = self
            .call("exchange_oauth_code", ("OAuth code", code), || {
                self.http.post(&url).bearer_auth(&self.secret_key).form(&form)
            })
            .await?;
        info!(account_id = %body.stripe_user_id, "Stripe Connect account linked");
        Ok(body.stripe_user_id)
    }

    async fn get_account(&self, account_id: &str) -> Result<ConnectedAccount, PaymentGatewayError> {
        let url = format!("{}/v1/accounts/{}", self.api_base, account_id);
        let body: AccountBody = self
            .call("get_account", ("Stripe account", account_id), || {
                self.http.get(&url).bearer_auth(&self.secret_key)
            })
            .await?;
        Ok(ConnectedAccount {
            id: body.id,
            email: body.email,
            charges_enabled: body.charges_enabled,
            payouts_enabled: body.payouts_enabled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::payment::{
        META_BOOKING_ID, META_CHARGER_ID, META_DURATION_HOURS, META_START_TIME,
    };

    fn request(destination: Option<&str>) -> CreateIntentRequest {
        CreateIntentRequest {
            amount_cents: 418,
            currency: "USD".into(),
            destination_account: destination.map(str::to_string),
            application_fee_cents: Some(90),
            charger_id: "c-1".into(),
            booking_id: "b-1".into(),
            start_time: None,
            duration_hours: None,
        }
    }

    fn lookup<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn plain_intent_has_no_split() {
        let form = intent_form(&request(None));
        assert_eq!(lookup(&form, "amount"), Some("418"));
        assert_eq!(lookup(&form, "currency"), Some("usd"));
        assert_eq!(lookup(&form, "automatic_payment_methods[enabled]"), Some("true"));
        assert_eq!(lookup(&form, "metadata[bookingId]"), Some("b-1"));
        assert_eq!(lookup(&form, "metadata[chargerId]"), Some("c-1"));
        assert_eq!(lookup(&form, "transfer_data[destination]"), None);
        assert_eq!(lookup(&form, "application_fee_amount"), None);
    }

    #[test]
    fn split_intent_routes_to_host() {
        let form = intent_form(&request(Some("acct_123")));
        assert_eq!(lookup(&form, "on_behalf_of"), Some("acct_123"));
        assert_eq!(lookup(&form, "transfer_data[destination]"), Some("acct_123"));
        assert_eq!(lookup(&form, "application_fee_amount"), Some("90"));
    }

    #[test]
    fn oauth_url_carries_host_in_state() {
        let url = oauth_authorize_url(
            "https://connect.stripe.com",
            "ca_123",
            "host-1",
            "https://app.example/host/stripe/callback",
        )
        .unwrap();
        assert!(url.starts_with("https://connect.stripe.com/oauth/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=ca_123"));
        assert!(url.contains("scope=read_write"));
        assert!(url.contains("state=host-1"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.example%2Fhost%2Fstripe%2Fcallback"));
    }

    #[test]
    fn api_errors_are_classified() {
        let card = r#"{"error":{"type":"card_error","message":"Your card was declined."}}"#;
        match map_api_error(402, card, ("PaymentIntent", "pi_1")) {
            PaymentGatewayError::Rejected(m) => assert_eq!(m, "Your card was declined."),
            other => panic!("unexpected {:?}", other),
        }

        assert!(map_api_error(503, "oops", ("PaymentIntent", "pi_1")).is_transient());
        assert!(matches!(
            map_api_error(404, "{}", ("PaymentIntent", "pi_1")),
            PaymentGatewayError::NotFound { id, .. } if id == "pi_1"
        ));

        let oauth = r#"{"error":"invalid_grant","error_description":"Authorization code expired"}"#;
        match map_api_error(400, oauth, ("OAuth code", "ac_1")) {
            PaymentGatewayError::Rejected(m) => assert_eq!(m, "Authorization code expired"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn metadata_keys_match_port() {
        let form = intent_form(&request(None));
        assert!(lookup(&form, &format!("metadata[{}]", META_BOOKING_ID)).is_some());
        assert!(lookup(&form, &format!("metadata[{}]", META_CHARGER_ID)).is_some());
        assert!(lookup(&form, &format!("metadata[{}]", META_START_TIME)).is_none());

        let mut booking = request(None);
        booking.start_time = chrono::DateTime::parse_from_rfc3339("2026-03-15T10:00:00Z")
            .ok()
            .map(|t| t.with_timezone(&chrono::Utc));
        booking.duration_hours = Some(2);
        let form = intent_form(&booking);
        assert_eq!(
            lookup(&form, &format!("metadata[{}]", META_START_TIME)),
            Some("2026-03-15T10:00:00Z")
        );
        assert_eq!(lookup(&form, &format!("metadata[{}]", META_DURATION_HOURS)), Some("2"));
    }

    #[test]
    fn client_requires_secret_key() {
        let cfg = PaymentsConfig::default();
        assert!(matches!(
            StripeClient::new(&cfg),
            Err(PaymentGatewayError::NotConfigured(_))
        ));
    }
}
