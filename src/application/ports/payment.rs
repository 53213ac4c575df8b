//! Payment gateway port
//!
//! [`PaymentGateway`] is the contract between the booking flow and the card
//! processor. Amounts are integer cents in the smallest currency unit.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use crate::shared::errors::DomainError;

pub type SharedPaymentGateway = Arc<dyn PaymentGateway>;

/// Metadata keys attached to every PaymentIntent we create.
pub const META_BOOKING_ID: &str = "bookingId";
pub const META_CHARGER_ID: &str = "chargerId";
/// Slot metadata, only set on intents opened by a booking checkout.
pub const META_START_TIME: &str = "startTime";
pub const META_DURATION_HOURS: &str = "durationHours";

#[derive(Debug, Error)]
pub enum PaymentGatewayError {
    /// Declined or invalid; the message is meant for the user.
    #[error("{0}")]
    Rejected(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Network failure, timeout, rate limit or 5xx.
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),

    #[error("Payment gateway not configured: {0}")]
    NotConfigured(String),
}

impl PaymentGatewayError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<PaymentGatewayError> for DomainError {
    fn from(e: PaymentGatewayError) -> Self {
        match e {
            PaymentGatewayError::Rejected(msg) => DomainError::Payment(msg),
            PaymentGatewayError::NotFound { entity, id } => DomainError::not_found(entity, "id", id),
            PaymentGatewayError::Unavailable(msg) => DomainError::GatewayUnavailable(msg),
            PaymentGatewayError::NotConfigured(msg) => DomainError::GatewayUnavailable(msg),
        }
    }
}

/// Parameters for a new PaymentIntent
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIntentRequest {
    pub amount_cents: i64,
    pub currency: String,
    /// Host's Connect account; when set the charge is split
    pub destination_account: Option<String>,
    /// Platform's share when `destination_account` is set
    pub application_fee_cents: Option<i64>,
    pub charger_id: String,
    pub booking_id: String,
    pub start_time: Option<DateTime<Utc>>,
    pub duration_hours: Option<u32>,
}

impl CreateIntentRequest {
    pub fn metadata(&self) -> Vec<(&'static str, String)> {
        let mut meta = vec![
            (META_CHARGER_ID, self.charger_id.clone()),
            (META_BOOKING_ID, self.booking_id.clone()),
        ];
        if let Some(start) = self.start_time {
            meta.push((META_START_TIME, start.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        if let Some(hours) = self.duration_hours {
            meta.push((META_DURATION_HOURS, hours.to_string()));
        }
        meta
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedIntent {
    pub payment_intent_id: String,
    pub client_secret: String,
}

/// PaymentIntent lifecycle status as reported by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    Other(String),
}

impl IntentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Succeeded => "succeeded",
            Self::Other(s) => s,
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "requires_payment_method" => Self::RequiresPaymentMethod,
            "requires_confirmation" => Self::RequiresConfirmation,
            "requires_action" => Self::RequiresAction,
            "processing" => Self::Processing,
            "requires_capture" => Self::RequiresCapture,
            "canceled" => Self::Canceled,
            "succeeded" => Self::Succeeded,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntent {
    pub id: String,
    pub status: IntentStatus,
    pub amount: i64,
    pub currency: String,
    pub metadata: HashMap<String, String>,
}

impl PaymentIntent {
    pub fn booking_id(&self) -> Option<&str> {
        self.metadata.get(META_BOOKING_ID).map(String::as_str)
    }

    pub fn charger_id(&self) -> Option<&str> {
        self.metadata.get(META_CHARGER_ID).map(String::as_str)
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.metadata
            .get(META_START_TIME)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
    }

    pub fn duration_hours(&self) -> Option<u32> {
        self.metadata
            .get(META_DURATION_HOURS)
            .and_then(|s| s.parse().ok())
    }
}

/// Connect account details
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedAccount {
    pub id: String,
    pub email: Option<String>,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a PaymentIntent for the guest to confirm client-side.
    async fn create_payment_intent(
        &self,
        request: CreateIntentRequest,
    ) -> Result<CreatedIntent, PaymentGatewayError>;

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, PaymentGatewayError>;

    /// OAuth URL that links a host's Stripe account. `host_id` round-trips
    /// through the `state` parameter.
    fn connect_oauth_url(&self, host_id: &str, return_url: &str)
        -> Result<String, PaymentGatewayError>;

    /// Exchange an OAuth authorization code for the connected account ID.
    async fn exchange_oauth_code(&self, code: &str) -> Result<String, PaymentGatewayError>;

    async fn get_account(&self, account_id: &str) -> Result<ConnectedAccount, PaymentGatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_errors_map_to_domain() {
        let e: DomainError = PaymentGatewayError::Rejected("Your card was declined.".into()).into();
        assert!(matches!(e, DomainError::Payment(ref m) if m == "Your card was declined."));

        let e: DomainError = PaymentGatewayError::Unavailable("timeout".into()).into();
        assert!(e.is_transient());
    }

    #[test]
    fn intent_status_parsing() {
        assert!(IntentStatus::from_str("succeeded").is_succeeded());
        assert_eq!(
            IntentStatus::from_str("requires_action"),
            IntentStatus::RequiresAction
        );
        assert_eq!(IntentStatus::from_str("weird").as_str(), "weird");
    }

    #[test]
    fn slot_metadata_round_trips_through_the_intent() {
        let start = DateTime::parse_from_rfc3339("2026-03-15T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let request = CreateIntentRequest {
            amount_cents: 611,
            currency: "usd".into(),
            destination_account: None,
            application_fee_cents: None,
            charger_id: "c-1".into(),
            booking_id: "b-1".into(),
            start_time: Some(start),
            duration_hours: Some(2),
        };
        let intent = PaymentIntent {
            id: "pi_1".into(),
            status: IntentStatus::Succeeded,
            amount: 611,
            currency: "usd".into(),
            metadata: request
                .metadata()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        };
        assert_eq!(intent.metadata[META_START_TIME], "2026-03-15T10:00:00Z");
        assert_eq!(intent.start_time(), Some(start));
        assert_eq!(intent.duration_hours(), Some(2));
        assert_eq!(intent.charger_id(), Some("c-1"));
    }
}
