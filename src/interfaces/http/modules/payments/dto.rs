//! Payment relay DTOs (camelCase, unenveloped)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::ports::{CreatedIntent, PaymentIntent};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateIntentBody {
    /// Cents
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub host_stripe_account_id: Option<String>,
    pub charger_id: String,
    pub booking_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
}

impl From<CreatedIntent> for CreateIntentResponse {
    fn from(c: CreatedIntent) -> Self {
        Self {
            client_secret: c.client_secret,
            payment_intent_id: c.payment_intent_id,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfirmBody {
    pub payment_intent_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentIntentDto {
    pub id: String,
    pub status: String,
    pub amount: i64,
    pub currency: String,
    pub metadata: HashMap<String, String>,
}

impl From<PaymentIntent> for PaymentIntentDto {
    fn from(p: PaymentIntent) -> Self {
        Self {
            id: p.id,
            status: p.status.as_str().to_string(),
            amount: p.amount,
            currency: p.currency,
            metadata: p.metadata,
        }
    }
}

/// Answer of the confirm endpoint. `error` is set when the intent has not
/// succeeded.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResponse {
    pub success: bool,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent: Option<PaymentIntentDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
