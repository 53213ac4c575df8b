//! Stripe webhook handler
//!
//! The signature covers the raw body, so the payload is taken as bytes.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::PaymentService;
use crate::interfaces::http::common::{RelayError, RelayErrorBody};

pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Clone)]
pub struct WebhookHandlerState {
    pub payments: Arc<PaymentService>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub received: bool,
}

#[utoipa::path(
    post,
    path = "/api/webhooks/stripe",
    tag = "Payments",
    request_body(content = String, description = "Raw Stripe event JSON", content_type = "application/json"),
    responses(
        (status = 200, description = "Event accepted", body = WebhookAck),
        (status = 400, description = "Bad signature or payload", body = RelayErrorBody)
    )
)]
pub async fn stripe_webhook(
    State(state): State<WebhookHandlerState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, RelayError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| RelayError::bad_request("Webhook Error: missing Stripe-Signature header"))?;

    state
        .payments
        .handle_webhook(&body, signature, Utc::now().timestamp())
        .await?;
    Ok(Json(WebhookAck { received: true }))
}
