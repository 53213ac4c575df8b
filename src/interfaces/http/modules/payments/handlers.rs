//! Payment relay handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use super::dto::{ConfirmBody, ConfirmResponse, CreateIntentBody, CreateIntentResponse};
use crate::application::services::IntentInput;
use crate::application::PaymentService;
use crate::interfaces::http::common::{RelayError, RelayErrorBody};

#[derive(Clone)]
pub struct PaymentHandlerState {
    pub payments: Arc<PaymentService>,
}

#[utoipa::path(
    post,
    path = "/api/payments/create-intent",
    tag = "Payments",
    request_body = CreateIntentBody,
    responses(
        (status = 200, description = "PaymentIntent created", body = CreateIntentResponse),
        (status = 400, description = "Missing or invalid fields", body = RelayErrorBody),
        (status = 402, description = "Rejected by Stripe", body = RelayErrorBody)
    )
)]
pub async fn create_payment_intent(
    State(state): State<PaymentHandlerState>,
    Json(body): Json<CreateIntentBody>,
) -> Result<Json<CreateIntentResponse>, RelayError> {
    let amount_cents = body
        .amount
        .ok_or_else(|| RelayError::bad_request("Missing required fields: amount"))?;
    let created = state
        .payments
        .create_intent(IntentInput {
            amount_cents,
            currency: body.currency,
            host_account_id: body.host_stripe_account_id,
            charger_id: body.charger_id,
            booking_id: body.booking_id,
        })
        .await?;
    Ok(Json(created.into()))
}

#[utoipa::path(
    post,
    path = "/api/payments/confirm",
    tag = "Payments",
    request_body = ConfirmBody,
    responses(
        (status = 200, description = "Payment succeeded", body = ConfirmResponse),
        (status = 400, description = "Payment not completed", body = ConfirmResponse),
        (status = 404, description = "Unknown PaymentIntent", body = RelayErrorBody)
    )
)]
pub async fn confirm_payment(
    State(state): State<PaymentHandlerState>,
    Json(body): Json<ConfirmBody>,
) -> Result<(StatusCode, Json<ConfirmResponse>), RelayError> {
    let intent = state.payments.confirm(&body.payment_intent_id).await?;
    let status = intent.status.as_str().to_string();

    if intent.status.is_succeeded() {
        Ok((
            StatusCode::OK,
            Json(ConfirmResponse {
                success: true,
                status,
                payment_intent: Some(intent.into()),
                error: None,
            }),
        ))
    } else {
        Ok((
            StatusCode::BAD_REQUEST,
            Json(ConfirmResponse {
                success: false,
                status,
                payment_intent: None,
                error: Some("Payment not completed".into()),
            }),
        ))
    }
}
