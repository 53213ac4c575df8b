//! Email relay handler

use std::sync::Arc;

use axum::{extract::State, Json};

use super::dto::{SendEmailBody, SendEmailResponse};
use crate::application::BookingNotifier;
use crate::interfaces::http::common::{RelayError, RelayErrorBody};

#[derive(Clone)]
pub struct EmailHandlerState {
    pub notifier: Arc<BookingNotifier>,
}

#[utoipa::path(
    post,
    path = "/api/email/send",
    tag = "Email",
    request_body = SendEmailBody,
    responses(
        (status = 200, description = "Handed to the provider", body = SendEmailResponse),
        (status = 400, description = "Missing fields or rejected", body = RelayErrorBody),
        (status = 503, description = "Provider unavailable", body = RelayErrorBody)
    )
)]
pub async fn send_email(
    State(state): State<EmailHandlerState>,
    Json(body): Json<SendEmailBody>,
) -> Result<Json<SendEmailResponse>, RelayError> {
    let sent = state.notifier.relay(body.into()).await?;
    Ok(Json(SendEmailResponse {
        success: true,
        message_id: sent.id,
    }))
}
