//! Stripe Connect handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::dto::{CallbackBody, ConnectedAccountResponse, OAuthUrlParams, OAuthUrlResponse};
use crate::application::PaymentService;
use crate::interfaces::http::common::{RelayError, RelayErrorBody};

#[derive(Clone)]
pub struct ConnectHandlerState {
    pub payments: Arc<PaymentService>,
}

#[utoipa::path(
    get,
    path = "/api/stripe-connect/oauth-url",
    tag = "Stripe Connect",
    params(OAuthUrlParams),
    responses(
        (status = 200, description = "Authorization URL to redirect the host to", body = OAuthUrlResponse),
        (status = 400, description = "Missing hostId or returnUrl", body = RelayErrorBody)
    )
)]
pub async fn oauth_url(
    State(state): State<ConnectHandlerState>,
    Query(params): Query<OAuthUrlParams>,
) -> Result<Json<OAuthUrlResponse>, RelayError> {
    let oauth_url = state
        .payments
        .connect_oauth_url(&params.host_id, &params.return_url)?;
    Ok(Json(OAuthUrlResponse { oauth_url }))
}

#[utoipa::path(
    post,
    path = "/api/stripe-connect/callback",
    tag = "Stripe Connect",
    request_body = CallbackBody,
    responses(
        (status = 200, description = "Account linked", body = ConnectedAccountResponse),
        (status = 400, description = "Missing code or state", body = RelayErrorBody),
        (status = 404, description = "Unknown host", body = RelayErrorBody)
    )
)]
pub async fn oauth_callback(
    State(state): State<ConnectHandlerState>,
    Json(body): Json<CallbackBody>,
) -> Result<Json<ConnectedAccountResponse>, RelayError> {
    let account = state
        .payments
        .connect_callback(&body.code, &body.state)
        .await?;
    Ok(Json(account.into()))
}

#[utoipa::path(
    get,
    path = "/api/stripe-connect/account/{host_id}",
    tag = "Stripe Connect",
    params(("host_id" = String, Path, description = "Host user ID")),
    responses(
        (status = 200, description = "Linked account", body = ConnectedAccountResponse),
        (status = 404, description = "No account linked", body = RelayErrorBody)
    )
)]
pub async fn get_account(
    State(state): State<ConnectHandlerState>,
    Path(host_id): Path<String>,
) -> Result<Json<ConnectedAccountResponse>, RelayError> {
    let account = state.payments.account(&host_id).await?;
    Ok(Json(account.into()))
}
