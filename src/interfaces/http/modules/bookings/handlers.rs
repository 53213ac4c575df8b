//! Booking API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;

use super::dto::{BookingDto, CheckoutResponse, CommitBookingRequest, QuoteResponse, SlotRequest};
use crate::application::BookingService;
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct BookingHandlerState {
    pub bookings: Arc<BookingService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/quote",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    request_body = SlotRequest,
    responses(
        (status = 200, description = "Price for the slot", body = ApiResponse<QuoteResponse>),
        (status = 400, description = "Invalid slot"),
        (status = 409, description = "Slot already taken")
    )
)]
pub async fn quote(
    State(state): State<BookingHandlerState>,
    ValidatedJson(body): ValidatedJson<SlotRequest>,
) -> Result<Json<ApiResponse<QuoteResponse>>, ApiError<QuoteResponse>> {
    let quote = state
        .bookings
        .quote(&body.charger_id, body.start_time, body.duration_hours, Utc::now())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(QuoteResponse::from(&quote))))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/checkout",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    request_body = SlotRequest,
    responses(
        (status = 201, description = "PaymentIntent created", body = ApiResponse<CheckoutResponse>),
        (status = 402, description = "Payment rejected"),
        (status = 403, description = "Host booking own charger"),
        (status = 409, description = "Slot already taken")
    )
)]
pub async fn checkout(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(body): ValidatedJson<SlotRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CheckoutResponse>>), ApiError<CheckoutResponse>> {
    let session = state
        .bookings
        .checkout(&user.actor(), &body.charger_id, body.start_time, body.duration_hours, Utc::now())
        .await
        .map_err(domain_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CheckoutResponse::from(session))),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    request_body = CommitBookingRequest,
    responses(
        (status = 201, description = "Booking confirmed", body = ApiResponse<BookingDto>),
        (status = 402, description = "Payment not completed or mismatched"),
        (status = 409, description = "Slot taken while paying")
    )
)]
pub async fn commit(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(body): ValidatedJson<CommitBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingDto>>), ApiError<BookingDto>> {
    let booking = state
        .bookings
        .commit(&user.actor(), body.into(), Utc::now())
        .await
        .map_err(domain_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(BookingDto::from(booking))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's bookings, newest first", body = ApiResponse<Vec<BookingDto>>)
    )
)]
pub async fn list_my_bookings(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<BookingDto>>>, ApiError<Vec<BookingDto>>> {
    let bookings = state
        .bookings
        .list_for_user(&user.user_id, Utc::now())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        bookings.into_iter().map(BookingDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking", body = ApiResponse<BookingDto>),
        (status = 403, description = "Not the guest, host or an admin"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_booking(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError<BookingDto>> {
    let booking = state
        .bookings
        .get(&user.actor(), &id, Utc::now())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(BookingDto::from(booking))))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/cancel",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking cancelled", body = ApiResponse<BookingDto>),
        (status = 400, description = "Already started or not upcoming"),
        (status = 403, description = "Not the guest")
    )
)]
pub async fn cancel_booking(
    State(state): State<BookingHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError<BookingDto>> {
    let booking = state
        .bookings
        .cancel(&user.actor(), &id, Utc::now())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(BookingDto::from(booking))))
}
