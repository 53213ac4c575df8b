//! Review API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;

use super::dto::{ChargerReviewsResponse, ReviewDto, SubmitReviewRequest};
use crate::application::ReviewService;
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct ReviewHandlerState {
    pub reviews: Arc<ReviewService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    request_body = SubmitReviewRequest,
    responses(
        (status = 201, description = "Review stored", body = ApiResponse<ReviewDto>),
        (status = 400, description = "Booking not completed or already reviewed"),
        (status = 403, description = "Not the caller's booking"),
        (status = 409, description = "Charger already reviewed by the caller")
    )
)]
pub async fn submit_review(
    State(state): State<ReviewHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(body): ValidatedJson<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewDto>>), ApiError<ReviewDto>> {
    let review = state
        .reviews
        .submit(&user.actor(), &body.booking_id, body.rating, &body.comment, Utc::now())
        .await
        .map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(review.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/chargers/{id}/reviews",
    tag = "Reviews",
    params(("id" = String, Path, description = "Charger ID")),
    responses(
        (status = 200, description = "Reviews, newest first", body = ApiResponse<ChargerReviewsResponse>),
        (status = 404, description = "Charger not found")
    )
)]
pub async fn list_charger_reviews(
    State(state): State<ReviewHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ChargerReviewsResponse>>, ApiError<ChargerReviewsResponse>> {
    let (reviews, summary) = state
        .reviews
        .list_for_charger(&id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(ChargerReviewsResponse::new(
        reviews, summary,
    ))))
}
