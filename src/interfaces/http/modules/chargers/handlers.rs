//! Charger and favorite API handlers
//!
//! The charger routes sit behind the optional auth middleware: reads are
//! public, mutations call [`require_user`].

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};

use super::dto::{
    AvailabilityDto, BrowseParams, ChargerDto, ChargerListingDto, CreateChargerRequest,
    CreatedChargerResponse, FavoriteToggleResponse, SetActiveRequest, SlotParams, SlotsResponse,
    UpdateChargerRequest,
};
use crate::application::services::{utc_offset, BrowseQuery, SortBy};
use crate::application::{BookingService, ChargerService};
use crate::domain::ConnectorType;
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::{require_user, AuthenticatedUser};

#[derive(Clone)]
pub struct ChargerHandlerState {
    pub chargers: Arc<ChargerService>,
    pub bookings: Arc<BookingService>,
}

fn bad_request<T>(message: impl Into<String>) -> ApiError<T> {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::error(message)))
}

impl BrowseParams {
    fn into_query<T>(self) -> Result<BrowseQuery, ApiError<T>> {
        let connector = match self.connector.as_deref().map(str::trim) {
            None | Some("") | Some("All") => None,
            Some(c) => Some(
                ConnectorType::parse(c)
                    .ok_or_else(|| bad_request(format!("Unknown connector type: {}", c)))?,
            ),
        };
        let sort = match self.sort.as_deref() {
            None => SortBy::default(),
            Some(s) => SortBy::parse(s).ok_or_else(|| bad_request(format!("Unknown sort: {}", s)))?,
        };
        let origin = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            (None, None) => None,
            _ => return Err(bad_request("lat and lng must be given together")),
        };
        Ok(BrowseQuery {
            search: self.search,
            connector,
            available_only: self.available_only,
            favorites_only: self.favorites_only,
            sort,
            origin,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/chargers",
    tag = "Chargers",
    params(BrowseParams),
    responses(
        (status = 200, description = "Active chargers matching the filters", body = ApiResponse<Vec<ChargerListingDto>>),
        (status = 400, description = "Bad filter"),
        (status = 401, description = "favorites_only without a token")
    )
)]
pub async fn browse_chargers(
    State(state): State<ChargerHandlerState>,
    user: Option<Extension<AuthenticatedUser>>,
    Query(params): Query<BrowseParams>,
) -> Result<Json<ApiResponse<Vec<ChargerListingDto>>>, ApiError<Vec<ChargerListingDto>>> {
    let query = params.into_query()?;
    let viewer = user.map(|Extension(u)| u.actor());
    let views = state
        .chargers
        .browse(&query, viewer.as_ref(), Utc::now())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        views.into_iter().map(ChargerListingDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/chargers/{id}",
    tag = "Chargers",
    params(("id" = String, Path, description = "Charger ID")),
    responses(
        (status = 200, description = "Charger with availability and rating", body = ApiResponse<ChargerListingDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_charger(
    State(state): State<ChargerHandlerState>,
    user: Option<Extension<AuthenticatedUser>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ChargerListingDto>>, ApiError<ChargerListingDto>> {
    let viewer = user.map(|Extension(u)| u.actor());
    let view = state
        .chargers
        .detail(&id, viewer.as_ref(), Utc::now())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(ChargerListingDto::from(view))))
}

#[utoipa::path(
    get,
    path = "/api/v1/chargers/{id}/availability",
    tag = "Chargers",
    params(("id" = String, Path, description = "Charger ID")),
    responses(
        (status = 200, description = "Current availability", body = ApiResponse<AvailabilityDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_availability(
    State(state): State<ChargerHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AvailabilityDto>>, ApiError<AvailabilityDto>> {
    let info = state
        .bookings
        .availability(&id, Utc::now())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(AvailabilityDto::from(info))))
}

#[utoipa::path(
    get,
    path = "/api/v1/chargers/{id}/slots",
    tag = "Chargers",
    params(("id" = String, Path, description = "Charger ID"), SlotParams),
    responses(
        (status = 200, description = "Bookable start times", body = ApiResponse<SlotsResponse>),
        (status = 400, description = "Bad date or duration"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_slots(
    State(state): State<ChargerHandlerState>,
    Path(id): Path<String>,
    Query(params): Query<SlotParams>,
) -> Result<Json<ApiResponse<SlotsResponse>>, ApiError<SlotsResponse>> {
    let date = NaiveDate::parse_from_str(&params.date, "%Y-%m-%d")
        .map_err(|_| bad_request("date must be YYYY-MM-DD"))?;
    let offset = params.utc_offset_minutes.map(utc_offset);

    let slots = state
        .bookings
        .available_slots(&id, date, params.duration_hours, offset, Utc::now())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(SlotsResponse {
        charger_id: id,
        date: params.date,
        duration_hours: params.duration_hours,
        slots,
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/chargers",
    tag = "Chargers",
    security(("bearer_auth" = [])),
    request_body = CreateChargerRequest,
    responses(
        (status = 201, description = "Charger listed", body = ApiResponse<CreatedChargerResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_charger(
    State(state): State<ChargerHandlerState>,
    user: Option<Extension<AuthenticatedUser>>,
    ValidatedJson(body): ValidatedJson<CreateChargerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedChargerResponse>>), ApiError<CreatedChargerResponse>> {
    let user = require_user(user)?;
    let draft = body
        .into_draft()
        .ok_or_else(|| bad_request("Unknown connector type"))?;
    let created = state
        .chargers
        .create(&user.actor(), draft)
        .await
        .map_err(domain_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedChargerResponse {
            charger: ChargerDto::from(created.charger),
            promoted_to_host: created.promoted_to_host,
        })),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/chargers/{id}",
    tag = "Chargers",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Charger ID")),
    request_body = UpdateChargerRequest,
    responses(
        (status = 200, description = "Charger updated", body = ApiResponse<ChargerDto>),
        (status = 403, description = "Not the host"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_charger(
    State(state): State<ChargerHandlerState>,
    user: Option<Extension<AuthenticatedUser>>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateChargerRequest>,
) -> Result<Json<ApiResponse<ChargerDto>>, ApiError<ChargerDto>> {
    let user = require_user(user)?;
    let charger = state
        .chargers
        .update(&user.actor(), &id, body.into())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(ChargerDto::from(charger))))
}

#[utoipa::path(
    put,
    path = "/api/v1/chargers/{id}/active",
    tag = "Chargers",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Charger ID")),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Visibility changed", body = ApiResponse<ChargerDto>),
        (status = 403, description = "Not the host")
    )
)]
pub async fn set_charger_active(
    State(state): State<ChargerHandlerState>,
    user: Option<Extension<AuthenticatedUser>>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<SetActiveRequest>,
) -> Result<Json<ApiResponse<ChargerDto>>, ApiError<ChargerDto>> {
    let user = require_user(user)?;
    let charger = state
        .chargers
        .set_active(&user.actor(), &id, body.is_active)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(ChargerDto::from(charger))))
}

#[utoipa::path(
    get,
    path = "/api/v1/chargers/mine",
    tag = "Chargers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's listings, inactive included", body = ApiResponse<Vec<ChargerListingDto>>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_my_chargers(
    State(state): State<ChargerHandlerState>,
    user: Option<Extension<AuthenticatedUser>>,
) -> Result<Json<ApiResponse<Vec<ChargerListingDto>>>, ApiError<Vec<ChargerListingDto>>> {
    let user = require_user(user)?;
    let views = state
        .chargers
        .list_for_host(&user.user_id, Utc::now())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        views.into_iter().map(ChargerListingDto::from).collect(),
    )))
}

// ── Favorites ──────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/v1/favorites",
    tag = "Favorites",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Favorite chargers", body = ApiResponse<Vec<ChargerListingDto>>)
    )
)]
pub async fn list_favorites(
    State(state): State<ChargerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<ChargerListingDto>>>, ApiError<Vec<ChargerListingDto>>> {
    let views = state
        .chargers
        .list_favorites(&user.actor(), Utc::now())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        views.into_iter().map(ChargerListingDto::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/favorites/{charger_id}",
    tag = "Favorites",
    security(("bearer_auth" = [])),
    params(("charger_id" = String, Path, description = "Charger ID")),
    responses(
        (status = 200, description = "Favorite toggled", body = ApiResponse<FavoriteToggleResponse>),
        (status = 404, description = "Charger not found")
    )
)]
pub async fn toggle_favorite(
    State(state): State<ChargerHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(charger_id): Path<String>,
) -> Result<Json<ApiResponse<FavoriteToggleResponse>>, ApiError<FavoriteToggleResponse>> {
    let is_favorite = state
        .chargers
        .toggle_favorite(&user.actor(), &charger_id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(FavoriteToggleResponse {
        charger_id,
        is_favorite,
    })))
}
