//! Dashboard API handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use chrono::Utc;

use super::dto::{HostDashboardDto, PlatformDashboardDto};
use crate::application::DashboardService;
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct DashboardHandlerState {
    pub dashboards: Arc<DashboardService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/host",
    tag = "Dashboards",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's listings and earnings", body = ApiResponse<HostDashboardDto>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn host_dashboard(
    State(state): State<DashboardHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<HostDashboardDto>>, ApiError<HostDashboardDto>> {
    let dash = state
        .dashboards
        .host(&user.actor(), Utc::now())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(dash.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/platform",
    tag = "Dashboards",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Platform-wide earnings", body = ApiResponse<PlatformDashboardDto>),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn platform_dashboard(
    State(state): State<DashboardHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<PlatformDashboardDto>>, ApiError<PlatformDashboardDto>> {
    let dash = state
        .dashboards
        .platform(&user.actor(), Utc::now())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(dash.into())))
}
