//! Charger DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::application::services::{ChargerDraft, ChargerUpdate, ChargerView};
use crate::domain::{AvailabilityInfo, Charger, ConnectorType};
use crate::interfaces::http::modules::bookings::BookingDto;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChargerDto {
    pub id: String,
    pub host_id: String,
    pub host_name: String,
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// `J1772`, `CCS`, `Tesla NACS` or `CHAdeMO`
    pub connector: String,
    pub power_kw: f64,
    pub price_per_kwh: f64,
    pub access_fee: f64,
    pub amenities: Vec<String>,
    pub photos: Vec<String>,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Charger> for ChargerDto {
    fn from(c: Charger) -> Self {
        Self {
            connector: c.connector.as_str().to_string(),
            id: c.id,
            host_id: c.host_id,
            host_name: c.host_name,
            address: c.address,
            city: c.city,
            state: c.state,
            zip_code: c.zip_code,
            latitude: c.latitude,
            longitude: c.longitude,
            power_kw: c.power_kw,
            price_per_kwh: c.price_per_kwh,
            access_fee: c.access_fee,
            amenities: c.amenities,
            photos: c.photos,
            description: c.description,
            is_active: c.is_active,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityDto {
    pub is_available: bool,
    pub next_available_time: Option<DateTime<Utc>>,
    pub current_booking: Option<BookingDto>,
    pub upcoming_bookings: Vec<BookingDto>,
}

impl From<AvailabilityInfo> for AvailabilityDto {
    fn from(a: AvailabilityInfo) -> Self {
        Self {
            is_available: a.is_available,
            next_available_time: a.next_available_time,
            current_booking: a.current_booking.map(BookingDto::from),
            upcoming_bookings: a.upcoming_bookings.into_iter().map(BookingDto::from).collect(),
        }
    }
}

/// Charger with derived availability, rating and distance
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChargerListingDto {
    #[serde(flatten)]
    pub charger: ChargerDto,
    pub availability: AvailabilityDto,
    /// e.g. "Available now", "Available in 2 hours"
    pub next_available_label: String,
    pub rating: f64,
    pub review_count: usize,
    /// Miles from the search origin; browse only
    pub distance_miles: Option<f64>,
    pub is_favorite: bool,
}

impl From<ChargerView> for ChargerListingDto {
    fn from(v: ChargerView) -> Self {
        Self {
            charger: ChargerDto::from(v.charger),
            availability: AvailabilityDto::from(v.availability),
            next_available_label: v.next_available_label,
            rating: v.rating.average,
            review_count: v.rating.count,
            distance_miles: v.distance_miles,
            is_favorite: v.is_favorite,
        }
    }
}

fn validate_connector(value: &str) -> Result<(), ValidationError> {
    if ConnectorType::parse(value).is_some() {
        return Ok(());
    }
    let mut err = ValidationError::new("connector");
    err.message = Some("unknown connector type".into());
    Err(err)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateChargerRequest {
    #[validate(length(min = 1, max = 200, message = "address is required"))]
    pub address: String,
    #[validate(length(min = 1, max = 100, message = "city is required"))]
    pub city: String,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(custom(function = "validate_connector"))]
    pub connector: String,
    #[validate(range(exclusive_min = 0.0, max = 400.0))]
    pub power_kw: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub price_per_kwh: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default)]
    pub access_fee: f64,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: String,
}

impl CreateChargerRequest {
    pub fn into_draft(self) -> Option<ChargerDraft> {
        Some(ChargerDraft {
            connector: ConnectorType::parse(&self.connector)?,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            latitude: self.latitude,
            longitude: self.longitude,
            power_kw: self.power_kw,
            price_per_kwh: self.price_per_kwh,
            access_fee: self.access_fee,
            amenities: self.amenities,
            photos: self.photos,
            description: self.description,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateChargerRequest {
    #[validate(length(min = 1, max = 200))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[validate(custom(function = "validate_connector"))]
    pub connector: Option<String>,
    #[validate(range(exclusive_min = 0.0, max = 400.0))]
    pub power_kw: Option<f64>,
    #[validate(range(min = 0.0, max = 10.0))]
    pub price_per_kwh: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub access_fee: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub photos: Option<Vec<String>>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

impl From<UpdateChargerRequest> for ChargerUpdate {
    fn from(r: UpdateChargerRequest) -> Self {
        Self {
            connector: r.connector.as_deref().and_then(ConnectorType::parse),
            address: r.address,
            city: r.city,
            state: r.state,
            zip_code: r.zip_code,
            latitude: r.latitude,
            longitude: r.longitude,
            power_kw: r.power_kw,
            price_per_kwh: r.price_per_kwh,
            access_fee: r.access_fee,
            amenities: r.amenities,
            photos: r.photos,
            description: r.description,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedChargerResponse {
    pub charger: ChargerDto,
    /// The caller was promoted to host; fetch a fresh token
    pub promoted_to_host: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BrowseParams {
    /// Matches address, city or host name
    pub search: Option<String>,
    pub connector: Option<String>,
    #[serde(default)]
    pub available_only: bool,
    /// Requires a bearer token
    #[serde(default)]
    pub favorites_only: bool,
    /// `distance` (default), `price_low`, `price_high`, `rating`, `power`
    pub sort: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlotParams {
    /// Local date, `YYYY-MM-DD`
    pub date: String,
    pub duration_hours: u32,
    /// Minutes east of UTC; defaults to the server's configured offset
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SlotsResponse {
    pub charger_id: String,
    pub date: String,
    pub duration_hours: u32,
    pub slots: Vec<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FavoriteToggleResponse {
    pub charger_id: String,
    pub is_favorite: bool,
}
