//! Charger listings, browse and favorites

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::application::Actor;
use crate::domain::scheduling::{calculate_availability, distance_miles, format_next_available};
use crate::domain::{
    AvailabilityInfo, Charger, ConnectorType, DomainError, DomainResult, RatingSummary,
    RepositoryProvider,
};

/// Fields of a new listing
#[derive(Debug, Clone, PartialEq)]
pub struct ChargerDraft {
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub connector: ConnectorType,
    pub power_kw: f64,
    pub price_per_kwh: f64,
    pub access_fee: f64,
    pub amenities: Vec<String>,
    pub photos: Vec<String>,
    pub description: String,
}

/// Partial update; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChargerUpdate {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub connector: Option<ConnectorType>,
    pub power_kw: Option<f64>,
    pub price_per_kwh: Option<f64>,
    pub access_fee: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub photos: Option<Vec<String>>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Distance,
    PriceLow,
    PriceHigh,
    Rating,
    Power,
}

impl SortBy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "distance" => Some(Self::Distance),
            "price_low" => Some(Self::PriceLow),
            "price_high" => Some(Self::PriceHigh),
            "rating" => Some(Self::Rating),
            "power" => Some(Self::Power),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BrowseQuery {
    pub search: Option<String>,
    pub connector: Option<ConnectorType>,
    pub available_only: bool,
    pub favorites_only: bool,
    pub sort: SortBy,
    /// `(latitude, longitude)`; defaults to the configured origin
    pub origin: Option<(f64, f64)>,
}

/// A charger with everything derived for display
#[derive(Debug, Clone)]
pub struct ChargerView {
    pub charger: Charger,
    pub availability: AvailabilityInfo,
    pub next_available_label: String,
    pub rating: RatingSummary,
    pub distance_miles: Option<f64>,
    pub is_favorite: bool,
}

#[derive(Debug, Clone)]
pub struct CreatedCharger {
    pub charger: Charger,
    /// The creator was a plain user and is now a host
    pub promoted_to_host: bool,
}

pub struct ChargerService {
    repos: Arc<dyn RepositoryProvider>,
    default_origin: (f64, f64),
}

impl ChargerService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, default_origin: (f64, f64)) -> Self {
        Self {
            repos,
            default_origin,
        }
    }

    /// List a new charger. The creator becomes a host.
    pub async fn create(&self, actor: &Actor, draft: ChargerDraft) -> DomainResult<CreatedCharger> {
        validate_location(draft.latitude, draft.longitude)?;
        validate_rates(draft.power_kw, draft.price_per_kwh, draft.access_fee)?;
        let address = required("address", &draft.address)?;
        let city = required("city", &draft.city)?;

        let mut user = self
            .repos
            .users()
            .find_by_id(&actor.user_id)
            .await?
            .ok_or_else(|| DomainError::Unauthorized("Unknown user".into()))?;

        let now = Utc::now();
        let charger = Charger {
            id: uuid::Uuid::new_v4().to_string(),
            host_id: user.id.clone(),
            host_name: user.name.clone(),
            address,
            city,
            state: non_empty(draft.state),
            zip_code: non_empty(draft.zip_code),
            latitude: draft.latitude,
            longitude: draft.longitude,
            connector: draft.connector,
            power_kw: draft.power_kw,
            price_per_kwh: draft.price_per_kwh,
            access_fee: draft.access_fee,
            amenities: clean_list(draft.amenities),
            photos: clean_list(draft.photos),
            description: draft.description.trim().to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.repos.chargers().save(charger.clone()).await?;

        let promoted_to_host = user.promote_to_host();
        if promoted_to_host {
            self.repos.users().update(user).await?;
        }

        info!(charger_id = %charger.id, host_id = %charger.host_id, promoted_to_host, "Charger listed");
        Ok(CreatedCharger {
            charger,
            promoted_to_host,
        })
    }

    /// Edit a listing. Only its host or an admin may.
    pub async fn update(&self, actor: &Actor, id: &str, update: ChargerUpdate) -> DomainResult<Charger> {
        let mut charger = self.load_owned(actor, id).await?;

        if let Some(v) = update.address {
            charger.address = required("address", &v)?;
        }
        if let Some(v) = update.city {
            charger.city = required("city", &v)?;
        }
        if let Some(v) = update.state {
            charger.state = non_empty(Some(v));
        }
        if let Some(v) = update.zip_code {
            charger.zip_code = non_empty(Some(v));
        }
        charger.latitude = update.latitude.unwrap_or(charger.latitude);
        charger.longitude = update.longitude.unwrap_or(charger.longitude);
        charger.connector = update.connector.unwrap_or(charger.connector);
        charger.power_kw = update.power_kw.unwrap_or(charger.power_kw);
        charger.price_per_kwh = update.price_per_kwh.unwrap_or(charger.price_per_kwh);
        charger.access_fee = update.access_fee.unwrap_or(charger.access_fee);
        if let Some(v) = update.amenities {
            charger.amenities = clean_list(v);
        }
        if let Some(v) = update.photos {
            charger.photos = clean_list(v);
        }
        if let Some(v) = update.description {
            charger.description = v.trim().to_string();
        }

        validate_location(charger.latitude, charger.longitude)?;
        validate_rates(charger.power_kw, charger.price_per_kwh, charger.access_fee)?;
        charger.updated_at = Utc::now();

        self.repos.chargers().update(charger.clone()).await?;
        info!(charger_id = %charger.id, "Charger updated");
        Ok(charger)
    }

    /// Activate or deactivate a listing. Existing bookings are kept.
    pub async fn set_active(&self, actor: &Actor, id: &str, active: bool) -> DomainResult<Charger> {
        let mut charger = self.load_owned(actor, id).await?;
        if charger.is_active != active {
            charger.set_active(active);
            self.repos.chargers().update(charger.clone()).await?;
            info!(charger_id = %charger.id, active, "Charger visibility changed");
        }
        Ok(charger)
    }

    pub async fn detail(&self, id: &str, viewer: Option<&Actor>, now: DateTime<Utc>) -> DomainResult<ChargerView> {
        let charger = self
            .repos
            .chargers()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Charger", "id", id))?;
        let favorites = self.favorite_ids(viewer).await?;
        self.view(charger, None, &favorites, now).await
    }

    /// All listings of a host, inactive ones included.
    pub async fn list_for_host(&self, host_id: &str, now: DateTime<Utc>) -> DomainResult<Vec<ChargerView>> {
        let chargers = self.repos.chargers().find_by_host(host_id).await?;
        let mut views = Vec::with_capacity(chargers.len());
        for charger in chargers {
            views.push(self.view(charger, None, &HashSet::new(), now).await?);
        }
        Ok(views)
    }

    /// Active chargers matching `query`, sorted.
    pub async fn browse(
        &self,
        query: &BrowseQuery,
        viewer: Option<&Actor>,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<ChargerView>> {
        if query.favorites_only && viewer.is_none() {
            return Err(DomainError::Unauthorized(
                "Sign in to filter by favorites".into(),
            ));
        }
        let favorites = self.favorite_ids(viewer).await?;
        let origin = query.origin.unwrap_or(self.default_origin);
        let search = query.search.as_deref().unwrap_or("");

        let mut views = Vec::new();
        for charger in self.repos.chargers().find_all().await? {
            if !charger.is_active
                || !charger.matches_search(search)
                || query.connector.is_some_and(|c| c != charger.connector)
                || (query.favorites_only && !favorites.contains(&charger.id))
            {
                continue;
            }
            let view = self.view(charger, Some(origin), &favorites, now).await?;
            if query.available_only && !view.availability.is_available {
                continue;
            }
            views.push(view);
        }

        sort_views(&mut views, query.sort);
        Ok(views)
    }

    /// Add or remove a favorite. Returns whether it is now a favorite.
    pub async fn toggle_favorite(&self, actor: &Actor, charger_id: &str) -> DomainResult<bool> {
        if self.repos.chargers().find_by_id(charger_id).await?.is_none() {
            return Err(DomainError::not_found("Charger", "id", charger_id));
        }
        let favorites = self.repos.favorites();
        if favorites.remove(&actor.user_id, charger_id).await? {
            Ok(false)
        } else {
            favorites.add(&actor.user_id, charger_id).await?;
            Ok(true)
        }
    }

    pub async fn list_favorites(&self, actor: &Actor, now: DateTime<Utc>) -> DomainResult<Vec<ChargerView>> {
        let ids = self.repos.favorites().list_for_user(&actor.user_id).await?;
        let set: HashSet<String> = ids.iter().cloned().collect();
        let mut views = Vec::with_capacity(ids.len());
        for id in ids {
            // Skip dangling rows
            if let Some(charger) = self.repos.chargers().find_by_id(&id).await? {
                views.push(self.view(charger, None, &set, now).await?);
            }
        }
        Ok(views)
    }

    async fn view(
        &self,
        charger: Charger,
        origin: Option<(f64, f64)>,
        favorites: &HashSet<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<ChargerView> {
        let bookings = self.repos.bookings().find_for_charger(&charger.id).await?;
        let reviews = self.repos.reviews().find_for_charger(&charger.id).await?;
        let availability = calculate_availability(&charger.id, now, &bookings);
        let next_available_label = if availability.is_available {
            "Available now".to_string()
        } else {
            format_next_available(availability.next_available_time, now)
        };

        Ok(ChargerView {
            distance_miles: origin
                .map(|(lat, lon)| round_tenth(distance_miles(lat, lon, charger.latitude, charger.longitude))),
            is_favorite: favorites.contains(&charger.id),
            rating: RatingSummary::from_reviews(&reviews),
            next_available_label,
            availability,
            charger,
        })
    }

    async fn favorite_ids(&self, viewer: Option<&Actor>) -> DomainResult<HashSet<String>> {
        match viewer {
            Some(actor) => Ok(self
                .repos
                .favorites()
                .list_for_user(&actor.user_id)
                .await?
                .into_iter()
                .collect()),
            None => Ok(HashSet::new()),
        }
    }

    async fn load_owned(&self, actor: &Actor, id: &str) -> DomainResult<Charger> {
        let charger = self
            .repos
            .chargers()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Charger", "id", id))?;
        if !charger.is_hosted_by(&actor.user_id) && !actor.is_admin() {
            return Err(DomainError::Forbidden("Not your charger".into()));
        }
        Ok(charger)
    }
}

fn sort_views(views: &mut [ChargerView], sort: SortBy) {
    let distance = |v: &ChargerView| v.distance_miles.unwrap_or(f64::MAX);
    match sort {
        SortBy::Distance => views.sort_by(|a, b| distance(a).total_cmp(&distance(b))),
        SortBy::PriceLow => {
            views.sort_by(|a, b| a.charger.price_per_kwh.total_cmp(&b.charger.price_per_kwh))
        }
        SortBy::PriceHigh => {
            views.sort_by(|a, b| b.charger.price_per_kwh.total_cmp(&a.charger.price_per_kwh))
        }
        SortBy::Rating => views.sort_by(|a, b| {
            b.rating
                .average
                .total_cmp(&a.rating.average)
                .then(b.rating.count.cmp(&a.rating.count))
        }),
        SortBy::Power => views.sort_by(|a, b| b.charger.power_kw.total_cmp(&a.charger.power_kw)),
    }
}

fn round_tenth(miles: f64) -> f64 {
    (miles * 10.0).round() / 10.0
}

fn required(field: &str, value: &str) -> DomainResult<String> {
    let v = value.trim();
    if v.is_empty() {
        Err(DomainError::Validation(format!("{} is required", field)))
    } else {
        Ok(v.to_string())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn validate_location(latitude: f64, longitude: f64) -> DomainResult<()> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(DomainError::Validation(format!(
            "Invalid coordinates ({}, {})",
            latitude, longitude
        )));
    }
    Ok(())
}

fn validate_rates(power_kw: f64, price_per_kwh: f64, access_fee: f64) -> DomainResult<()> {
    if !power_kw.is_finite() || power_kw <= 0.0 {
        return Err(DomainError::Validation("power_kw must be positive".into()));
    }
    for (name, v) in [("price_per_kwh", price_per_kwh), ("access_fee", access_fee)] {
        if !v.is_finite() || v < 0.0 {
            return Err(DomainError::Validation(format!("{} must be non-negative", name)));
        }
    }
    Ok(())
}
