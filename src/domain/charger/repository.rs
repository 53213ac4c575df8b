//! Charger repository interface

use async_trait::async_trait;

use super::model::Charger;
use crate::domain::DomainResult;

#[async_trait]
pub trait ChargerRepository: Send + Sync {
    /// Save a new charger
    async fn save(&self, charger: Charger) -> DomainResult<()>;

    /// Find charger by ID
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Charger>>;

    /// Update an existing charger
    async fn update(&self, charger: Charger) -> DomainResult<()>;

    /// All chargers, active and inactive
    async fn find_all(&self) -> DomainResult<Vec<Charger>>;

    /// Chargers listed by a host
    async fn find_by_host(&self, host_id: &str) -> DomainResult<Vec<Charger>>;
}

/// Guest favorites: unordered (user, charger) pairs
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Returns `true` if the pair was newly added.
    async fn add(&self, user_id: &str, charger_id: &str) -> DomainResult<bool>;

    /// Returns `true` if the pair existed.
    async fn remove(&self, user_id: &str, charger_id: &str) -> DomainResult<bool>;

    async fn list_for_user(&self, user_id: &str) -> DomainResult<Vec<String>>;
}
