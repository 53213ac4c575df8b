//! Repository provider for the domain layer

use super::booking::BookingRepository;
use super::charger::{ChargerRepository, FavoriteRepository};
use super::host_account::HostAccountRepository;
use super::review::ReviewRepository;
use super::user::UserRepository;

// ── RepositoryProvider ──────────────────────────────────────────

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let charger = repos.chargers().find_by_id("c-1").await?;
///     let bookings = repos.bookings().find_for_charger("c-1").await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn chargers(&self) -> &dyn ChargerRepository;
    fn favorites(&self) -> &dyn FavoriteRepository;
    fn bookings(&self) -> &dyn BookingRepository;
    fn reviews(&self) -> &dyn ReviewRepository;
    fn host_accounts(&self) -> &dyn HostAccountRepository;
}
