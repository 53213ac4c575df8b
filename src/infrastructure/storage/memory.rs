//! In-memory repository provider
//!
//! DashMap-backed implementation of every repository, used by tests and by
//! `database.backend = "memory"` for demos. Nothing survives a restart.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::booking::{Booking, BookingRepository};
use crate::domain::charger::{Charger, ChargerRepository, FavoriteRepository};
use crate::domain::host_account::{HostAccount, HostAccountRepository};
use crate::domain::review::{Review, ReviewRepository};
use crate::domain::user::{User, UserRepository};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<String, User>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> DomainResult<()> {
        if self.users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::Conflict(format!("Email {} is already registered", user.email)));
        }
        self.users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.value().clone()))
    }

    async fn update(&self, user: User) -> DomainResult<()> {
        let Some(mut existing) = self.users.get_mut(&user.id) else {
            return Err(DomainError::not_found("User", "id", user.id));
        };
        *existing = user;
        Ok(())
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.users.len() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryChargerRepository {
    chargers: DashMap<String, Charger>,
}

#[async_trait]
impl ChargerRepository for InMemoryChargerRepository {
    async fn save(&self, charger: Charger) -> DomainResult<()> {
        if self.chargers.contains_key(&charger.id) {
            return Err(DomainError::Conflict(format!("Charger {} already exists", charger.id)));
        }
        self.chargers.insert(charger.id.clone(), charger);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Charger>> {
        Ok(self.chargers.get(id).map(|c| c.clone()))
    }

    async fn update(&self, charger: Charger) -> DomainResult<()> {
        let Some(mut existing) = self.chargers.get_mut(&charger.id) else {
            return Err(DomainError::not_found("Charger", "id", charger.id));
        };
        *existing = charger;
        Ok(())
    }

    async fn find_all(&self) -> DomainResult<Vec<Charger>> {
        let mut all: Vec<Charger> = self.chargers.iter().map(|c| c.value().clone()).collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn find_by_host(&self, host_id: &str) -> DomainResult<Vec<Charger>> {
        let mut mine: Vec<Charger> = self
            .chargers
            .iter()
            .filter(|c| c.host_id == host_id)
            .map(|c| c.value().clone())
            .collect();
        mine.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(mine)
    }
}

#[derive(Default)]
pub struct InMemoryFavoriteRepository {
    // key: (user_id, charger_id)
    pairs: DashMap<(String, String), ()>,
}

#[async_trait]
impl FavoriteRepository for InMemoryFavoriteRepository {
    async fn add(&self, user_id: &str, charger_id: &str) -> DomainResult<bool> {
        Ok(self
            .pairs
            .insert((user_id.to_string(), charger_id.to_string()), ())
            .is_none())
    }

    async fn remove(&self, user_id: &str, charger_id: &str) -> DomainResult<bool> {
        Ok(self
            .pairs
            .remove(&(user_id.to_string(), charger_id.to_string()))
            .is_some())
    }

    async fn list_for_user(&self, user_id: &str) -> DomainResult<Vec<String>> {
        let mut ids: Vec<String> = self
            .pairs
            .iter()
            .filter(|e| e.key().0 == user_id)
            .map(|e| e.key().1.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: DashMap<String, Booking>,
}

impl InMemoryBookingRepository {
    fn collect(&self, pred: impl Fn(&Booking) -> bool) -> Vec<Booking> {
        let mut out: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| pred(b.value()))
            .map(|b| b.value().clone())
            .collect();
        out.sort_by_key(|b| b.start_time);
        out
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn save(&self, booking: Booking) -> DomainResult<()> {
        if self.bookings.contains_key(&booking.id) {
            return Err(DomainError::Conflict(format!("Booking {} already exists", booking.id)));
        }
        self.bookings.insert(booking.id.clone(), booking);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Booking>> {
        Ok(self.bookings.get(id).map(|b| b.clone()))
    }

    async fn find_by_payment_intent(&self, payment_intent_id: &str) -> DomainResult<Option<Booking>> {
        Ok(self
            .bookings
            .iter()
            .find(|b| b.payment_intent_id.as_deref() == Some(payment_intent_id))
            .map(|b| b.value().clone()))
    }

    async fn update(&self, booking: Booking) -> DomainResult<()> {
        let Some(mut existing) = self.bookings.get_mut(&booking.id) else {
            return Err(DomainError::not_found("Booking", "id", booking.id));
        };
        *existing = booking;
        Ok(())
    }

    async fn find_for_charger(&self, charger_id: &str) -> DomainResult<Vec<Booking>> {
        Ok(self.collect(|b| b.charger_id == charger_id))
    }

    async fn find_for_user(&self, user_id: &str) -> DomainResult<Vec<Booking>> {
        let mut mine = self.collect(|b| b.user_id == user_id);
        mine.reverse();
        Ok(mine)
    }

    async fn find_open(&self) -> DomainResult<Vec<Booking>> {
        Ok(self.collect(|b| b.status.is_blocking()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Booking>> {
        Ok(self.collect(|_| true))
    }
}

#[derive(Default)]
pub struct InMemoryReviewRepository {
    reviews: DashMap<String, Review>,
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn save(&self, review: Review) -> DomainResult<()> {
        let duplicate = self
            .reviews
            .iter()
            .any(|r| r.user_id == review.user_id && r.charger_id == review.charger_id);
        if duplicate {
            return Err(DomainError::Conflict(
                "You have already reviewed this charger".to_string(),
            ));
        }
        self.reviews.insert(review.id.clone(), review);
        Ok(())
    }

    async fn find_for_charger(&self, charger_id: &str) -> DomainResult<Vec<Review>> {
        let mut out: Vec<Review> = self
            .reviews
            .iter()
            .filter(|r| r.charger_id == charger_id)
            .map(|r| r.value().clone())
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn find_by_user_and_charger(
        &self,
        user_id: &str,
        charger_id: &str,
    ) -> DomainResult<Option<Review>> {
        Ok(self
            .reviews
            .iter()
            .find(|r| r.user_id == user_id && r.charger_id == charger_id)
            .map(|r| r.value().clone()))
    }
}

#[derive(Default)]
pub struct InMemoryHostAccountRepository {
    accounts: DashMap<String, HostAccount>,
}

#[async_trait]
impl HostAccountRepository for InMemoryHostAccountRepository {
    async fn upsert(&self, account: HostAccount) -> DomainResult<()> {
        self.accounts.insert(account.host_id.clone(), account);
        Ok(())
    }

    async fn find_by_host(&self, host_id: &str) -> DomainResult<Option<HostAccount>> {
        Ok(self.accounts.get(host_id).map(|a| a.clone()))
    }
}

/// In-memory storage for development and testing
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    users: InMemoryUserRepository,
    chargers: InMemoryChargerRepository,
    favorites: InMemoryFavoriteRepository,
    bookings: InMemoryBookingRepository,
    reviews: InMemoryReviewRepository,
    host_accounts: InMemoryHostAccountRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn chargers(&self) -> &dyn ChargerRepository {
        &self.chargers
    }

    fn favorites(&self) -> &dyn FavoriteRepository {
        &self.favorites
    }

    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn reviews(&self) -> &dyn ReviewRepository {
        &self.reviews
    }

    fn host_accounts(&self) -> &dyn HostAccountRepository {
        &self.host_accounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let repos = InMemoryRepositoryProvider::new();
        repos
            .users()
            .create(User::new("a@b.co", "A", "h", UserRole::User))
            .await
            .unwrap();
        let err = repos
            .users()
            .create(User::new("A@B.co", "A2", "h", UserRole::User))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(repos.users().find_by_email("A@b.CO").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn favorites_toggle() {
        let repos = InMemoryRepositoryProvider::new();
        assert!(repos.favorites().add("u-1", "c-1").await.unwrap());
        assert!(!repos.favorites().add("u-1", "c-1").await.unwrap());
        assert_eq!(repos.favorites().list_for_user("u-1").await.unwrap(), vec!["c-1"]);
        assert!(repos.favorites().remove("u-1", "c-1").await.unwrap());
        assert!(repos.favorites().list_for_user("u-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn one_review_per_user_and_charger() {
        let repos = InMemoryRepositoryProvider::new();
        let first = Review::new("b-1", "c-1", "u-1", "U", 5, "great").unwrap();
        let second = Review::new("b-2", "c-1", "u-1", "U", 3, "meh").unwrap();
        repos.reviews().save(first).await.unwrap();
        assert!(matches!(
            repos.reviews().save(second).await,
            Err(DomainError::Conflict(_))
        ));
    }
}
