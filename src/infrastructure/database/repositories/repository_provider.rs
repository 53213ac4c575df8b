//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::booking::BookingRepository;
use crate::domain::charger::{ChargerRepository, FavoriteRepository};
use crate::domain::host_account::HostAccountRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::review::ReviewRepository;
use crate::domain::user::UserRepository;

use super::booking_repository::SeaOrmBookingRepository;
use super::charger_repository::{SeaOrmChargerRepository, SeaOrmFavoriteRepository};
use super::host_account_repository::SeaOrmHostAccountRepository;
use super::review_repository::SeaOrmReviewRepository;
use super::user_repository::SeaOrmUserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let charger = repos.chargers().find_by_id("c-1").await?;
/// let bookings = repos.bookings().find_for_charger("c-1").await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    users: SeaOrmUserRepository,
    chargers: SeaOrmChargerRepository,
    favorites: SeaOrmFavoriteRepository,
    bookings: SeaOrmBookingRepository,
    reviews: SeaOrmReviewRepository,
    host_accounts: SeaOrmHostAccountRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: SeaOrmUserRepository::new(db.clone()),
            chargers: SeaOrmChargerRepository::new(db.clone()),
            favorites: SeaOrmFavoriteRepository::new(db.clone()),
            bookings: SeaOrmBookingRepository::new(db.clone()),
            reviews: SeaOrmReviewRepository::new(db.clone()),
            host_accounts: SeaOrmHostAccountRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
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
    use chrono::{Duration, Utc};
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::domain::{
        Booking, BookingStatus, Charger, ConnectorType, DomainError, HostAccount, Review, User,
        UserRole,
    };
    use crate::infrastructure::database::migrator::Migrator;

    async fn provider() -> SeaOrmRepositoryProvider {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmRepositoryProvider::new(db)
    }

    fn charger(host: &User) -> Charger {
        let now = Utc::now();
        Charger {
            id: "c-1".into(),
            host_id: host.id.clone(),
            host_name: host.name.clone(),
            address: "123 Oak Street".into(),
            city: "Palo Alto".into(),
            state: Some("CA".into()),
            zip_code: None,
            latitude: 37.4419,
            longitude: -122.143,
            connector: ConnectorType::TeslaNacs,
            power_kw: 11.5,
            price_per_kwh: 0.22,
            access_fee: 3.0,
            amenities: vec!["WiFi".into(), "Restroom".into()],
            photos: vec![],
            description: "Garage".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn users_are_unique_by_email() {
        let repos = provider().await;
        let user = User::new("host@example.com", "Host", "hash", UserRole::Host);
        repos.users().create(user.clone()).await.unwrap();

        let dup = User::new("HOST@example.com", "Other", "hash", UserRole::User);
        assert!(matches!(
            repos.users().create(dup).await,
            Err(DomainError::Conflict(_))
        ));
        let found = repos.users().find_by_email("Host@Example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert_eq!(repos.users().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn charger_lists_round_trip_through_json_columns() {
        let repos = provider().await;
        let host = User::new("h@example.com", "Sarah", "hash", UserRole::Host);
        repos.users().create(host.clone()).await.unwrap();
        repos.chargers().save(charger(&host)).await.unwrap();

        let loaded = repos.chargers().find_by_id("c-1").await.unwrap().unwrap();
        assert_eq!(loaded.amenities, vec!["WiFi", "Restroom"]);
        assert_eq!(loaded.connector, ConnectorType::TeslaNacs);
        assert_eq!(repos.chargers().find_by_host(&host.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn bookings_reviews_and_favorites() {
        let repos = provider().await;
        let host = User::new("h@example.com", "Sarah", "hash", UserRole::Host);
        let guest = User::new("g@example.com", "Alex", "hash", UserRole::User);
        repos.users().create(host.clone()).await.unwrap();
        repos.users().create(guest.clone()).await.unwrap();
        let c = charger(&host);
        let cost = c.quote(2.0).unwrap();
        repos.chargers().save(c).await.unwrap();

        let start = Utc::now() + Duration::hours(3);
        let booking = Booking::new("b-1", "c-1", &guest.id, &guest.name, start, 2, &cost)
            .with_payment_intent("pi_123");
        repos.bookings().save(booking).await.unwrap();

        let by_intent = repos.bookings().find_by_payment_intent("pi_123").await.unwrap();
        assert_eq!(by_intent.map(|b| b.id), Some("b-1".to_string()));

        let mut stored = repos.bookings().find_by_id("b-1").await.unwrap().unwrap();
        assert_eq!(stored.end_time, stored.start_time + Duration::hours(2));
        assert_eq!(repos.bookings().find_open().await.unwrap().len(), 1);
        stored.cancel();
        repos.bookings().update(stored).await.unwrap();
        assert!(repos.bookings().find_open().await.unwrap().is_empty());
        assert_eq!(
            repos.bookings().find_for_user(&guest.id).await.unwrap()[0].status,
            BookingStatus::Cancelled
        );

        let review = Review::new("b-1", "c-1", &guest.id, &guest.name, 5, "Great").unwrap();
        repos.reviews().save(review).await.unwrap();
        let again = Review::new("b-1", "c-1", &guest.id, &guest.name, 4, "Again").unwrap();
        assert!(matches!(
            repos.reviews().save(again).await,
            Err(DomainError::Conflict(_))
        ));

        assert!(repos.favorites().add(&guest.id, "c-1").await.unwrap());
        assert!(!repos.favorites().add(&guest.id, "c-1").await.unwrap());
        assert_eq!(repos.favorites().list_for_user(&guest.id).await.unwrap(), vec!["c-1"]);
        assert!(repos.favorites().remove(&guest.id, "c-1").await.unwrap());
        assert!(!repos.favorites().remove(&guest.id, "c-1").await.unwrap());
    }

    #[tokio::test]
    async fn host_account_upsert_replaces() {
        let repos = provider().await;
        let mut account = HostAccount {
            host_id: "h-1".into(),
            stripe_account_id: "acct_1".into(),
            email: None,
            charges_enabled: false,
            payouts_enabled: false,
            connected_at: Utc::now(),
        };
        repos.host_accounts().upsert(account.clone()).await.unwrap();
        account.stripe_account_id = "acct_2".into();
        account.charges_enabled = true;
        repos.host_accounts().upsert(account).await.unwrap();

        let stored = repos.host_accounts().find_by_host("h-1").await.unwrap().unwrap();
        assert_eq!(stored.stripe_account_id, "acct_2");
        assert!(stored.can_receive_payments());
    }
}
