//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users;
mod m20250101_000002_create_chargers;
mod m20250101_000003_create_bookings;
mod m20250101_000004_create_reviews;
mod m20250101_000005_create_favorites;
mod m20250101_000006_create_host_accounts;
mod m20250101_000007_add_reminder_sent_to_bookings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users::Migration),
            Box::new(m20250101_000002_create_chargers::Migration),
            Box::new(m20250101_000003_create_bookings::Migration),
            Box::new(m20250101_000004_create_reviews::Migration),
            Box::new(m20250101_000005_create_favorites::Migration),
            Box::new(m20250101_000006_create_host_accounts::Migration),
            Box::new(m20250101_000007_add_reminder_sent_to_bookings::Migration),
        ]
    }
}
