//! Shared setup for service tests

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

use super::bookings::{BookingService, BookingSettings};
use crate::application::notifications::BookingNotifier;
use crate::application::Actor;
use crate::domain::{Charger, ConnectorType, RepositoryProvider, User, UserRole};
use crate::infrastructure::email::LogEmailSender;
use crate::infrastructure::storage::InMemoryRepositoryProvider;
use crate::infrastructure::stripe::MockPaymentGateway;

/// Saturday 2026-03-14 12:00 UTC
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
}

/// 10:00 UTC the next day
pub fn tomorrow_at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 15, hour, 0, 0).unwrap()
}

pub fn charger(id: &str, host: &User) -> Charger {
    Charger {
        id: id.into(),
        host_id: host.id.clone(),
        host_name: host.name.clone(),
        address: "123 Oak Street".into(),
        city: "Palo Alto".into(),
        state: Some("CA".into()),
        zip_code: Some("94301".into()),
        latitude: 37.4419,
        longitude: -122.143,
        connector: ConnectorType::J1772,
        power_kw: 9.6,
        price_per_kwh: 0.18,
        access_fee: 2.0,
        amenities: vec!["WiFi".into()],
        photos: vec![],
        description: "Driveway charger".into(),
        is_active: true,
        created_at: now(),
        updated_at: now(),
    }
}

pub struct Harness {
    pub repos: Arc<InMemoryRepositoryProvider>,
    pub gateway: Arc<MockPaymentGateway>,
    pub outbox: Arc<LogEmailSender>,
    pub guest: Actor,
    pub host: Actor,
    pub admin: Actor,
    pub charger: Charger,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_gateway(MockPaymentGateway::new("http://localhost:5173")).await
    }

    pub async fn with_gateway(gateway: MockPaymentGateway) -> Self {
        let repos = Arc::new(InMemoryRepositoryProvider::new());

        let guest = User::new("alex@example.com", "Alex", "hash", UserRole::User);
        let host = User::new("sarah@example.com", "Sarah", "hash", UserRole::Host);
        let admin = User::new("admin@plugspot.test", "Admin", "hash", UserRole::Admin);
        for u in [&guest, &host, &admin] {
            repos.users().create(u.clone()).await.unwrap();
        }

        let charger = charger("c-1", &host);
        repos.chargers().save(charger.clone()).await.unwrap();

        Self {
            repos,
            gateway: Arc::new(gateway),
            outbox: Arc::new(LogEmailSender::new()),
            guest: Actor::from(&guest),
            host: Actor::from(&host),
            admin: Actor::from(&admin),
            charger,
        }
    }

    pub fn notifier(&self) -> Arc<BookingNotifier> {
        Arc::new(BookingNotifier::new(
            self.outbox.clone(),
            "http://localhost:5173",
            FixedOffset::east_opt(0).unwrap(),
        ))
    }

    pub fn bookings(&self) -> BookingService {
        BookingService::new(
            self.repos.clone(),
            self.gateway.clone(),
            self.notifier(),
            BookingSettings::default(),
        )
    }
}
