//! Host and platform earnings dashboards
//!
//! Earnings count completed bookings only; revenue counts every booking
//! that was not cancelled.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::Actor;
use crate::domain::{Booking, BookingStatus, Charger, DomainError, DomainResult, RepositoryProvider};

const RECENT_BOOKINGS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingCounts {
    pub upcoming: usize,
    pub active: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl BookingCounts {
    fn add(&mut self, status: BookingStatus) {
        match status {
            BookingStatus::Upcoming => self.upcoming += 1,
            BookingStatus::Active => self.active += 1,
            BookingStatus::Completed => self.completed += 1,
            BookingStatus::Cancelled => self.cancelled += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.upcoming + self.active + self.completed + self.cancelled
    }
}

#[derive(Debug, Clone)]
pub struct HostDashboard {
    pub chargers: Vec<Charger>,
    pub total_earnings: f64,
    /// Earnings booked but not yet completed
    pub pending_earnings: f64,
    pub upcoming_bookings: Vec<Booking>,
    pub counts: BookingCounts,
}

#[derive(Debug, Clone)]
pub struct PlatformDashboard {
    pub platform_earnings: f64,
    pub total_revenue: f64,
    pub host_payouts: f64,
    /// Platform fees of completed bookings keyed `YYYY-MM` of the start time
    pub monthly_earnings: BTreeMap<String, f64>,
    pub counts: BookingCounts,
    pub charger_count: usize,
    pub user_count: u64,
    /// Newest first
    pub recent_bookings: Vec<Booking>,
}

pub struct DashboardService {
    repos: Arc<dyn RepositoryProvider>,
}

impl DashboardService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn host(&self, host: &Actor, now: DateTime<Utc>) -> DomainResult<HostDashboard> {
        let chargers = self.repos.chargers().find_by_host(&host.user_id).await?;

        let mut bookings = Vec::new();
        for charger in &chargers {
            bookings.extend(
                self.repos
                    .bookings()
                    .find_for_charger(&charger.id)
                    .await?
                    .into_iter()
                    .map(|b| effective(b, now)),
            );
        }

        let mut counts = BookingCounts::default();
        let mut total_earnings = 0.0;
        let mut pending_earnings = 0.0;
        for b in &bookings {
            counts.add(b.status);
            match b.status {
                BookingStatus::Completed => total_earnings += b.host_earnings,
                BookingStatus::Upcoming | BookingStatus::Active => pending_earnings += b.host_earnings,
                BookingStatus::Cancelled => {}
            }
        }

        let mut upcoming_bookings: Vec<Booking> = bookings
            .into_iter()
            .filter(|b| b.status == BookingStatus::Upcoming)
            .collect();
        upcoming_bookings.sort_by_key(|b| b.start_time);

        Ok(HostDashboard {
            chargers,
            total_earnings,
            pending_earnings,
            upcoming_bookings,
            counts,
        })
    }

    /// Admin only.
    pub async fn platform(&self, actor: &Actor, now: DateTime<Utc>) -> DomainResult<PlatformDashboard> {
        if !actor.is_admin() {
            return Err(DomainError::Forbidden("Admin access required".into()));
        }

        let bookings: Vec<Booking> = self
            .repos
            .bookings()
            .find_all()
            .await?
            .into_iter()
            .map(|b| effective(b, now))
            .collect();

        let mut dash = PlatformDashboard {
            platform_earnings: 0.0,
            total_revenue: 0.0,
            host_payouts: 0.0,
            monthly_earnings: BTreeMap::new(),
            counts: BookingCounts::default(),
            charger_count: self.repos.chargers().find_all().await?.len(),
            user_count: self.repos.users().count().await?,
            recent_bookings: Vec::new(),
        };

        for b in &bookings {
            dash.counts.add(b.status);
            if b.status != BookingStatus::Cancelled {
                dash.total_revenue += b.total_cost;
            }
            if b.status == BookingStatus::Completed {
                dash.platform_earnings += b.platform_fee;
                dash.host_payouts += b.host_earnings;
                *dash
                    .monthly_earnings
                    .entry(b.start_time.format("%Y-%m").to_string())
                    .or_insert(0.0) += b.platform_fee;
            }
        }

        let mut recent = bookings;
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(RECENT_BOOKINGS);
        dash.recent_bookings = recent;

        Ok(dash)
    }
}

fn effective(mut booking: Booking, now: DateTime<Utc>) -> Booking {
    booking.status = booking.effective_status(now);
    booking
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::application::services::fixtures::{now, Harness};

    async fn seed(h: &Harness) {
        let cost = h.charger.quote(2.0).unwrap();
        let guest = h.guest.user_id.as_str();
        let feb = Utc.with_ymd_and_hms(2026, 2, 10, 9, 0, 0).unwrap();

        let done_feb = Booking::new("b-feb", "c-1", guest, "Alex", feb, 2, &cost);
        let done_mar = Booking::new("b-mar", "c-1", guest, "Alex", now() - Duration::hours(5), 2, &cost);
        let upcoming = Booking::new("b-next", "c-1", guest, "Alex", now() + Duration::hours(5), 2, &cost);
        let mut cancelled = Booking::new("b-x", "c-1", guest, "Alex", now() + Duration::hours(9), 2, &cost);
        cancelled.cancel();

        for b in [done_feb, done_mar, upcoming, cancelled] {
            h.repos.bookings().save(b).await.unwrap();
        }
    }

    #[tokio::test]
    async fn host_dashboard_sums_completed_earnings() {
        let h = Harness::new().await;
        seed(&h).await;
        let svc = DashboardService::new(h.repos.clone());
        let cost = h.charger.quote(2.0).unwrap();

        let dash = svc.host(&h.host, now()).await.unwrap();
        assert_eq!(dash.chargers.len(), 1);
        assert!((dash.total_earnings - 2.0 * cost.host_earnings).abs() < 1e-9);
        assert!((dash.pending_earnings - cost.host_earnings).abs() < 1e-9);
        assert_eq!(dash.upcoming_bookings.len(), 1);
        assert_eq!(dash.counts.completed, 2);
        assert_eq!(dash.counts.cancelled, 1);
        assert_eq!(dash.counts.total(), 4);

        // A guest with no listings sees an empty dashboard
        let empty = svc.host(&h.guest, now()).await.unwrap();
        assert!(empty.chargers.is_empty());
        assert_eq!(empty.total_earnings, 0.0);
    }

    #[tokio::test]
    async fn platform_dashboard_is_admin_only() {
        let h = Harness::new().await;
        seed(&h).await;
        let svc = DashboardService::new(h.repos.clone());
        let cost = h.charger.quote(2.0).unwrap();

        assert!(matches!(
            svc.platform(&h.host, now()).await,
            Err(DomainError::Forbidden(_))
        ));

        let dash = svc.platform(&h.admin, now()).await.unwrap();
        assert!((dash.platform_earnings - 2.0 * cost.platform_fee).abs() < 1e-9);
        assert!((dash.host_payouts - 2.0 * cost.host_earnings).abs() < 1e-9);
        assert!((dash.total_revenue - 3.0 * cost.total).abs() < 1e-9);
        assert_eq!(
            dash.monthly_earnings.keys().cloned().collect::<Vec<_>>(),
            vec!["2026-02".to_string(), "2026-03".to_string()]
        );
        assert_eq!(dash.user_count, 3);
        assert_eq!(dash.charger_count, 1);
        assert_eq!(dash.recent_bookings.len(), 4);
    }
}
