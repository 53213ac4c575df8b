//! Dashboard DTOs

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::application::services::{BookingCounts, HostDashboard, PlatformDashboard};
use crate::interfaces::http::modules::bookings::BookingDto;
use crate::interfaces::http::modules::chargers::ChargerDto;

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingCountsDto {
    pub upcoming: usize,
    pub active: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub total: usize,
}

impl From<&BookingCounts> for BookingCountsDto {
    fn from(c: &BookingCounts) -> Self {
        Self {
            upcoming: c.upcoming,
            active: c.active,
            completed: c.completed,
            cancelled: c.cancelled,
            total: c.total(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HostDashboardDto {
    pub chargers: Vec<ChargerDto>,
    pub total_earnings: f64,
    pub pending_earnings: f64,
    pub upcoming_bookings: Vec<BookingDto>,
    pub booking_counts: BookingCountsDto,
}

impl From<HostDashboard> for HostDashboardDto {
    fn from(d: HostDashboard) -> Self {
        Self {
            booking_counts: BookingCountsDto::from(&d.counts),
            chargers: d.chargers.into_iter().map(ChargerDto::from).collect(),
            total_earnings: round_cents(d.total_earnings),
            pending_earnings: round_cents(d.pending_earnings),
            upcoming_bookings: d.upcoming_bookings.into_iter().map(BookingDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlatformDashboardDto {
    pub platform_earnings: f64,
    pub total_revenue: f64,
    pub host_payouts: f64,
    /// `YYYY-MM` to platform fees
    pub monthly_earnings: BTreeMap<String, f64>,
    pub booking_counts: BookingCountsDto,
    pub charger_count: usize,
    pub user_count: u64,
    pub recent_bookings: Vec<BookingDto>,
}

impl From<PlatformDashboard> for PlatformDashboardDto {
    fn from(d: PlatformDashboard) -> Self {
        Self {
            booking_counts: BookingCountsDto::from(&d.counts),
            platform_earnings: round_cents(d.platform_earnings),
            total_revenue: round_cents(d.total_revenue),
            host_payouts: round_cents(d.host_payouts),
            monthly_earnings: d
                .monthly_earnings
                .into_iter()
                .map(|(k, v)| (k, round_cents(v)))
                .collect(),
            charger_count: d.charger_count,
            user_count: d.user_count,
            recent_bookings: d.recent_bookings.into_iter().map(BookingDto::from).collect(),
        }
    }
}
