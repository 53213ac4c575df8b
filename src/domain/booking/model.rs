//! Booking domain entity

use chrono::{DateTime, Duration, Utc};

use crate::domain::pricing::CostBreakdown;
use crate::domain::scheduling::promote_status;

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    /// Paid, not started yet
    Upcoming,
    /// Inside its `[start, end)` window
    Active,
    /// Window has passed
    Completed,
    /// Cancelled by the guest before it started
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "upcoming" => Self::Upcoming,
            "active" => Self::Active,
            "completed" => Self::Completed,
            _ => Self::Cancelled,
        }
    }

    /// Upcoming or active bookings block the charger.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Upcoming | Self::Active)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A paid reservation of a charger for a time window
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: String,
    pub charger_id: String,
    /// Guest user ID
    pub user_id: String,
    /// Guest display name at booking time
    pub user_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_hours: u32,
    /// Stored status; see [`Booking::effective_status`]
    pub status: BookingStatus,
    pub energy_cost: f64,
    pub access_fee: f64,
    pub platform_fee: f64,
    pub host_earnings: f64,
    pub total_cost: f64,
    /// Stripe PaymentIntent that paid for this booking
    pub payment_intent_id: Option<String>,
    pub has_review: bool,
    pub reminder_sent: bool,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Create an upcoming booking from a paid quote.
    pub fn new(
        id: impl Into<String>,
        charger_id: impl Into<String>,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        start_time: DateTime<Utc>,
        duration_hours: u32,
        cost: &CostBreakdown,
    ) -> Self {
        Self {
            id: id.into(),
            charger_id: charger_id.into(),
            user_id: user_id.into(),
            user_name: user_name.into(),
            start_time,
            end_time: start_time + Duration::hours(duration_hours as i64),
            duration_hours,
            status: BookingStatus::Upcoming,
            energy_cost: cost.energy_cost,
            access_fee: cost.access_fee,
            platform_fee: cost.platform_fee,
            host_earnings: cost.host_earnings,
            total_cost: cost.total,
            payment_intent_id: None,
            has_review: false,
            reminder_sent: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_payment_intent(mut self, payment_intent_id: impl Into<String>) -> Self {
        self.payment_intent_id = Some(payment_intent_id.into());
        self
    }

    /// Stored status with the time-based promotion applied at `now`.
    pub fn effective_status(&self, now: DateTime<Utc>) -> BookingStatus {
        promote_status(self.status, self.start_time, self.end_time, now)
    }

    /// Apply time-based promotion to the stored status.
    ///
    /// Returns `true` if the status changed.
    pub fn refresh_status(&mut self, now: DateTime<Utc>) -> bool {
        let next = self.effective_status(now);
        if next != self.status {
            self.status = next;
            true
        } else {
            false
        }
    }

    /// Guests may cancel only before the booking has started.
    pub fn can_cancel(&self, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == BookingStatus::Upcoming && self.start_time > now
    }

    pub fn cancel(&mut self) {
        self.status = BookingStatus::Cancelled;
    }

    /// Reviews are allowed once the charging window is over.
    pub fn can_review(&self, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == BookingStatus::Completed && !self.has_review
    }

    pub fn subtotal(&self) -> f64 {
        self.energy_cost + self.access_fee
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing::calculate_booking_cost;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, 0, 0).unwrap()
    }

    fn sample_booking(start_hour: u32, hours: u32) -> Booking {
        let cost = calculate_booking_cost(0.18, 9.6, 2.0, hours as f64).unwrap();
        Booking::new("b-1", "c-1", "u-1", "Alex", at(start_hour), hours, &cost)
    }

    #[test]
    fn new_booking_is_upcoming() {
        let b = sample_booking(10, 2);
        assert_eq!(b.status, BookingStatus::Upcoming);
        assert_eq!(b.end_time, at(12));
        assert!((b.host_earnings + b.platform_fee - b.subtotal()).abs() < 1e-9);
    }

    #[test]
    fn started_upcoming_booking_becomes_active() {
        let b = sample_booking(10, 2);
        assert_eq!(b.effective_status(at(11)), BookingStatus::Active);
        assert_eq!(b.effective_status(at(9)), BookingStatus::Upcoming);
        assert_eq!(b.effective_status(at(12)), BookingStatus::Completed);
    }

    #[test]
    fn refresh_is_idempotent() {
        let mut b = sample_booking(10, 2);
        assert!(b.refresh_status(at(11)));
        assert_eq!(b.status, BookingStatus::Active);
        assert!(!b.refresh_status(at(11)));
        assert_eq!(b.status, BookingStatus::Active);
    }

    #[test]
    fn cancelled_is_never_promoted() {
        let mut b = sample_booking(10, 2);
        b.cancel();
        assert_eq!(b.effective_status(at(13)), BookingStatus::Cancelled);
    }

    #[test]
    fn cancel_only_before_start() {
        let b = sample_booking(10, 2);
        assert!(b.can_cancel(at(9)));
        assert!(!b.can_cancel(at(10)));
        assert!(!b.can_cancel(at(11)));
    }

    #[test]
    fn review_requires_completion() {
        let mut b = sample_booking(10, 2);
        assert!(!b.can_review(at(11)));
        assert!(b.can_review(at(12)));
        b.has_review = true;
        assert!(!b.can_review(at(13)));
    }

    #[test]
    fn status_string_roundtrip() {
        for status in [
            BookingStatus::Upcoming,
            BookingStatus::Active,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::from_str(status.as_str()), status);
        }
        assert_eq!(BookingStatus::from_str("bogus"), BookingStatus::Cancelled);
    }
}
