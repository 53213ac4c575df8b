//! Booking repository interface

use async_trait::async_trait;

use super::model::Booking;
use crate::domain::DomainResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Save a new booking
    async fn save(&self, booking: Booking) -> DomainResult<()>;

    /// Find booking by ID
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Booking>>;

    /// Find booking paid by the given PaymentIntent
    async fn find_by_payment_intent(&self, payment_intent_id: &str) -> DomainResult<Option<Booking>>;

    /// Update an existing booking
    async fn update(&self, booking: Booking) -> DomainResult<()>;

    /// All bookings of a charger, any status, ordered by start time
    async fn find_for_charger(&self, charger_id: &str) -> DomainResult<Vec<Booking>>;

    /// All bookings of a guest, newest start first
    async fn find_for_user(&self, user_id: &str) -> DomainResult<Vec<Booking>>;

    /// Bookings whose stored status is upcoming or active
    async fn find_open(&self) -> DomainResult<Vec<Booking>>;

    /// Find all bookings (any status)
    async fn find_all(&self) -> DomainResult<Vec<Booking>>;
}
