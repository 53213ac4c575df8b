//! Booking DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::services::{CheckoutSession, CommitRequest, Quote};
use crate::domain::{Booking, CostBreakdown};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingDto {
    pub id: String,
    pub charger_id: String,
    pub user_id: String,
    pub user_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_hours: u32,
    /// `upcoming`, `active`, `completed` or `cancelled`
    pub status: String,
    pub energy_cost: f64,
    pub access_fee: f64,
    pub platform_fee: f64,
    pub host_earnings: f64,
    pub total_cost: f64,
    pub payment_intent_id: Option<String>,
    pub has_review: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            status: b.status.as_str().to_string(),
            id: b.id,
            charger_id: b.charger_id,
            user_id: b.user_id,
            user_name: b.user_name,
            start_time: b.start_time,
            end_time: b.end_time,
            duration_hours: b.duration_hours,
            energy_cost: b.energy_cost,
            access_fee: b.access_fee,
            platform_fee: b.platform_fee,
            host_earnings: b.host_earnings,
            total_cost: b.total_cost,
            payment_intent_id: b.payment_intent_id,
            has_review: b.has_review,
            created_at: b.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CostBreakdownDto {
    pub energy_cost: f64,
    pub access_fee: f64,
    pub subtotal: f64,
    pub platform_fee: f64,
    pub host_earnings: f64,
    pub total: f64,
    /// Amount charged, in cents
    pub total_cents: i64,
}

impl From<&CostBreakdown> for CostBreakdownDto {
    fn from(c: &CostBreakdown) -> Self {
        Self {
            energy_cost: c.energy_cost,
            access_fee: c.access_fee,
            subtotal: c.subtotal,
            platform_fee: c.platform_fee,
            host_earnings: c.host_earnings,
            total: c.total,
            total_cents: c.total_cents(),
        }
    }
}

/// Slot selection, used by both quote and checkout
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SlotRequest {
    #[validate(length(min = 1, message = "charger_id is required"))]
    pub charger_id: String,
    pub start_time: DateTime<Utc>,
    #[validate(range(min = 1, max = 24, message = "duration_hours must be 1-24"))]
    pub duration_hours: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuoteResponse {
    pub charger_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_hours: u32,
    pub cost: CostBreakdownDto,
}

impl From<&Quote> for QuoteResponse {
    fn from(q: &Quote) -> Self {
        Self {
            charger_id: q.charger.id.clone(),
            start_time: q.start_time,
            end_time: q.end_time,
            duration_hours: q.duration_hours,
            cost: CostBreakdownDto::from(&q.cost),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutResponse {
    pub booking_id: String,
    pub payment_intent_id: String,
    /// Confirm this with Stripe.js, then call commit
    pub client_secret: String,
    pub quote: QuoteResponse,
}

impl From<CheckoutSession> for CheckoutResponse {
    fn from(s: CheckoutSession) -> Self {
        Self {
            quote: QuoteResponse::from(&s.quote),
            booking_id: s.booking_id,
            payment_intent_id: s.payment_intent_id,
            client_secret: s.client_secret,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CommitBookingRequest {
    #[validate(length(min = 1, message = "booking_id is required"))]
    pub booking_id: String,
    #[validate(length(min = 1, message = "charger_id is required"))]
    pub charger_id: String,
    pub start_time: DateTime<Utc>,
    #[validate(range(min = 1, max = 24, message = "duration_hours must be 1-24"))]
    pub duration_hours: u32,
    #[validate(length(min = 1, message = "payment_intent_id is required"))]
    pub payment_intent_id: String,
}

impl From<CommitBookingRequest> for CommitRequest {
    fn from(r: CommitBookingRequest) -> Self {
        Self {
            booking_id: r.booking_id,
            charger_id: r.charger_id,
            start_time: r.start_time,
            duration_hours: r.duration_hours,
            payment_intent_id: r.payment_intent_id,
        }
    }
}
