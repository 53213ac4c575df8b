//! Booking cost calculation
//!
//! Money is carried as `f64` dollars inside the domain and converted to
//! integer cents only at the payment gateway boundary.

use crate::shared::errors::{DomainError, DomainResult};

/// Platform commission taken from every booking subtotal.
pub const PLATFORM_FEE_RATE: f64 = 0.12;

/// Cost breakdown of a single booking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    /// `price_per_kwh * power_kw * duration_hours`
    pub energy_cost: f64,
    /// Flat per-booking fee set by the host
    pub access_fee: f64,
    /// Energy cost plus access fee
    pub subtotal: f64,
    /// Commission kept by the platform
    pub platform_fee: f64,
    /// Amount transferred to the host
    pub host_earnings: f64,
    /// Amount charged to the guest
    pub total: f64,
}

impl CostBreakdown {
    /// Amount charged to the guest, in cents.
    pub fn total_cents(&self) -> i64 {
        to_cents(self.total)
    }

    pub fn host_earnings_cents(&self) -> i64 {
        to_cents(self.host_earnings)
    }

    /// Connect application fee: whatever is left of the charge once the
    /// host's share is transferred.
    pub fn application_fee_cents(&self) -> i64 {
        self.total_cents() - self.host_earnings_cents()
    }
}

/// Compute the cost breakdown for a booking.
///
/// Every input must be finite and non-negative.
pub fn calculate_booking_cost(
    price_per_kwh: f64,
    power_kw: f64,
    access_fee: f64,
    duration_hours: f64,
) -> DomainResult<CostBreakdown> {
    ensure_amount("price_per_kwh", price_per_kwh)?;
    ensure_amount("power_kw", power_kw)?;
    ensure_amount("access_fee", access_fee)?;
    ensure_amount("duration_hours", duration_hours)?;

    let energy_cost = price_per_kwh * power_kw * duration_hours;
    let subtotal = energy_cost + access_fee;
    let platform_fee = subtotal * PLATFORM_FEE_RATE;

    Ok(CostBreakdown {
        energy_cost,
        access_fee,
        subtotal,
        platform_fee,
        host_earnings: subtotal - platform_fee,
        total: subtotal + platform_fee,
    })
}

/// Split an already-charged total (cents) into `(host_share, platform_fee)`.
///
/// Inverse of [`calculate_booking_cost`]: the subtotal is recovered as
/// `total / (1 + rate)`, the host keeps `subtotal * (1 - rate)` and the
/// platform keeps the remainder, so the two parts always sum to the total.
pub fn split_total_cents(total_cents: i64) -> (i64, i64) {
    let subtotal = total_cents as f64 / (1.0 + PLATFORM_FEE_RATE);
    let host = (subtotal * (1.0 - PLATFORM_FEE_RATE)).round() as i64;
    let host = host.clamp(0, total_cents.max(0));
    (host, total_cents - host)
}

/// Round a dollar amount to whole cents.
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

fn ensure_amount(name: &str, value: f64) -> DomainResult<()> {
    if !value.is_finite() {
        return Err(DomainError::Validation(format!("{} must be a finite number", name)));
    }
    if value < 0.0 {
        return Err(DomainError::Validation(format!(
            "{} must not be negative (got {})",
            name, value
        )));
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────
