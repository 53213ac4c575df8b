//! Domain layer
//!
//! Aggregates (model + repository trait), the pricing calculator and the
//! availability engine. Nothing here performs I/O.

pub mod booking;
pub mod charger;
pub mod host_account;
pub mod pricing;
pub mod repositories;
pub mod review;
pub mod scheduling;
pub mod user;

pub use booking::{Booking, BookingStatus};
pub use charger::{Charger, ConnectorType};
pub use host_account::HostAccount;
pub use pricing::{calculate_booking_cost, split_total_cents, CostBreakdown, PLATFORM_FEE_RATE};
pub use repositories::RepositoryProvider;
pub use review::{RatingSummary, Review};
pub use scheduling::{AvailabilityInfo, AvailableSlots, SlotWindow};
pub use user::{User, UserRole};

pub use crate::shared::errors::{DomainError, DomainResult};
