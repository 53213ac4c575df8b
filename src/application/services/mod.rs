//! Application services
//!
//! Each service owns one slice of the marketplace and works against the
//! [`RepositoryProvider`](crate::domain::RepositoryProvider) and the outbound
//! ports. Handlers call these; nothing here knows about HTTP.

pub mod bookings;
pub mod chargers;
pub mod dashboards;
pub mod payments;
pub mod reviews;
pub mod status_task;

#[cfg(test)]
pub(crate) mod fixtures;

pub use bookings::{utc_offset, BookingService, BookingSettings, CheckoutSession, CommitRequest, Quote};
pub use chargers::{BrowseQuery, ChargerDraft, ChargerService, ChargerUpdate, ChargerView, CreatedCharger, SortBy};
pub use dashboards::{BookingCounts, DashboardService, HostDashboard, PlatformDashboard};
pub use payments::{IntentInput, PaymentService, PaymentSettings, WebhookOutcome};
pub use reviews::ReviewService;
pub use status_task::start_booking_status_task;
