pub mod actor;
pub mod identity;
pub mod notifications;
pub mod ports;
pub mod services;

// Re-export key types for convenience
pub use actor::Actor;
pub use identity::{AuthOutcome, AuthResult, AuthService};
pub use notifications::BookingNotifier;
pub use ports::{EmailSender, PaymentGateway, SharedEmailSender, SharedPaymentGateway};
pub use services::{
    BookingService, ChargerService, DashboardService, PaymentService, ReviewService,
};
