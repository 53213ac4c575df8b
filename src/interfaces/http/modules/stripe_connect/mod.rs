//! Stripe Connect onboarding for hosts

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
