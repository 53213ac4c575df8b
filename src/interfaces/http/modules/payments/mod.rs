//! Payment relay: raw PaymentIntent creation and status lookup

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
