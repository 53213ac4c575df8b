//! Bookings module: quote, checkout, commit, list, cancel

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
