//! Stripe webhook intake

pub mod handlers;

pub use handlers::*;
