//! Stripe payment gateway adapters

mod client;
mod mock;
pub mod webhook;

pub use client::StripeClient;
pub use mock::MockPaymentGateway;
pub use webhook::{verify_signature, WebhookSignatureError};
