//! Application ports (hexagonal architecture boundaries)
//!
//! Outbound ports to the payment gateway and the email provider. Adapters
//! live in `infrastructure::stripe` and `infrastructure::email`.

pub mod email;
pub mod payment;

pub use email::{EmailError, EmailMessage, EmailSender, SentEmail, SharedEmailSender};
pub use payment::{
    ConnectedAccount, CreateIntentRequest, CreatedIntent, IntentStatus, PaymentGateway,
    PaymentGatewayError, PaymentIntent, SharedPaymentGateway,
};
