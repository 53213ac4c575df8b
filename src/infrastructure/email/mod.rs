//! Email delivery adapters

mod log;
mod resend;

pub use self::log::LogEmailSender;
pub use resend::ResendClient;
