//! Booking notification emails
//!
//! Renders the HTML templates and hands them to the configured
//! [`EmailSender`](crate::application::ports::EmailSender). Delivery failures
//! are logged and never abort the booking flow.

pub mod templates;

use chrono::FixedOffset;
use tracing::{info, warn};

use crate::application::ports::{EmailMessage, SentEmail, SharedEmailSender};
use crate::domain::{Booking, Charger, DomainError, DomainResult};

pub use templates::RenderedEmail;

pub struct BookingNotifier {
    sender: SharedEmailSender,
    public_base_url: String,
    offset: FixedOffset,
}

impl BookingNotifier {
    pub fn new(sender: SharedEmailSender, public_base_url: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            sender,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            offset,
        }
    }

    /// Send a caller-composed message as-is. Errors propagate.
    pub async fn relay(&self, message: EmailMessage) -> DomainResult<SentEmail> {
        if message.to.iter().all(|t| t.trim().is_empty()) {
            return Err(DomainError::Validation("Missing required fields: to".into()));
        }
        if message.subject.trim().is_empty() || message.html.trim().is_empty() {
            return Err(DomainError::Validation(
                "Missing required fields: subject, html".into(),
            ));
        }
        let sent = self.sender.send(message).await?;
        info!(email_id = %sent.id, "Email relayed");
        Ok(sent)
    }

    /// Guest confirmation, payment receipt and host notification.
    pub async fn booking_confirmed(
        &self,
        booking: &Booking,
        charger: &Charger,
        guest_email: &str,
        host_email: Option<&str>,
    ) {
        let ctx = templates::BookingContext::new(booking, charger, &self.public_base_url, self.offset);

        self.deliver(guest_email, templates::booking_confirmation_guest(&ctx), &booking.id)
            .await;
        self.deliver(guest_email, templates::payment_receipt(&ctx), &booking.id)
            .await;
        match host_email {
            Some(host) => {
                self.deliver(host, templates::booking_confirmation_host(&ctx), &booking.id)
                    .await;
            }
            None => warn!(booking_id = %booking.id, host_id = %charger.host_id, "Host has no email, skipping host notification"),
        }
    }

    /// Reminder before the session starts. Returns `true` if delivered.
    pub async fn booking_reminder(&self, booking: &Booking, charger: &Charger, guest_email: &str) -> bool {
        let ctx = templates::BookingContext::new(booking, charger, &self.public_base_url, self.offset);
        self.deliver(guest_email, templates::booking_reminder(&ctx), &booking.id)
            .await
    }

    async fn deliver(&self, to: &str, email: RenderedEmail, booking_id: &str) -> bool {
        let subject = email.subject.clone();
        match self
            .sender
            .send(EmailMessage::new(to, email.subject, email.html))
            .await
        {
            Ok(sent) => {
                info!(booking_id, email_id = %sent.id, subject = %subject, "Notification sent");
                true
            }
            Err(e) => {
                warn!(booking_id, subject = %subject, error = %e, "Notification failed");
                false
            }
        }
    }
}
