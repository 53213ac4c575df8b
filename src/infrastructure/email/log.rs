//! Email sender that only logs
//!
//! Used in development and tests; keeps every message in an outbox.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::application::ports::{EmailError, EmailMessage, EmailSender, SentEmail};

#[derive(Default)]
pub struct LogEmailSender {
    outbox: Mutex<Vec<EmailMessage>>,
}

impl LogEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages "sent" so far, oldest first.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.outbox.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<SentEmail, EmailError> {
        if message.to.is_empty() {
            return Err(EmailError::Rejected("Missing recipient".to_string()));
        }
        let id = format!("log_{}", uuid::Uuid::new_v4().simple());
        info!(
            email_id = %id,
            to = %message.to.join(", "),
            subject = %message.subject,
            "Email (log only)"
        );
        if let Ok(mut outbox) = self.outbox.lock() {
            outbox.push(message);
        }
        Ok(SentEmail { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_messages() {
        let sender = LogEmailSender::new();
        sender
            .send(EmailMessage::new("a@b.co", "Booking Confirmed - PlugSpot", "<p/>"))
            .await
            .unwrap();
        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Booking Confirmed - PlugSpot");
    }
}
