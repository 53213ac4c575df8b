//! Email delivery port

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::shared::errors::DomainError;

pub type SharedEmailSender = Arc<dyn EmailSender>;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email rejected: {0}")]
    Rejected(String),

    #[error("Email provider unavailable: {0}")]
    Unavailable(String),
}

impl EmailError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<EmailError> for DomainError {
    fn from(e: EmailError) -> Self {
        match e {
            EmailError::Rejected(msg) => DomainError::Validation(msg),
            EmailError::Unavailable(msg) => DomainError::GatewayUnavailable(msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    /// Overrides the configured sender
    pub from: Option<String>,
}

impl EmailMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to: vec![to.into()],
            subject: subject.into(),
            html: html.into(),
            from: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentEmail {
    /// Provider message ID
    pub id: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<SentEmail, EmailError>;
}
