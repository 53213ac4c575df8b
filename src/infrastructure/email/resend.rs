//! Resend HTTP client
//!
//! `POST {api_base}/emails` with a bearer API key; the response carries the
//! provider message id.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::ports::{EmailError, EmailMessage, EmailSender, SentEmail};
use crate::config::EmailConfig;
use crate::shared::retry::{retry_with_backoff, RetryConfig};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct ResendClient {
    http: Client,
    api_key: String,
    api_base: String,
    default_from: String,
    retry: RetryConfig,
}

#[derive(Debug, Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

impl ResendClient {
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        if config.resend_api_key.is_empty() {
            return Err(EmailError::Rejected("RESEND_API_KEY is not set".to_string()));
        }
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EmailError::Unavailable(e.to_string()))?;

        Ok(Self {
            http,
            api_key: config.resend_api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            default_from: config.from.clone(),
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn post_once(&self, message: &EmailMessage) -> Result<SentEmail, EmailError> {
        let body = SendEmailBody {
            from: message.from.as_deref().unwrap_or(&self.default_from),
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
        };

        let resp = self
            .http
            .post(format!("{}/emails", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::Unavailable(e.to_string()))?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| EmailError::Unavailable(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(classify(status, &text));
        }

        let parsed: SendEmailResponse = serde_json::from_str(&text)
            .map_err(|e| EmailError::Unavailable(format!("invalid Resend response: {}", e)))?;
        Ok(SentEmail { id: parsed.id })
    }
}

/// Resend errors look like `{"statusCode": 422, "message": "..", "name": ".."}`.
fn classify(status: u16, body: &str) -> EmailError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| format!("Resend returned HTTP {}", status));
    match status {
        429 | 500..=599 => EmailError::Unavailable(message),
        _ => EmailError::Rejected(message),
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    async fn send(&self, message: EmailMessage) -> Result<SentEmail, EmailError> {
        if message.to.is_empty() {
            return Err(EmailError::Rejected("Missing recipient".to_string()));
        }
        let sent = retry_with_backoff(
            self.retry.clone(),
            || self.post_once(&message),
            EmailError::is_transient,
            "resend_send_email",
        )
        .await?;

        info!(email_id = %sent.id, subject = %message.subject, recipients = message.to.len(), "Email sent");
        Ok(sent)
    }
}
