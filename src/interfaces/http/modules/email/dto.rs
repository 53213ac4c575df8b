//! Email relay DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::ports::EmailMessage;

/// A single address or a list of them
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Default for Recipients {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl From<Recipients> for Vec<String> {
    fn from(r: Recipients) -> Self {
        match r {
            Recipients::One(addr) => vec![addr],
            Recipients::Many(addrs) => addrs,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct SendEmailBody {
    pub to: Recipients,
    pub subject: String,
    pub html: String,
    pub from: Option<String>,
}

impl From<SendEmailBody> for EmailMessage {
    fn from(b: SendEmailBody) -> Self {
        EmailMessage {
            to: b.to.into(),
            subject: b.subject,
            html: b.html,
            from: b.from.filter(|f| !f.trim().is_empty()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub success: bool,
    pub message_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipients_accept_and_emit_both_shapes() {
        let body: SendEmailBody =
            serde_json::from_str(r#"{"to":"alex@example.com","subject":"Hi","html":"<p>x</p>"}"#).unwrap();
        assert_eq!(serde_json::to_value(&body.to).unwrap(), "alex@example.com");

        let many = Recipients::Many(vec!["a@example.com".into(), "b@example.com".into()]);
        assert_eq!(
            serde_json::to_value(&many).unwrap(),
            serde_json::json!(["a@example.com", "b@example.com"])
        );
        assert_eq!(serde_json::to_value(Recipients::default()).unwrap(), serde_json::json!([]));

        let message: EmailMessage = body.into();
        assert_eq!(message.to, vec!["alex@example.com".to_string()]);
        assert_eq!(message.from, None);
    }
}
