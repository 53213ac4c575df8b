//! Stripe webhook signature verification
//!
//! `Stripe-Signature: t=<unix>,v1=<hex hmac>[,v1=...]` where the HMAC-SHA256
//! is computed over `"{t}.{raw body}"` with the endpoint's signing secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookSignatureError {
    #[error("Missing or malformed Stripe-Signature header")]
    MalformedHeader,

    #[error("Webhook timestamp outside tolerance")]
    TimestampOutOfTolerance,

    #[error("No matching webhook signature")]
    SignatureMismatch,

    #[error("Webhook secret is not configured")]
    NotConfigured,
}

/// Verify a webhook payload against its `Stripe-Signature` header.
///
/// `now` is a unix timestamp; signatures older or newer than
/// `tolerance_secs` are rejected.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), WebhookSignatureError> {
    if secret.is_empty() {
        return Err(WebhookSignatureError::NotConfigured);
    }

    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<Vec<u8>> = Vec::new();
    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookSignatureError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(WebhookSignatureError::MalformedHeader);
    }
    if (now - timestamp).abs() > tolerance_secs {
        return Err(WebhookSignatureError::TimestampOutOfTolerance);
    }

    let mac = signed_payload_mac(secret, timestamp, payload)?;
    let matched = signatures
        .iter()
        .any(|sig| mac.clone().verify_slice(sig).is_ok());
    if matched {
        Ok(())
    } else {
        Err(WebhookSignatureError::SignatureMismatch)
    }
}

fn signed_payload_mac(
    secret: &str,
    timestamp: i64,
    payload: &[u8],
) -> Result<HmacSha256, WebhookSignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookSignatureError::NotConfigured)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Build a `Stripe-Signature` header value for `payload`.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let sig = signed_payload_mac(secret, timestamp, payload)
        .map(|mac| hex::encode(mac.finalize().into_bytes()))
        .unwrap_or_default();
    format!("t={},v1={}", timestamp, sig)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const BODY: &[u8] = br#"{"type":"payment_intent.succeeded"}"#;

    #[test]
    fn valid_signature_is_accepted() {
        let header = signature_header(SECRET, 1_700_000_000, BODY);
        assert_eq!(
            verify_signature(BODY, &header, SECRET, 1_700_000_100, 300),
            Ok(())
        );
    }

    #[test]
    fn tampered_body_is_rejected() {
        let header = signature_header(SECRET, 1_700_000_000, BODY);
        assert_eq!(
            verify_signature(b"{}", &header, SECRET, 1_700_000_000, 300),
            Err(WebhookSignatureError::SignatureMismatch)
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let header = signature_header("whsec_other", 1_700_000_000, BODY);
        assert_eq!(
            verify_signature(BODY, &header, SECRET, 1_700_000_000, 300),
            Err(WebhookSignatureError::SignatureMismatch)
        );
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let header = signature_header(SECRET, 1_700_000_000, BODY);
        assert_eq!(
            verify_signature(BODY, &header, SECRET, 1_700_000_301, 300),
            Err(WebhookSignatureError::TimestampOutOfTolerance)
        );
    }

    #[test]
    fn any_matching_v1_entry_is_enough() {
        let good = signature_header(SECRET, 1_700_000_000, BODY);
        let good_sig = good.split("v1=").nth(1).unwrap();
        let header = format!("t=1700000000,v1={},v1={}", "00".repeat(32), good_sig);
        assert!(verify_signature(BODY, &header, SECRET, 1_700_000_000, 300).is_ok());
    }

    #[test]
    fn malformed_headers() {
        assert_eq!(
            verify_signature(BODY, "garbage", SECRET, 0, 300),
            Err(WebhookSignatureError::MalformedHeader)
        );
        assert_eq!(
            verify_signature(BODY, "t=1,v0=abc", SECRET, 1, 300),
            Err(WebhookSignatureError::MalformedHeader)
        );
        assert_eq!(
            verify_signature(BODY, "t=1,v1=00", "", 1, 300),
            Err(WebhookSignatureError::NotConfigured)
        );
    }
}
