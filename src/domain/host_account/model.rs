//! Host payout account entity

use chrono::{DateTime, Utc};

/// Stripe Connect account linked to a host
#[derive(Debug, Clone, PartialEq)]
pub struct HostAccount {
    pub host_id: String,
    /// `acct_...`
    pub stripe_account_id: String,
    pub email: Option<String>,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub connected_at: DateTime<Utc>,
}

impl HostAccount {
    /// Split payments are only routed to accounts that can take charges.
    pub fn can_receive_payments(&self) -> bool {
        self.charges_enabled
    }
}

/// Stripe Connect account IDs look like `acct_1AbCdEf...`.
pub fn is_valid_account_id(id: &str) -> bool {
    id.strip_prefix("acct_")
        .map(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_format() {
        assert!(is_valid_account_id("acct_1NqX2bC3dE"));
        assert!(!is_valid_account_id("acct_"));
        assert!(!is_valid_account_id("acct_12-34"));
        assert!(!is_valid_account_id("cus_123"));
    }
}
