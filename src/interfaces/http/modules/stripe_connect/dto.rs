//! Stripe Connect DTOs (camelCase, unenveloped)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::HostAccount;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct OAuthUrlParams {
    pub host_id: String,
    pub return_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OAuthUrlResponse {
    pub oauth_url: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CallbackBody {
    pub code: String,
    /// Host user ID round-tripped through the OAuth flow
    pub state: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedAccountResponse {
    pub host_id: String,
    pub account_id: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub connected_at: DateTime<Utc>,
}

impl From<HostAccount> for ConnectedAccountResponse {
    fn from(a: HostAccount) -> Self {
        Self {
            is_active: a.can_receive_payments(),
            host_id: a.host_id,
            account_id: a.stripe_account_id,
            email: a.email,
            charges_enabled: a.charges_enabled,
            payouts_enabled: a.payouts_enabled,
            connected_at: a.connected_at,
        }
    }
}
