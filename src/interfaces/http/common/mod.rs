//! Shared HTTP plumbing: response envelope, error mapping, validated JSON

mod validated_json;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::DomainError;

pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

/// Standard envelope of the `/api/v1` endpoints
///
/// On success: `{"success": true, "data": {...}}`,
/// on failure: `{"success": false, "data": null, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    /// `null` on error
    pub data: Option<T>,
    /// `null` on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Error half of every `/api/v1` handler result
pub type ApiError<T> = (StatusCode, Json<ApiResponse<T>>);

/// HTTP status for a domain error.
pub fn status_for(e: &DomainError) -> StatusCode {
    match e {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) | DomainError::SlotUnavailable { .. } => StatusCode::CONFLICT,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Payment(_) => StatusCode::PAYMENT_REQUIRED,
        DomainError::GatewayUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a domain error into the `/api/v1` error envelope.
pub fn domain_error<T>(e: DomainError) -> ApiError<T> {
    let status = status_for(&e);
    if status.is_server_error() {
        error!(status = status.as_u16(), error = %e, "Request failed");
    }
    (status, Json(ApiResponse::error(e.to_string())))
}

/// Body of relay error responses: `{"error": "..."}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RelayErrorBody {
    pub error: String,
}

/// Error of the payment/email relay endpoints, which answer with a bare
/// `{"error": ...}` object instead of the envelope.
#[derive(Debug)]
pub struct RelayError(pub StatusCode, pub String);

impl RelayError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(StatusCode::BAD_REQUEST, message.into())
    }
}

impl From<DomainError> for RelayError {
    fn from(e: DomainError) -> Self {
        let status = status_for(&e);
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %e, "Relay request failed");
        }
        let message = match e {
            DomainError::Validation(msg) | DomainError::Payment(msg) => msg,
            other => other.to_string(),
        };
        Self(status, message)
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.0, Json(RelayErrorBody { error: self.1 })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (DomainError::not_found("Charger", "id", "c-1"), StatusCode::NOT_FOUND),
            (DomainError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                DomainError::SlotUnavailable {
                    charger_id: "c-1".into(),
                    start: Utc::now(),
                    end: Utc::now(),
                },
                StatusCode::CONFLICT,
            ),
            (DomainError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (DomainError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (DomainError::Payment("declined".into()), StatusCode::PAYMENT_REQUIRED),
            (DomainError::GatewayUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (DomainError::Storage("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(status_for(&err), status, "{}", err);
        }
    }

    #[test]
    fn relay_errors_keep_user_messages_verbatim() {
        let e = RelayError::from(DomainError::Payment("Your card was declined.".into()));
        assert_eq!(e.0, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(e.1, "Your card was declined.");
    }
}
