use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    /// The requested interval overlaps a booking committed in the meantime.
    #[error("This time slot is no longer available for charger {charger_id} ({start} - {end})")]
    SlotUnavailable {
        charger_id: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Rejected by the payment gateway; the message is shown to the user as-is.
    #[error("{0}")]
    Payment(String),

    #[error("Service unavailable: {0}")]
    GatewayUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.into(),
        }
    }

    /// Whether this error is likely transient (e.g. DB connection lost or
    /// gateway unreachable) and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DomainError::GatewayUnavailable(_)
                | DomainError::Storage(_)
                | DomainError::SlotUnavailable { .. }
        )
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<InfraError> for DomainError {
    fn from(e: InfraError) -> Self {
        DomainError::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors() {
        assert!(DomainError::GatewayUnavailable("timeout".into()).is_transient());
        assert!(DomainError::Storage("locked".into()).is_transient());
        assert!(!DomainError::Validation("bad".into()).is_transient());
        assert!(!DomainError::Payment("card declined".into()).is_transient());
    }

    #[test]
    fn payment_message_is_verbatim() {
        let e = DomainError::Payment("Your card was declined.".into());
        assert_eq!(e.to_string(), "Your card was declined.");
    }

    #[test]
    fn not_found_display() {
        let e = DomainError::not_found("Charger", "id", "c-1");
        assert_eq!(e.to_string(), "Not found: Charger with id=c-1");
    }
}
