//! Review repository interface

use async_trait::async_trait;

use super::model::Review;
use crate::domain::DomainResult;

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Save a new review. Fails with `Conflict` if the author already
    /// reviewed this charger.
    async fn save(&self, review: Review) -> DomainResult<()>;

    /// Reviews of a charger, newest first
    async fn find_for_charger(&self, charger_id: &str) -> DomainResult<Vec<Review>>;

    async fn find_by_user_and_charger(
        &self,
        user_id: &str,
        charger_id: &str,
    ) -> DomainResult<Option<Review>>;
}
