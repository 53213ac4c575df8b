//! Host account repository interface

use async_trait::async_trait;

use super::model::HostAccount;
use crate::domain::DomainResult;

#[async_trait]
pub trait HostAccountRepository: Send + Sync {
    /// Insert or replace the account linked to `account.host_id`
    async fn upsert(&self, account: HostAccount) -> DomainResult<()>;

    async fn find_by_host(&self, host_id: &str) -> DomainResult<Option<HostAccount>>;
}
