//! SeaORM implementation of HostAccountRepository

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use tracing::info;

use super::db_err;
use crate::domain::host_account::{HostAccount, HostAccountRepository};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::host_account;

pub struct SeaOrmHostAccountRepository {
    db: DatabaseConnection,
}

impl SeaOrmHostAccountRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: host_account::Model) -> HostAccount {
    HostAccount {
        host_id: m.host_id,
        stripe_account_id: m.stripe_account_id,
        email: m.email,
        charges_enabled: m.charges_enabled,
        payouts_enabled: m.payouts_enabled,
        connected_at: m.connected_at,
    }
}

#[async_trait]
impl HostAccountRepository for SeaOrmHostAccountRepository {
    async fn upsert(&self, a: HostAccount) -> DomainResult<()> {
        info!(host_id = %a.host_id, account_id = %a.stripe_account_id, "Storing host Connect account");
        let model = host_account::ActiveModel {
            host_id: Set(a.host_id),
            stripe_account_id: Set(a.stripe_account_id),
            email: Set(a.email),
            charges_enabled: Set(a.charges_enabled),
            payouts_enabled: Set(a.payouts_enabled),
            connected_at: Set(a.connected_at),
        };

        host_account::Entity::insert(model)
            .on_conflict(
                OnConflict::column(host_account::Column::HostId)
                    .update_columns([
                        host_account::Column::StripeAccountId,
                        host_account::Column::Email,
                        host_account::Column::ChargesEnabled,
                        host_account::Column::PayoutsEnabled,
                        host_account::Column::ConnectedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find_by_host(&self, host_id: &str) -> DomainResult<Option<HostAccount>> {
        let model = host_account::Entity::find_by_id(host_id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }
}
