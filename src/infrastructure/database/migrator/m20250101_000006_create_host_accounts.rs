//! Create host_accounts table
//!
//! Caches the Stripe Connect account linked to each host.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HostAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HostAccounts::HostId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(HostAccounts::StripeAccountId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(HostAccounts::Email).string())
                    .col(
                        ColumnDef::new(HostAccounts::ChargesEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(HostAccounts::PayoutsEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(HostAccounts::ConnectedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HostAccounts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum HostAccounts {
    Table,
    HostId,
    StripeAccountId,
    Email,
    ChargesEnabled,
    PayoutsEnabled,
    ConnectedAt,
}
