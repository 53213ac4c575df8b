//! Create chargers table
//!
//! Listings are never deleted; hosts flip `is_active` instead.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Chargers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Chargers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Chargers::HostId).string().not_null())
                    .col(ColumnDef::new(Chargers::HostName).string().not_null())
                    .col(ColumnDef::new(Chargers::Address).string().not_null())
                    .col(ColumnDef::new(Chargers::City).string().not_null())
                    .col(ColumnDef::new(Chargers::State).string())
                    .col(ColumnDef::new(Chargers::ZipCode).string())
                    .col(ColumnDef::new(Chargers::Latitude).double().not_null())
                    .col(ColumnDef::new(Chargers::Longitude).double().not_null())
                    .col(
                        ColumnDef::new(Chargers::ConnectorType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Chargers::PowerKw).double().not_null())
                    .col(ColumnDef::new(Chargers::PricePerKwh).double().not_null())
                    .col(
                        ColumnDef::new(Chargers::AccessFee)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Chargers::Amenities)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Chargers::Photos)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Chargers::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Chargers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Chargers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Chargers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chargers_host")
                            .from(Chargers::Table, Chargers::HostId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chargers_host")
                    .table(Chargers::Table)
                    .col(Chargers::HostId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Chargers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Chargers {
    Table,
    Id,
    HostId,
    HostName,
    Address,
    City,
    State,
    ZipCode,
    Latitude,
    Longitude,
    ConnectorType,
    PowerKw,
    PricePerKwh,
    AccessFee,
    Amenities,
    Photos,
    Description,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
