//! Create bookings table

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_users::Users;
use super::m20250101_000002_create_chargers::Chargers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bookings::ChargerId).string().not_null())
                    .col(ColumnDef::new(Bookings::UserId).string().not_null())
                    .col(ColumnDef::new(Bookings::UserName).string().not_null())
                    .col(
                        ColumnDef::new(Bookings::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bookings::DurationHours).integer().not_null())
                    .col(
                        ColumnDef::new(Bookings::Status)
                            .string_len(20)
                            .not_null()
                            .default("upcoming"),
                    )
                    .col(ColumnDef::new(Bookings::EnergyCost).double().not_null())
                    .col(ColumnDef::new(Bookings::AccessFee).double().not_null())
                    .col(ColumnDef::new(Bookings::PlatformFee).double().not_null())
                    .col(ColumnDef::new(Bookings::HostEarnings).double().not_null())
                    .col(ColumnDef::new(Bookings::TotalCost).double().not_null())
                    .col(ColumnDef::new(Bookings::PaymentIntentId).string())
                    .col(
                        ColumnDef::new(Bookings::HasReview)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_charger")
                            .from(Bookings::Table, Bookings::ChargerId)
                            .to(Chargers::Table, Chargers::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_user")
                            .from(Bookings::Table, Bookings::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_charger_start")
                    .table(Bookings::Table)
                    .col(Bookings::ChargerId)
                    .col(Bookings::StartTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_user")
                    .table(Bookings::Table)
                    .col(Bookings::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_payment_intent")
                    .table(Bookings::Table)
                    .col(Bookings::PaymentIntentId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Bookings {
    Table,
    Id,
    ChargerId,
    UserId,
    UserName,
    StartTime,
    EndTime,
    DurationHours,
    Status,
    EnergyCost,
    AccessFee,
    PlatformFee,
    HostEarnings,
    TotalCost,
    PaymentIntentId,
    HasReview,
    ReminderSent,
    CreatedAt,
}
