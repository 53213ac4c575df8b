//! Booking entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub charger_id: String,
    pub user_id: String,
    pub user_name: String,

    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,
    pub duration_hours: i32,

    /// upcoming, active, completed, cancelled
    pub status: String,

    pub energy_cost: f64,
    pub access_fee: f64,
    pub platform_fee: f64,
    pub host_earnings: f64,
    pub total_cost: f64,

    #[sea_orm(nullable)]
    pub payment_intent_id: Option<String>,

    pub has_review: bool,
    pub reminder_sent: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::charger::Entity",
        from = "Column::ChargerId",
        to = "super::charger::Column::Id"
    )]
    Charger,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    Guest,
}

impl Related<super::charger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Charger.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Guest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
