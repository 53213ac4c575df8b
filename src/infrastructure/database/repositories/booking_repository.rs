//! SeaORM implementation of BookingRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use super::{db_err, db_err_or_conflict};
use crate::domain::booking::{Booking, BookingRepository, BookingStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::booking;

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: booking::Model) -> Booking {
    Booking {
        id: m.id,
        charger_id: m.charger_id,
        user_id: m.user_id,
        user_name: m.user_name,
        start_time: m.start_time,
        end_time: m.end_time,
        duration_hours: m.duration_hours.max(0) as u32,
        status: BookingStatus::from_str(&m.status),
        energy_cost: m.energy_cost,
        access_fee: m.access_fee,
        platform_fee: m.platform_fee,
        host_earnings: m.host_earnings,
        total_cost: m.total_cost,
        payment_intent_id: m.payment_intent_id,
        has_review: m.has_review,
        reminder_sent: m.reminder_sent,
        created_at: m.created_at,
    }
}

fn domain_to_active(b: Booking) -> booking::ActiveModel {
    booking::ActiveModel {
        id: Set(b.id),
        charger_id: Set(b.charger_id),
        user_id: Set(b.user_id),
        user_name: Set(b.user_name),
        start_time: Set(b.start_time),
        end_time: Set(b.end_time),
        duration_hours: Set(b.duration_hours as i32),
        status: Set(b.status.as_str().to_string()),
        energy_cost: Set(b.energy_cost),
        access_fee: Set(b.access_fee),
        platform_fee: Set(b.platform_fee),
        host_earnings: Set(b.host_earnings),
        total_cost: Set(b.total_cost),
        payment_intent_id: Set(b.payment_intent_id),
        has_review: Set(b.has_review),
        reminder_sent: Set(b.reminder_sent),
        created_at: Set(b.created_at),
    }
}

// ── BookingRepository impl ──────────────────────────────────────

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn save(&self, b: Booking) -> DomainResult<()> {
        debug!(booking_id = %b.id, charger_id = %b.charger_id, "Saving booking");
        let id = b.id.clone();
        domain_to_active(b)
            .insert(&self.db)
            .await
            .map_err(|e| db_err_or_conflict(e, &format!("Booking {} already exists", id)))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Booking>> {
        let model = booking::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_payment_intent(&self, payment_intent_id: &str) -> DomainResult<Option<Booking>> {
        let model = booking::Entity::find()
            .filter(booking::Column::PaymentIntentId.eq(payment_intent_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn update(&self, b: Booking) -> DomainResult<()> {
        debug!(booking_id = %b.id, status = %b.status, "Updating booking");
        let existing = booking::Entity::find_by_id(b.id.as_str())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if existing.is_none() {
            return Err(DomainError::not_found("Booking", "id", &b.id));
        }
        domain_to_active(b).update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_for_charger(&self, charger_id: &str) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::ChargerId.eq(charger_id))
            .order_by_asc(booking::Column::StartTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_for_user(&self, user_id: &str) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .order_by_desc(booking::Column::StartTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_open(&self) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::Status.is_in([
                BookingStatus::Upcoming.as_str(),
                BookingStatus::Active.as_str(),
            ]))
            .order_by_asc(booking::Column::StartTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_all(&self) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}
