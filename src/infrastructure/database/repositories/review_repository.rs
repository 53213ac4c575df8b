//! SeaORM implementation of ReviewRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::{db_err, db_err_or_conflict};
use crate::domain::review::{Review, ReviewRepository};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::review;

pub struct SeaOrmReviewRepository {
    db: DatabaseConnection,
}

impl SeaOrmReviewRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: review::Model) -> Review {
    Review {
        id: m.id,
        booking_id: m.booking_id,
        charger_id: m.charger_id,
        user_id: m.user_id,
        user_name: m.user_name,
        rating: m.rating.clamp(0, u8::MAX as i32) as u8,
        comment: m.comment,
        created_at: m.created_at,
    }
}

#[async_trait]
impl ReviewRepository for SeaOrmReviewRepository {
    async fn save(&self, r: Review) -> DomainResult<()> {
        review::ActiveModel {
            id: Set(r.id),
            booking_id: Set(r.booking_id),
            charger_id: Set(r.charger_id),
            user_id: Set(r.user_id),
            user_name: Set(r.user_name),
            rating: Set(r.rating as i32),
            comment: Set(r.comment),
            created_at: Set(r.created_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_err_or_conflict(e, "You have already reviewed this charger"))?;
        Ok(())
    }

    async fn find_for_charger(&self, charger_id: &str) -> DomainResult<Vec<Review>> {
        let models = review::Entity::find()
            .filter(review::Column::ChargerId.eq(charger_id))
            .order_by_desc(review::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_by_user_and_charger(
        &self,
        user_id: &str,
        charger_id: &str,
    ) -> DomainResult<Option<Review>> {
        let model = review::Entity::find()
            .filter(review::Column::UserId.eq(user_id))
            .filter(review::Column::ChargerId.eq(charger_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }
}
