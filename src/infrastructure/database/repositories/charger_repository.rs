//! SeaORM implementation of ChargerRepository and FavoriteRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, warn};

use super::db_err;
use crate::domain::charger::{Charger, ChargerRepository, ConnectorType, FavoriteRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{charger, favorite};

pub struct SeaOrmChargerRepository {
    db: DatabaseConnection,
}

impl SeaOrmChargerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn decode_list(raw: &str, charger_id: &str, column: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(charger_id, column, error = %e, "Unreadable JSON list column");
        Vec::new()
    })
}

fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

fn model_to_domain(m: charger::Model) -> DomainResult<Charger> {
    let connector = ConnectorType::parse(&m.connector_type).ok_or_else(|| {
        DomainError::Storage(format!(
            "Charger {} has unknown connector type '{}'",
            m.id, m.connector_type
        ))
    })?;
    let amenities = decode_list(&m.amenities, &m.id, "amenities");
    let photos = decode_list(&m.photos, &m.id, "photos");

    Ok(Charger {
        id: m.id,
        host_id: m.host_id,
        host_name: m.host_name,
        address: m.address,
        city: m.city,
        state: m.state,
        zip_code: m.zip_code,
        latitude: m.latitude,
        longitude: m.longitude,
        connector,
        power_kw: m.power_kw,
        price_per_kwh: m.price_per_kwh,
        access_fee: m.access_fee,
        amenities,
        photos,
        description: m.description,
        is_active: m.is_active,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn domain_to_active(c: Charger) -> charger::ActiveModel {
    charger::ActiveModel {
        id: Set(c.id),
        host_id: Set(c.host_id),
        host_name: Set(c.host_name),
        address: Set(c.address),
        city: Set(c.city),
        state: Set(c.state),
        zip_code: Set(c.zip_code),
        latitude: Set(c.latitude),
        longitude: Set(c.longitude),
        connector_type: Set(c.connector.as_str().to_string()),
        power_kw: Set(c.power_kw),
        price_per_kwh: Set(c.price_per_kwh),
        access_fee: Set(c.access_fee),
        amenities: Set(encode_list(&c.amenities)),
        photos: Set(encode_list(&c.photos)),
        description: Set(c.description),
        is_active: Set(c.is_active),
        created_at: Set(c.created_at),
        updated_at: Set(c.updated_at),
    }
}

fn models_to_domain(models: Vec<charger::Model>) -> DomainResult<Vec<Charger>> {
    models.into_iter().map(model_to_domain).collect()
}

// ── ChargerRepository impl ──────────────────────────────────────

#[async_trait]
impl ChargerRepository for SeaOrmChargerRepository {
    async fn save(&self, c: Charger) -> DomainResult<()> {
        debug!(charger_id = %c.id, host_id = %c.host_id, "Saving charger");
        domain_to_active(c).insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Charger>> {
        charger::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn update(&self, c: Charger) -> DomainResult<()> {
        debug!(charger_id = %c.id, "Updating charger");
        let existing = charger::Entity::find_by_id(c.id.as_str())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if existing.is_none() {
            return Err(DomainError::not_found("Charger", "id", &c.id));
        }
        domain_to_active(c).update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_all(&self) -> DomainResult<Vec<Charger>> {
        let models = charger::Entity::find()
            .order_by_asc(charger::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_by_host(&self, host_id: &str) -> DomainResult<Vec<Charger>> {
        let models = charger::Entity::find()
            .filter(charger::Column::HostId.eq(host_id))
            .order_by_asc(charger::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }
}

// ── FavoriteRepository impl ─────────────────────────────────────

pub struct SeaOrmFavoriteRepository {
    db: DatabaseConnection,
}

impl SeaOrmFavoriteRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FavoriteRepository for SeaOrmFavoriteRepository {
    async fn add(&self, user_id: &str, charger_id: &str) -> DomainResult<bool> {
        let existing = favorite::Entity::find_by_id((user_id.to_string(), charger_id.to_string()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if existing.is_some() {
            return Ok(false);
        }

        favorite::ActiveModel {
            user_id: Set(user_id.to_string()),
            charger_id: Set(charger_id.to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;
        Ok(true)
    }

    async fn remove(&self, user_id: &str, charger_id: &str) -> DomainResult<bool> {
        let result = favorite::Entity::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::ChargerId.eq(charger_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn list_for_user(&self, user_id: &str) -> DomainResult<Vec<String>> {
        let models = favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_asc(favorite::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(|f| f.charger_id).collect())
    }
}
