//! Subscription entities (database row mappings).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the subscriptions table.
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Subscription joined with the owner's email.
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionWithEmailEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub plan: String,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

impl From<SubscriptionEntity> for domain::models::Subscription {
    fn from(entity: SubscriptionEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            plan: entity.plan,
            start_date: entity.start_date,
            expiry_date: entity.expiry_date,
            is_active: entity.is_active,
            created_at: entity.created_at,
        }
    }
}

impl From<SubscriptionWithEmailEntity> for domain::models::ActiveSubscriptionItem {
    fn from(entity: SubscriptionWithEmailEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            email: entity.email,
            plan: entity.plan,
            start_date: entity.start_date,
            expiry_date: entity.expiry_date,
        }
    }
}
