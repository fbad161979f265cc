//! Member account entities (database row mappings).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{AccountStatus, SubscriptionSummary, UserRole};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub telegram_username: Option<String>,
    pub favorite_genre: Option<String>,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            password_hash: entity.password_hash,
            full_name: entity.full_name,
            telegram_username: entity.telegram_username,
            favorite_genre: entity.favorite_genre,
            // Unknown values degrade to the least privileged role and a
            // status that blocks access.
            role: UserRole::from_str(&entity.role).unwrap_or(UserRole::User),
            status: AccountStatus::from_str(&entity.status)
                .unwrap_or(AccountStatus::PendingDeletion),
            created_at: entity.created_at,
            last_login_at: entity.last_login_at,
        }
    }
}

/// Database row mapping for the login_history table.
#[derive(Debug, Clone, FromRow)]
pub struct LoginHistoryEntity {
    pub id: i64,
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<LoginHistoryEntity> for domain::models::LoginHistoryItem {
    fn from(entity: LoginHistoryEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            email: entity.email,
            role: UserRole::from_str(&entity.role).unwrap_or(UserRole::User),
            ip: entity.ip,
            user_agent: entity.user_agent,
            created_at: entity.created_at,
        }
    }
}

/// Member row with request count and current subscription, for the admin board.
#[derive(Debug, Clone, FromRow)]
pub struct AdminUserEntity {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub request_count: i64,
    pub plan: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
}

impl From<AdminUserEntity> for domain::models::AdminUserItem {
    fn from(entity: AdminUserEntity) -> Self {
        let subscription = match (entity.plan, entity.start_date, entity.expiry_date) {
            (Some(plan), Some(start_date), Some(expiry_date)) => Some(SubscriptionSummary {
                plan,
                start_date,
                expiry_date,
            }),
            _ => None,
        };
        Self {
            id: entity.id,
            email: entity.email,
            full_name: entity.full_name,
            status: AccountStatus::from_str(&entity.status)
                .unwrap_or(AccountStatus::PendingDeletion),
            created_at: entity.created_at,
            last_login_at: entity.last_login_at,
            request_count: entity.request_count,
            subscription,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(role: &str, status: &str) -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            email: "member@example.com".into(),
            password_hash: "hash".into(),
            full_name: "Member".into(),
            telegram_username: Some("@member".into()),
            favorite_genre: Some("Drama".into()),
            role: role.into(),
            status: status.into(),
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_user_entity_to_domain() {
        let user: domain::models::User = entity("admin", "active").into();
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.status, AccountStatus::Active);
        assert_eq!(user.telegram_username.as_deref(), Some("@member"));
    }

    #[test]
    fn test_unknown_values_fail_closed() {
        let user: domain::models::User = entity("superuser", "frozen").into();
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.status, AccountStatus::PendingDeletion);
    }

    #[test]
    fn test_admin_user_without_subscription() {
        let row = AdminUserEntity {
            id: Uuid::new_v4(),
            email: "member@example.com".into(),
            full_name: "Member".into(),
            status: "active".into(),
            created_at: Utc::now(),
            last_login_at: None,
            request_count: 3,
            plan: None,
            start_date: None,
            expiry_date: None,
        };
        let item: domain::models::AdminUserItem = row.into();
        assert_eq!(item.request_count, 3);
        assert!(item.subscription.is_none());
    }
}
