//! User repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::{AccountStatus, UserRole};
use domain::services::Notification;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{AdminUserEntity, LoginHistoryEntity, UserEntity};
use crate::metrics::QueryTimer;
use crate::repositories::EmailOutboxRepository;

/// Fields of a new account.
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub full_name: &'a str,
    pub role: UserRole,
}

/// Client details captured at login.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoginContext<'a> {
    pub ip: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, email, password_hash, full_name, telegram_username, favorite_genre,
                   role, status, created_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by (already normalized) email address.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, email, password_hash, full_name, telegram_username, favorite_genre,
                   role, status, created_at, last_login_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create a new account, queuing `notification` in the same transaction.
    ///
    /// A duplicate email surfaces as a unique violation.
    pub async fn create_user(
        &self,
        user: NewUser<'_>,
        notification: Option<&Notification>,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (email, password_hash, full_name, role, status)
            VALUES ($1, $2, $3, $4, 'active')
            RETURNING id, email, password_hash, full_name, telegram_username, favorite_genre,
                      role, status, created_at, last_login_at
            "#,
        )
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.full_name)
        .bind(user.role.as_str())
        .fetch_one(&mut *tx)
        .await?;

        if let Some(notification) = notification {
            EmailOutboxRepository::enqueue_with(&mut *tx, notification).await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(entity)
    }

    /// Creates the account as an active admin, or resets an existing one
    /// to admin with the given password.
    pub async fn upsert_admin(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_admin_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (email, password_hash, full_name, role, status)
            VALUES ($1, $2, $3, 'admin', 'active')
            ON CONFLICT (email) DO UPDATE
            SET password_hash = EXCLUDED.password_hash,
                role = 'admin',
                status = 'active',
                updated_at = NOW()
            RETURNING id, email, password_hash, full_name, telegram_username, favorite_genre,
                      role, status, created_at, last_login_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Stamps `last_login_at` and appends a login history row.
    pub async fn record_login(
        &self,
        user: &UserEntity,
        at: DateTime<Utc>,
        context: LoginContext<'_>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("record_user_login");
        let mut tx = self.pool.begin().await?;

        sqlx::query(r#"UPDATE users SET last_login_at = $2 WHERE id = $1"#)
            .bind(user.id)
            .bind(at)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO login_history (user_id, email, role, ip, user_agent, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.role)
        .bind(context.ip)
        .bind(context.user_agent)
        .bind(at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(())
    }

    /// Moves an account to `status`, queuing `notification` in the same
    /// transaction. Returns `None` for an unknown id.
    pub async fn set_status(
        &self,
        user_id: Uuid,
        status: AccountStatus,
        notification: Option<&Notification>,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_user_status");
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, UserEntity>(
            r#"
            UPDATE users
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, full_name, telegram_username, favorite_genre,
                      role, status, created_at, last_login_at
            "#,
        )
        .bind(user_id)
        .bind(status.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        if let (Some(_), Some(notification)) = (&entity, notification) {
            EmailOutboxRepository::enqueue_with(&mut *tx, notification).await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(entity)
    }

    /// Stores a member's favorite genre.
    pub async fn set_favorite_genre(&self, user_id: Uuid, genre: &str) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("set_favorite_genre");
        let result = sqlx::query(
            r#"UPDATE users SET favorite_genre = $2, updated_at = NOW() WHERE id = $1"#,
        )
        .bind(user_id)
        .bind(genre)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Permanently removes a member account.
    ///
    /// Requests, subscriptions, watchlist entries, login history and
    /// recovery secrets go with it through `ON DELETE CASCADE`. Admin
    /// accounts are never matched. Returns the number of rows deleted.
    pub async fn delete_member(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_member");
        let result = sqlx::query(r#"DELETE FROM users WHERE id = $1 AND role = 'user'"#)
            .bind(user_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Members with their request count and current subscription, newest first.
    pub async fn list_members(&self) -> Result<Vec<AdminUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_members");
        let result = sqlx::query_as::<_, AdminUserEntity>(
            r#"
            SELECT u.id, u.email, u.full_name, u.status, u.created_at, u.last_login_at,
                   (SELECT COUNT(*) FROM movie_requests mr WHERE mr.user_id = u.id) AS request_count,
                   s.plan, s.start_date, s.expiry_date
            FROM users u
            LEFT JOIN LATERAL (
                SELECT plan, start_date, expiry_date
                FROM subscriptions
                WHERE user_id = u.id AND is_active
                ORDER BY expiry_date DESC
                LIMIT 1
            ) s ON true
            WHERE u.role = 'user'
            ORDER BY u.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Most recent logins, newest first.
    pub async fn list_logins(&self, limit: i64) -> Result<Vec<LoginHistoryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_login_history");
        let result = sqlx::query_as::<_, LoginHistoryEntity>(
            r#"
            SELECT id, user_id, email, role, ip, user_agent, created_at
            FROM login_history
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
