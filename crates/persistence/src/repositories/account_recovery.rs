//! Password reset tokens and email login codes.
//!
//! Only digests are stored. Issuing a new secret replaces every outstanding
//! one for the member, and consuming a secret is a single conditional
//! update so it can succeed at most once.

use chrono::{DateTime, Utc};
use domain::services::Notification;
use sqlx::PgPool;
use uuid::Uuid;

use crate::metrics::QueryTimer;
use crate::repositories::EmailOutboxRepository;

/// Repository for account recovery secrets.
#[derive(Clone)]
pub struct AccountRecoveryRepository {
    pool: PgPool,
}

impl AccountRecoveryRepository {
    /// Creates a new AccountRecoveryRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stores a reset token digest and queues the reset email.
    pub async fn issue_password_reset(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
        notification: &Notification,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("issue_password_reset");
        let mut tx = self.pool.begin().await?;

        sqlx::query(r#"DELETE FROM password_resets WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO password_resets (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        EmailOutboxRepository::enqueue_with(&mut *tx, notification).await?;

        tx.commit().await?;
        timer.record();
        Ok(())
    }

    /// Marks an unexpired, unused token as used and sets the new password.
    ///
    /// Returns the member id, or `None` when the token is unknown, expired
    /// or already used.
    pub async fn consume_password_reset(
        &self,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("consume_password_reset");
        let mut tx = self.pool.begin().await?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE password_resets
            SET used_at = $2
            WHERE token_hash = $1 AND used_at IS NULL AND expires_at > $2
            RETURNING user_id
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(user_id) = user_id {
            sqlx::query(
                r#"UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1"#,
            )
            .bind(user_id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(user_id)
    }

    /// Stores a login code digest and queues the code email.
    pub async fn issue_login_code(
        &self,
        user_id: Uuid,
        code_hash: &str,
        expires_at: DateTime<Utc>,
        notification: &Notification,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("issue_login_code");
        let mut tx = self.pool.begin().await?;

        sqlx::query(r#"DELETE FROM email_otps WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO email_otps (user_id, code_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(code_hash)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        EmailOutboxRepository::enqueue_with(&mut *tx, notification).await?;

        tx.commit().await?;
        timer.record();
        Ok(())
    }

    /// Marks the member's matching unexpired, unused code as used.
    ///
    /// Returns `false` when no such code exists.
    pub async fn consume_login_code(
        &self,
        user_id: Uuid,
        code_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("consume_login_code");
        let result = sqlx::query(
            r#"
            UPDATE email_otps
            SET used_at = $3
            WHERE user_id = $1 AND code_hash = $2 AND used_at IS NULL AND expires_at > $3
            "#,
        )
        .bind(user_id)
        .bind(code_hash)
        .bind(now)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
