//! Movie request repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::MovieRequestStatus;
use domain::services::{window_start, Notification};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::entities::{MovieRequestEntity, MovieRequestWithEmailEntity, QuotaWindowEntity};
use crate::metrics::QueryTimer;
use crate::repositories::EmailOutboxRepository;

/// Result of a quota-guarded insert.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// The request was stored; `window` reflects the state after the insert.
    Accepted {
        request: MovieRequestEntity,
        window: QuotaWindowEntity,
    },
    /// The member was already at the ceiling; nothing was written.
    QuotaExceeded { window: QuotaWindowEntity },
}

/// Repository for movie request database operations.
#[derive(Clone)]
pub struct MovieRequestRepository {
    pool: PgPool,
}

impl MovieRequestRepository {
    /// Creates a new MovieRequestRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_quota_window<'e, E>(
        executor: E,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<QuotaWindowEntity, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, QuotaWindowEntity>(
            r#"
            SELECT COUNT(*) AS count, MIN(created_at) AS oldest
            FROM movie_requests
            WHERE user_id = $1 AND created_at >= $2
            "#,
        )
        .bind(user_id)
        .bind(window_start(now))
        .fetch_one(executor)
        .await
    }

    /// Count and oldest creation time of a member's requests in the window
    /// ending at `now`. Read-only.
    pub async fn quota_window(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<QuotaWindowEntity, sqlx::Error> {
        let timer = QueryTimer::new("movie_request_quota_window");
        let result = Self::fetch_quota_window(&self.pool, user_id, now).await;
        timer.record();
        result
    }

    /// Inserts a pending request unless the member already has `limit`
    /// requests in the window.
    ///
    /// The member's row is locked for the duration of the transaction, so
    /// concurrent submissions by the same member are serialized and the
    /// ceiling holds. The operator notification is queued in the same
    /// transaction.
    pub async fn create_within_quota(
        &self,
        user_id: Uuid,
        title: &str,
        message: Option<&str>,
        limit: i64,
        now: DateTime<Utc>,
        notification: &Notification,
    ) -> Result<SubmitOutcome, sqlx::Error> {
        let timer = QueryTimer::new("create_movie_request_within_quota");
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, Uuid>(r#"SELECT id FROM users WHERE id = $1 FOR UPDATE"#)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        let window = Self::fetch_quota_window(&mut *tx, user_id, now).await?;
        if window.count >= limit {
            tx.rollback().await?;
            timer.record();
            return Ok(SubmitOutcome::QuotaExceeded { window });
        }

        let request = sqlx::query_as::<_, MovieRequestEntity>(
            r#"
            INSERT INTO movie_requests (user_id, title, message, status, created_at)
            VALUES ($1, $2, $3, 'pending', $4)
            RETURNING id, user_id, title, message, status, created_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(message)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        EmailOutboxRepository::enqueue_with(&mut *tx, notification).await?;

        let window = Self::fetch_quota_window(&mut *tx, user_id, now).await?;

        tx.commit().await?;
        timer.record();
        Ok(SubmitOutcome::Accepted { request, window })
    }

    /// Lists a member's requests, newest first.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<MovieRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_movie_requests_for_user");
        let result = sqlx::query_as::<_, MovieRequestEntity>(
            r#"
            SELECT id, user_id, title, message, status, created_at
            FROM movie_requests
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Lists every request with the requester's email, newest first.
    pub async fn list_all(&self) -> Result<Vec<MovieRequestWithEmailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_all_movie_requests");
        let result = sqlx::query_as::<_, MovieRequestWithEmailEntity>(
            r#"
            SELECT mr.id, mr.user_id, u.email AS user_email, mr.title, mr.message,
                   mr.status, mr.created_at
            FROM movie_requests mr
            JOIN users u ON u.id = mr.user_id
            ORDER BY mr.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Sets a request's review status. Returns `None` for an unknown id.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: MovieRequestStatus,
    ) -> Result<Option<MovieRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_movie_request_status");
        let result = sqlx::query_as::<_, MovieRequestEntity>(
            r#"
            UPDATE movie_requests
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, message, status, created_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Number of a member's requests in the given status.
    pub async fn count_by_status(
        &self,
        user_id: Uuid,
        status: MovieRequestStatus,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_movie_requests_by_status");
        let result = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM movie_requests WHERE user_id = $1 AND status = $2"#,
        )
        .bind(user_id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
