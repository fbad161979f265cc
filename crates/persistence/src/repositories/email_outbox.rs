//! Email outbox repository.
//!
//! Rows are written alongside the business change that produced them and
//! drained by the outbox job. Claiming pushes `next_attempt_at` forward by a
//! lease so concurrent workers never pick the same row.

use chrono::{DateTime, Duration, Utc};
use domain::services::Notification;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::entities::email_outbox::{
    EmailOutboxEntity, FailureTransition, CLAIM_LEASE_MINUTES, STATUS_FAILED, STATUS_PENDING,
    STATUS_SENT,
};
use crate::metrics::QueryTimer;

/// Repository for email outbox operations.
#[derive(Clone)]
pub struct EmailOutboxRepository {
    pool: PgPool,
}

impl EmailOutboxRepository {
    /// Creates a new EmailOutboxRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Queues a message on the given executor, typically an open transaction.
    pub async fn enqueue_with<'e, E>(
        executor: E,
        notification: &Notification,
    ) -> Result<Uuid, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let timer = QueryTimer::new("enqueue_email");
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO email_outbox (recipient, subject, body, status, attempts, next_attempt_at)
            VALUES ($1, $2, $3, 'pending', 0, NOW())
            RETURNING id
            "#,
        )
        .bind(&notification.recipient)
        .bind(&notification.subject)
        .bind(&notification.body)
        .fetch_one(executor)
        .await;
        timer.record();
        result
    }

    /// Claims up to `batch_size` due rows, leasing them to the caller.
    pub async fn claim_due(
        &self,
        batch_size: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<EmailOutboxEntity>, sqlx::Error> {
        let timer = QueryTimer::new("claim_due_emails");
        let lease_until = now + Duration::minutes(CLAIM_LEASE_MINUTES);
        let result = sqlx::query_as::<_, EmailOutboxEntity>(
            r#"
            UPDATE email_outbox
            SET next_attempt_at = $2
            WHERE id IN (
                SELECT id FROM email_outbox
                WHERE status = $3 AND next_attempt_at <= $1
                ORDER BY next_attempt_at ASC
                LIMIT $4
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, recipient, subject, body, status, attempts, last_error,
                      next_attempt_at, created_at, sent_at
            "#,
        )
        .bind(now)
        .bind(lease_until)
        .bind(STATUS_PENDING)
        .bind(batch_size)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Marks a row as delivered.
    pub async fn mark_sent(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("mark_email_sent");
        sqlx::query(
            r#"
            UPDATE email_outbox
            SET status = $2, attempts = attempts + 1, sent_at = $3, last_error = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(STATUS_SENT)
        .bind(now)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }

    /// Records a failed attempt, scheduling a retry or parking the row.
    pub async fn record_failure(
        &self,
        entity: &EmailOutboxEntity,
        error: &str,
        now: DateTime<Utc>,
    ) -> Result<FailureTransition, sqlx::Error> {
        let timer = QueryTimer::new("record_email_failure");
        let transition = FailureTransition::after(entity.attempts);
        let (status, attempts, next_attempt_at) = match transition {
            FailureTransition::Retry { attempts, delay } => (STATUS_PENDING, attempts, now + delay),
            FailureTransition::GiveUp { attempts } => (STATUS_FAILED, attempts, now),
        };

        sqlx::query(
            r#"
            UPDATE email_outbox
            SET status = $2, attempts = $3, last_error = $4, next_attempt_at = $5
            WHERE id = $1
            "#,
        )
        .bind(entity.id)
        .bind(status)
        .bind(attempts)
        .bind(error)
        .bind(next_attempt_at)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(transition)
    }

    /// Number of rows still waiting for delivery.
    pub async fn count_pending(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_pending_emails");
        let result = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM email_outbox WHERE status = $1"#,
        )
        .bind(STATUS_PENDING)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
