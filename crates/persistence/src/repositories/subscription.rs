//! Subscription repository for database operations.

use chrono::NaiveDate;
use domain::services::Notification;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{SubscriptionEntity, SubscriptionWithEmailEntity};
use crate::metrics::QueryTimer;
use crate::repositories::EmailOutboxRepository;

/// A new subscription period to activate.
#[derive(Debug, Clone)]
pub struct NewSubscription<'a> {
    pub user_id: Uuid,
    pub plan: &'a str,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

/// Profile fields captured at checkout.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutProfile<'a> {
    pub full_name: &'a str,
    pub telegram_username: &'a str,
}

/// Repository for subscription database operations.
#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    /// Creates a new SubscriptionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Activates a subscription, deactivating any earlier ones for the member.
    ///
    /// Profile update, deactivation, insert and the queued emails commit
    /// together.
    pub async fn activate(
        &self,
        subscription: &NewSubscription<'_>,
        profile: Option<CheckoutProfile<'_>>,
        notifications: &[Notification],
    ) -> Result<SubscriptionEntity, sqlx::Error> {
        let timer = QueryTimer::new("activate_subscription");
        let mut tx = self.pool.begin().await?;

        if let Some(profile) = profile {
            sqlx::query(
                r#"
                UPDATE users
                SET full_name = $2, telegram_username = $3, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(subscription.user_id)
            .bind(profile.full_name)
            .bind(profile.telegram_username)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(r#"UPDATE subscriptions SET is_active = false WHERE user_id = $1 AND is_active"#)
            .bind(subscription.user_id)
            .execute(&mut *tx)
            .await?;

        let entity = sqlx::query_as::<_, SubscriptionEntity>(
            r#"
            INSERT INTO subscriptions (user_id, plan, start_date, expiry_date, is_active)
            VALUES ($1, $2, $3, $4, true)
            RETURNING id, user_id, plan, start_date, expiry_date, is_active, created_at
            "#,
        )
        .bind(subscription.user_id)
        .bind(subscription.plan)
        .bind(subscription.start_date)
        .bind(subscription.expiry_date)
        .fetch_one(&mut *tx)
        .await?;

        for notification in notifications {
            EmailOutboxRepository::enqueue_with(&mut *tx, notification).await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(entity)
    }

    /// Current active, unexpired subscription of a member.
    pub async fn find_current(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Option<SubscriptionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_current_subscription");
        let result = sqlx::query_as::<_, SubscriptionEntity>(
            r#"
            SELECT id, user_id, plan, start_date, expiry_date, is_active, created_at
            FROM subscriptions
            WHERE user_id = $1 AND is_active AND expiry_date >= $2
            ORDER BY expiry_date DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(today)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Active, unexpired subscriptions with owner email, soonest expiry first.
    pub async fn list_active(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<SubscriptionWithEmailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_active_subscriptions");
        let result = sqlx::query_as::<_, SubscriptionWithEmailEntity>(
            r#"
            SELECT s.id, s.user_id, u.email, s.plan, s.start_date, s.expiry_date
            FROM subscriptions s
            JOIN users u ON u.id = s.user_id
            WHERE s.is_active AND s.expiry_date >= $1
            ORDER BY s.expiry_date ASC
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Overrides expiry and active flag of a member's active subscription.
    ///
    /// Returns the number of rows touched.
    pub async fn update_active(
        &self,
        user_id: Uuid,
        expiry_date: NaiveDate,
        is_active: bool,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("update_active_subscription");
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET expiry_date = $2, is_active = $3
            WHERE user_id = $1 AND is_active
            "#,
        )
        .bind(user_id)
        .bind(expiry_date)
        .bind(is_active)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Deactivates every active subscription that expired before `today`,
    /// queuing one email per row built by `compose`.
    pub async fn deactivate_expired<F>(
        &self,
        today: NaiveDate,
        compose: F,
    ) -> Result<Vec<SubscriptionWithEmailEntity>, sqlx::Error>
    where
        F: Fn(&SubscriptionWithEmailEntity) -> Notification,
    {
        let timer = QueryTimer::new("deactivate_expired_subscriptions");
        let mut tx = self.pool.begin().await?;

        let expired = sqlx::query_as::<_, SubscriptionWithEmailEntity>(
            r#"
            UPDATE subscriptions s
            SET is_active = false
            FROM users u
            WHERE u.id = s.user_id AND s.is_active AND s.expiry_date < $1
            RETURNING s.id, s.user_id, u.email, s.plan, s.start_date, s.expiry_date
            "#,
        )
        .bind(today)
        .fetch_all(&mut *tx)
        .await?;

        for row in &expired {
            EmailOutboxRepository::enqueue_with(&mut *tx, &compose(row)).await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(expired)
    }

    /// Marks active subscriptions expiring on `expiry_date` as warned today
    /// and queues one email per row. Rows already warned today are skipped.
    pub async fn claim_expiry_warnings<F>(
        &self,
        expiry_date: NaiveDate,
        today: NaiveDate,
        compose: F,
    ) -> Result<Vec<SubscriptionWithEmailEntity>, sqlx::Error>
    where
        F: Fn(&SubscriptionWithEmailEntity) -> Notification,
    {
        let timer = QueryTimer::new("claim_subscription_expiry_warnings");
        let mut tx = self.pool.begin().await?;

        let expiring = sqlx::query_as::<_, SubscriptionWithEmailEntity>(
            r#"
            UPDATE subscriptions s
            SET warned_on = $2
            FROM users u
            WHERE u.id = s.user_id
              AND s.is_active
              AND s.expiry_date = $1
              AND (s.warned_on IS NULL OR s.warned_on < $2)
            RETURNING s.id, s.user_id, u.email, s.plan, s.start_date, s.expiry_date
            "#,
        )
        .bind(expiry_date)
        .bind(today)
        .fetch_all(&mut *tx)
        .await?;

        for row in &expiring {
            EmailOutboxRepository::enqueue_with(&mut *tx, &compose(row)).await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(expiring)
    }
}
