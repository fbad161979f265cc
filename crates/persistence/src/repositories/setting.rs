//! Setting repository for database operations.

use sqlx::PgPool;

use crate::entities::SettingEntity;
use crate::metrics::QueryTimer;

/// Repository for platform settings.
#[derive(Clone)]
pub struct SettingRepository {
    pool: PgPool,
}

impl SettingRepository {
    /// Creates a new SettingRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a setting by key.
    pub async fn get(&self, key: &str) -> Result<Option<SettingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("get_setting");
        let result = sqlx::query_as::<_, SettingEntity>(
            r#"
            SELECT key, value, updated_at
            FROM settings
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert or replace a setting value.
    pub async fn upsert(&self, key: &str, value: &str) -> Result<SettingEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_setting");
        let result = sqlx::query_as::<_, SettingEntity>(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            RETURNING key, value, updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Get all settings ordered by key.
    pub async fn list_all(&self) -> Result<Vec<SettingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_settings");
        let result = sqlx::query_as::<_, SettingEntity>(
            r#"
            SELECT key, value, updated_at
            FROM settings
            ORDER BY key
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
