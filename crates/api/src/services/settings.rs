//! Platform settings with a process-wide request limit cache.
//!
//! The request limit is read on every quota check, so it is cached in
//! memory. The cache is filled at startup (or on first use) and dropped
//! whenever an administrator writes a new value.

use std::collections::BTreeMap;
use std::sync::Arc;

use domain::models::{
    parse_request_limit, validate_request_limit, DEFAULT_REQUEST_LIMIT, REQUEST_LIMIT_KEY,
};
use persistence::repositories::SettingRepository;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{0}")]
    InvalidValue(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Shared handle to platform settings.
#[derive(Clone)]
pub struct SettingsService {
    repo: SettingRepository,
    request_limit: Arc<RwLock<Option<i64>>>,
}

impl SettingsService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: SettingRepository::new(pool),
            request_limit: Arc::new(RwLock::new(None)),
        }
    }

    /// Fill the cache ahead of the first request.
    pub async fn preload(&self) -> Result<i64, SettingsError> {
        let limit = self.request_limit().await?;
        info!(request_limit = limit, "Settings loaded");
        Ok(limit)
    }

    /// Current per-user request ceiling for the 12 hour window.
    ///
    /// Falls back to the default when the row is missing or malformed.
    pub async fn request_limit(&self) -> Result<i64, SettingsError> {
        if let Some(limit) = *self.request_limit.read().await {
            return Ok(limit);
        }

        let mut cached = self.request_limit.write().await;
        // Another task may have loaded it while we waited for the lock.
        if let Some(limit) = *cached {
            return Ok(limit);
        }

        let stored = self.repo.get(REQUEST_LIMIT_KEY).await?;
        let limit = parse_request_limit(stored.as_ref().map(|s| s.value.as_str()));
        if stored.is_none() {
            debug!(default = DEFAULT_REQUEST_LIMIT, "Request limit not set, using default");
        }
        *cached = Some(limit);
        Ok(limit)
    }

    /// Persist a new request limit and invalidate the cache.
    pub async fn set_request_limit(&self, value: i64) -> Result<i64, SettingsError> {
        validate_request_limit(value).map_err(SettingsError::InvalidValue)?;

        self.repo
            .upsert(REQUEST_LIMIT_KEY, &value.to_string())
            .await?;
        self.invalidate().await;

        info!(request_limit = value, "Request limit updated");
        Ok(value)
    }

    /// Every stored setting, keyed by name.
    pub async fn all(&self) -> Result<BTreeMap<String, String>, SettingsError> {
        let settings = self.repo.list_all().await?;
        Ok(settings.into_iter().map(|s| (s.key, s.value)).collect())
    }

    pub async fn invalidate(&self) {
        *self.request_limit.write().await = None;
    }

    #[cfg(test)]
    async fn cached_request_limit(&self) -> Option<i64> {
        *self.request_limit.read().await
    }
}
