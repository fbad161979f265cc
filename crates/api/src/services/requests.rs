//! Movie request quota checks and submission.

use chrono::{DateTime, Utc};
use domain::models::User;
use domain::services::{Notification, QuotaSnapshot};
use persistence::entities::{MovieRequestEntity, QuotaWindowEntity};
use persistence::repositories::{MovieRequestRepository, SubmitOutcome};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::middleware::metrics::{record_movie_request_rejected, record_movie_request_submitted};
use crate::services::settings::{SettingsError, SettingsService};

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Request limit reached ({}/{})", .0.count, .0.limit)]
    QuotaExceeded(QuotaSnapshot),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A stored request together with the member's quota right after it.
#[derive(Debug, Clone)]
pub struct Submission {
    pub request: MovieRequestEntity,
    pub snapshot: QuotaSnapshot,
}

pub struct MovieRequestService {
    repo: MovieRequestRepository,
    settings: SettingsService,
    operator_email: String,
}

impl MovieRequestService {
    pub fn new(pool: PgPool, settings: SettingsService, operator_email: &str) -> Self {
        Self {
            repo: MovieRequestRepository::new(pool),
            settings,
            operator_email: operator_email.to_string(),
        }
    }

    /// Quota state of `user_id` at `now`. Never writes.
    pub async fn limit_status(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<QuotaSnapshot, RequestError> {
        let limit = self.settings.request_limit().await?;
        let window = self.repo.quota_window(user_id, now).await?;
        Ok(snapshot(&window, limit, now))
    }

    /// Store a new pending request if the member is under the ceiling.
    ///
    /// `title` and `message` must already be trimmed. The quota is checked
    /// again inside the insert transaction, so a stale client view cannot
    /// push the member over the limit.
    pub async fn submit(
        &self,
        user: &User,
        title: &str,
        message: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Submission, RequestError> {
        let limit = self.settings.request_limit().await?;
        let notification =
            Notification::movie_request_submitted(&self.operator_email, &user.email, title, message);

        let outcome = self
            .repo
            .create_within_quota(user.id, title, message, limit, now, &notification)
            .await?;

        match outcome {
            SubmitOutcome::Accepted { request, window } => {
                record_movie_request_submitted();
                info!(
                    user_id = %user.id,
                    request_id = %request.id,
                    count = window.count,
                    limit,
                    "Movie request submitted"
                );
                Ok(Submission {
                    request,
                    snapshot: snapshot(&window, limit, now),
                })
            }
            SubmitOutcome::QuotaExceeded { window } => {
                record_movie_request_rejected();
                let snapshot = snapshot(&window, limit, now);
                warn!(
                    user_id = %user.id,
                    count = snapshot.count,
                    limit,
                    next_available_at = ?snapshot.next_available_at,
                    "Movie request rejected, quota exhausted"
                );
                Err(RequestError::QuotaExceeded(snapshot))
            }
        }
    }
}

fn snapshot(window: &QuotaWindowEntity, limit: i64, now: DateTime<Utc>) -> QuotaSnapshot {
    QuotaSnapshot::compute(window.count, limit, window.oldest, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_snapshot_from_full_window() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let window = QuotaWindowEntity {
            count: 2,
            oldest: Some(now - Duration::hours(11)),
        };
        let s = snapshot(&window, 2, now);
        assert!(!s.can_request());
        assert_eq!(s.next_available_at, Some(now + Duration::hours(1)));
    }

    #[test]
    fn test_snapshot_from_empty_window() {
        let now = Utc::now();
        let window = QuotaWindowEntity {
            count: 0,
            oldest: None,
        };
        let s = snapshot(&window, 2, now);
        assert!(s.can_request());
        assert_eq!(s.next_available_at, None);
    }

    #[test]
    fn test_quota_error_message() {
        let err = RequestError::QuotaExceeded(QuotaSnapshot {
            count: 2,
            limit: 2,
            next_available_at: None,
        });
        assert_eq!(err.to_string(), "Request limit reached (2/2)");
    }
}
