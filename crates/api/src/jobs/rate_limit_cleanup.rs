//! Background job that drops idle auth rate-limit buckets.

use std::sync::Arc;

use tracing::debug;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::AuthRateLimiter;

/// Seconds between cleanup passes.
const CLEANUP_INTERVAL_SECS: u64 = 30;

/// Keeps the per-IP limiter from growing with every address ever seen.
pub struct RateLimitCleanupJob {
    limiter: Arc<AuthRateLimiter>,
}

impl RateLimitCleanupJob {
    pub fn new(limiter: Arc<AuthRateLimiter>) -> Self {
        Self { limiter }
    }
}

#[async_trait::async_trait]
impl Job for RateLimitCleanupJob {
    fn name(&self) -> &'static str {
        "rate_limit_cleanup"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(CLEANUP_INTERVAL_SECS)
    }

    async fn execute(&self) -> Result<(), String> {
        let before = self.limiter.tracked_clients();
        self.limiter.retain_recent();
        let after = self.limiter.tracked_clients();
        debug!(before, after, "Auth rate limiter cleaned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cleanup_keeps_active_buckets() {
        let limiter = Arc::new(AuthRateLimiter::new(1).unwrap());
        limiter.check("203.0.113.9").ok();

        let job = RateLimitCleanupJob::new(limiter.clone());
        assert_eq!(job.name(), "rate_limit_cleanup");
        assert_eq!(job.frequency().duration().as_secs(), CLEANUP_INTERVAL_SECS);

        job.execute().await.unwrap();
        assert_eq!(limiter.tracked_clients(), 1);
        assert!(limiter.check("203.0.113.9").is_err());
    }
}
