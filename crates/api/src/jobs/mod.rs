//! Background job scheduler and job implementations.

mod email_outbox;
mod pool_metrics;
mod rate_limit_cleanup;
mod scheduler;
mod subscription_sweep;

pub use email_outbox::EmailOutboxJob;
pub use pool_metrics::PoolMetricsJob;
pub use rate_limit_cleanup::RateLimitCleanupJob;
pub use scheduler::JobScheduler;
pub use subscription_sweep::SubscriptionSweepJob;
