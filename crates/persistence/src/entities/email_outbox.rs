//! Email outbox entity definitions.
//!
//! Maps to the email_outbox table used for durable, retried delivery.

use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for the email_outbox table.
#[derive(Debug, Clone, FromRow)]
pub struct EmailOutboxEntity {
    pub id: Uuid,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub next_attempt_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

/// Outbox status values.
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_SENT: &str = "sent";
pub const STATUS_FAILED: &str = "failed";

/// Attempts after which a message is given up on.
pub const MAX_DELIVERY_ATTEMPTS: i32 = 5;

/// Upper bound on the retry delay, in minutes.
pub const MAX_BACKOFF_MINUTES: i64 = 60;

/// How long a claimed row stays invisible to other workers.
pub const CLAIM_LEASE_MINUTES: i64 = 5;

/// Delay before the next attempt once `attempts` deliveries have failed.
///
/// 1, 2, 4, 8 ... minutes, capped at [`MAX_BACKOFF_MINUTES`].
pub fn retry_backoff(attempts: i32) -> Duration {
    let exponent = attempts.saturating_sub(1).clamp(0, 16) as u32;
    let minutes = 1i64
        .checked_shl(exponent)
        .unwrap_or(MAX_BACKOFF_MINUTES)
        .min(MAX_BACKOFF_MINUTES);
    Duration::minutes(minutes)
}

/// Row state after a failed delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureTransition {
    /// Retry once the delay has passed.
    Retry { attempts: i32, delay: Duration },
    /// Attempts exhausted; the row is parked as failed.
    GiveUp { attempts: i32 },
}

impl FailureTransition {
    /// Decides what happens to a row that has failed `previous_attempts`
    /// times before this one.
    pub fn after(previous_attempts: i32) -> Self {
        let attempts = previous_attempts.saturating_add(1);
        if attempts >= MAX_DELIVERY_ATTEMPTS {
            FailureTransition::GiveUp { attempts }
        } else {
            FailureTransition::Retry {
                attempts,
                delay: retry_backoff(attempts),
            }
        }
    }
}
