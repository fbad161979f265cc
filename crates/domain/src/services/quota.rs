//! Rolling-window movie request quota.
//!
//! A member may have at most `limit` requests whose `created_at` falls in
//! the trailing [`QUOTA_WINDOW_HOURS`] window. The window start is
//! inclusive: a request exactly twelve hours old still counts.

use chrono::{DateTime, Duration, Utc};

use crate::models::LimitStatusResponse;

/// Length of the trailing quota window.
pub const QUOTA_WINDOW_HOURS: i64 = 12;

/// Length of the trailing quota window as a duration.
pub fn quota_window() -> Duration {
    Duration::hours(QUOTA_WINDOW_HOURS)
}

/// Earliest `created_at` still inside the window ending at `now`.
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - quota_window()
}

/// A member's quota state at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaSnapshot {
    pub count: i64,
    pub limit: i64,
    pub next_available_at: Option<DateTime<Utc>>,
}

impl QuotaSnapshot {
    /// Builds a snapshot from the in-window request count and the oldest
    /// in-window request time.
    ///
    /// `next_available_at` is only set once the ceiling is reached, and is
    /// the instant the oldest counted request leaves the window. When the
    /// count is at the ceiling but no oldest time is known the value is
    /// left unset.
    pub fn compute(
        count: i64,
        limit: i64,
        oldest_in_window: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let next_available_at = if count >= limit {
            oldest_in_window
                .filter(|oldest| *oldest >= window_start(now))
                .map(|oldest| oldest + quota_window())
        } else {
            None
        };

        Self {
            count,
            limit,
            next_available_at,
        }
    }

    pub fn can_request(&self) -> bool {
        self.count < self.limit
    }
}

impl From<QuotaSnapshot> for LimitStatusResponse {
    fn from(snapshot: QuotaSnapshot) -> Self {
        Self {
            count: snapshot.count,
            limit: snapshot.limit,
            can_request: snapshot.can_request(),
            next_available_at: snapshot.next_available_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 20, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_no_requests() {
        let snapshot = QuotaSnapshot::compute(0, 2, None, now());
        assert_eq!(snapshot.count, 0);
        assert!(snapshot.can_request());
        assert_eq!(snapshot.next_available_at, None);
    }

    #[test]
    fn test_under_limit_has_no_next_available() {
        let oldest = now() - Duration::hours(5);
        let snapshot = QuotaSnapshot::compute(1, 2, Some(oldest), now());
        assert!(snapshot.can_request());
        assert_eq!(snapshot.next_available_at, None);
    }

    #[test]
    fn test_at_limit_next_available_is_oldest_plus_window() {
        // requests at t-1h and t-11h, limit 2
        let t = now();
        let snapshot = QuotaSnapshot::compute(2, 2, Some(t - Duration::hours(11)), t);
        assert!(!snapshot.can_request());
        assert_eq!(snapshot.next_available_at, Some(t + Duration::hours(1)));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let t = now();
        let oldest = t - Duration::hours(12);
        assert_eq!(window_start(t), oldest);
        let snapshot = QuotaSnapshot::compute(2, 2, Some(oldest), t);
        assert_eq!(snapshot.next_available_at, Some(t));
    }

    #[test]
    fn test_oldest_outside_window_is_ignored() {
        let t = now();
        let snapshot = QuotaSnapshot::compute(2, 2, Some(t - Duration::hours(13)), t);
        assert_eq!(snapshot.next_available_at, None);
    }

    #[test]
    fn test_over_limit_after_ceiling_lowered() {
        let t = now();
        let oldest = t - Duration::hours(3);
        let snapshot = QuotaSnapshot::compute(4, 1, Some(oldest), t);
        assert!(!snapshot.can_request());
        assert_eq!(snapshot.next_available_at, Some(oldest + Duration::hours(12)));
    }

    #[test]
    fn test_into_limit_status_response() {
        let t = now();
        let response: LimitStatusResponse =
            QuotaSnapshot::compute(2, 2, Some(t - Duration::hours(11)), t).into();
        assert_eq!(response.count, 2);
        assert_eq!(response.limit, 2);
        assert!(!response.can_request);
        assert_eq!(response.next_available_at, Some(t + Duration::hours(1)));
    }
}
