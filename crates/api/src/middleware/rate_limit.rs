//! Rate limiting middleware for the auth endpoints.
//!
//! Login, registration and recovery attempts are limited per client IP.
//! Requests whose address cannot be determined share one bucket. Idle
//! buckets are dropped by a periodic cleanup job.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};
use serde_json::json;
use std::num::NonZeroU32;

use crate::app::AppState;
use crate::extractors::client_ip;

const UNKNOWN_CLIENT: &str = "unknown";

/// Per-IP limiter shared across all requests.
pub struct AuthRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    limit_per_minute: u32,
}

impl AuthRateLimiter {
    /// Returns `None` when `limit_per_minute` is zero (limiting disabled).
    pub fn new(limit_per_minute: u32) -> Option<Self> {
        let per_minute = NonZeroU32::new(limit_per_minute)?;
        Some(Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            limit_per_minute,
        })
    }

    pub fn limit_per_minute(&self) -> u32 {
        self.limit_per_minute
    }

    /// Number of clients currently holding a bucket.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Drops buckets that have fully refilled, so memory tracks only
    /// recently active clients.
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Check if a request from `client` should be allowed.
    /// Returns Err with retry_after seconds if rate limited.
    pub fn check(&self, client: &str) -> Result<(), u64> {
        match self.limiter.check_key(&client.to_string()) {
            Ok(_) => Ok(()),
            Err(not_until) => {
                let wait_time = not_until.wait_time_from(DefaultClock::default().now());
                // Minimum 1 second
                Err(wait_time.as_secs().max(1))
            }
        }
    }
}

impl std::fmt::Debug for AuthRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRateLimiter")
            .field("limit_per_minute", &self.limit_per_minute)
            .field("tracked_clients", &self.tracked_clients())
            .finish()
    }
}

/// Middleware that applies the per-IP auth limit.
pub async fn auth_rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(ref limiter) = state.auth_rate_limiter {
        let client = client_ip(
            req.headers(),
            req.extensions(),
            state.config.security.trust_forwarded_for,
        )
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

        if let Err(retry_after) = limiter.check(&client) {
            tracing::warn!(client = %client, retry_after, "Auth rate limit exceeded");
            return rate_limited_response(limiter.limit_per_minute(), retry_after);
        }
    }

    next.run(req).await
}

/// Create a rate limited response with proper headers and body.
fn rate_limited_response(limit: u32, retry_after: u64) -> Response {
    let body = json!({
        "error": "rate_limit_exceeded",
        "message": format!("Rate limit of {} requests/minute exceeded", limit),
        "retryAfter": retry_after
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));

    response
}
