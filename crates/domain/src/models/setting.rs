//! Platform setting models.
//!
//! Settings are stored as text key/value pairs. The only setting with
//! business meaning today is the movie request ceiling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

/// Storage key of the per-window movie request ceiling.
pub const REQUEST_LIMIT_KEY: &str = "request_limit_per_12h";

/// Ceiling used when the setting is missing or unparsable.
pub const DEFAULT_REQUEST_LIMIT: i64 = 2;

/// Smallest ceiling an administrator may set.
pub const MIN_REQUEST_LIMIT: i64 = 1;

/// Largest ceiling an administrator may set.
pub const MAX_REQUEST_LIMIT: i64 = 10;

/// Parses a stored request limit, falling back to the default.
///
/// Non-positive values are treated as unparsable.
pub fn parse_request_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_REQUEST_LIMIT)
}

/// Checks an admin-supplied request limit against the allowed range.
pub fn validate_request_limit(value: i64) -> Result<(), String> {
    if (MIN_REQUEST_LIMIT..=MAX_REQUEST_LIMIT).contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Request limit must be between {} and {}",
            MIN_REQUEST_LIMIT, MAX_REQUEST_LIMIT
        ))
    }
}

/// A stored setting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Response of `GET /api/admin/settings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub settings: BTreeMap<String, String>,
}

/// Body of `PUT /api/admin/settings/request-limit`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRequestLimitRequest {
    #[validate(range(min = 1, max = 10, message = "Request limit must be between 1 and 10"))]
    pub value: i64,
}

/// Response of `PUT /api/admin/settings/request-limit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequestLimitResponse {
    pub ok: bool,
    pub value: i64,
}
