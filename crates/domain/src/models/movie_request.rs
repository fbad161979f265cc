//! Movie request domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Longest accepted title, in characters.
pub const MAX_TITLE_LEN: u64 = 200;

/// Longest accepted free-text message, in characters.
pub const MAX_MESSAGE_LEN: u64 = 2000;

/// Review state of a movie request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovieRequestStatus {
    Pending,
    Approved,
    #[serde(alias = "denied")]
    Rejected,
}

impl MovieRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieRequestStatus::Pending => "pending",
            MovieRequestStatus::Approved => "approved",
            MovieRequestStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for MovieRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MovieRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(MovieRequestStatus::Pending),
            "approved" => Ok(MovieRequestStatus::Approved),
            "rejected" | "denied" => Ok(MovieRequestStatus::Rejected),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

/// A member's request for a title to be added to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: Option<String>,
    pub status: MovieRequestStatus,
    pub created_at: DateTime<Utc>,
}

fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

// Limits apply to the stored (trimmed) value.
fn validate_title(title: &str) -> Result<(), ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(validation_error("required", "Title is required"));
    }
    if title.chars().count() as u64 > MAX_TITLE_LEN {
        return Err(validation_error(
            "length",
            "Title must be at most 200 characters",
        ));
    }
    Ok(())
}

fn validate_message(message: &str) -> Result<(), ValidationError> {
    if message.trim().chars().count() as u64 > MAX_MESSAGE_LEN {
        return Err(validation_error(
            "length",
            "Message must be at most 2000 characters",
        ));
    }
    Ok(())
}

/// Body of `POST /api/requests`.
///
/// A missing or null title deserializes to an empty string so it is
/// reported as a validation failure rather than a body parse error.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovieRequestRequest {
    #[serde(default, deserialize_with = "shared::validation::null_as_empty")]
    #[validate(custom(function = "validate_title"))]
    pub title: String,

    #[validate(custom(function = "validate_message"))]
    pub message: Option<String>,
}

impl CreateMovieRequestRequest {
    /// Trimmed title; `None` when blank.
    pub fn normalized_title(&self) -> Option<String> {
        shared::validation::trimmed_non_empty(&self.title)
    }

    /// Trimmed message; blank collapses to `None`.
    pub fn normalized_message(&self) -> Option<String> {
        shared::validation::trim_optional(self.message.as_deref())
    }
}

/// Response of `GET /api/requests/limit-status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitStatusResponse {
    pub count: i64,
    pub limit: i64,
    pub can_request: bool,
    pub next_available_at: Option<DateTime<Utc>>,
}

/// Response of a successful `POST /api/requests`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMovieRequestResponse {
    pub ok: bool,
    pub count: i64,
    pub limit: i64,
    pub next_available_at: Option<DateTime<Utc>>,
}

/// A request as shown to its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRequestItem {
    pub id: Uuid,
    pub title: String,
    pub message: Option<String>,
    pub status: MovieRequestStatus,
    pub created_at: DateTime<Utc>,
}

impl From<MovieRequest> for MovieRequestItem {
    fn from(request: MovieRequest) -> Self {
        Self {
            id: request.id,
            title: request.title,
            message: request.message,
            status: request.status,
            created_at: request.created_at,
        }
    }
}

/// Response of `GET /api/requests/my`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyMovieRequestsResponse {
    pub requests: Vec<MovieRequestItem>,
}

/// A request as shown on the admin board, with the requester's email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminMovieRequestItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub title: String,
    pub message: Option<String>,
    pub status: MovieRequestStatus,
    pub created_at: DateTime<Utc>,
}

/// Response of `GET /api/admin/requests`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminMovieRequestsResponse {
    pub requests: Vec<AdminMovieRequestItem>,
}

/// Body of `PUT /api/admin/requests/:id`.
///
/// Kept as a string so an unknown status is a 400 with a clear message.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMovieRequestStatusRequest {
    pub status: String,
}

impl UpdateMovieRequestStatusRequest {
    pub fn parsed_status(&self) -> Result<MovieRequestStatus, String> {
        self.status.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_and_parse() {
        assert_eq!(MovieRequestStatus::Pending.to_string(), "pending");
        assert_eq!(MovieRequestStatus::Rejected.to_string(), "rejected");
        assert_eq!(
            "Approved".parse::<MovieRequestStatus>().unwrap(),
            MovieRequestStatus::Approved
        );
        assert!("archived".parse::<MovieRequestStatus>().is_err());
    }

    #[test]
    fn test_denied_is_alias_of_rejected() {
        assert_eq!(
            "denied".parse::<MovieRequestStatus>().unwrap(),
            MovieRequestStatus::Rejected
        );
        let status: MovieRequestStatus = serde_json::from_str("\"denied\"").unwrap();
        assert_eq!(status, MovieRequestStatus::Rejected);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"rejected\"");
    }

    #[test]
    fn test_create_request_validation() {
        let ok = CreateMovieRequestRequest {
            title: "Stalker".into(),
            message: Some("Tarkovsky, 1979".into()),
        };
        assert!(ok.validate().is_ok());

        let blank = CreateMovieRequestRequest {
            title: "   ".into(),
            message: None,
        };
        let errors = blank.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));

        let long = CreateMovieRequestRequest {
            title: "x".repeat(MAX_TITLE_LEN as usize + 1),
            message: None,
        };
        assert!(long.validate().is_err());

        let long_message = CreateMovieRequestRequest {
            title: "Heat".into(),
            message: Some("y".repeat(MAX_MESSAGE_LEN as usize + 1)),
        };
        assert!(long_message.validate().is_err());
    }

    #[test]
    fn test_missing_title_deserializes_as_blank() {
        let body: CreateMovieRequestRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(body.title, "");
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_null_title_deserializes_as_blank() {
        let body: CreateMovieRequestRequest =
            serde_json::from_str(r#"{"title":null,"message":"hi"}"#).unwrap();
        assert_eq!(body.title, "");
        let errors = body.validate().unwrap_err();
        let title_errors = &errors.field_errors()["title"];
        assert_eq!(
            title_errors[0].message.as_deref(),
            Some("Title is required")
        );
    }

    #[test]
    fn test_length_limits_apply_after_trimming() {
        let padded_title = CreateMovieRequestRequest {
            title: format!("  {}  ", "t".repeat(MAX_TITLE_LEN as usize)),
            message: Some(format!("\n{}\n", "m".repeat(MAX_MESSAGE_LEN as usize))),
        };
        assert!(padded_title.validate().is_ok());
        assert_eq!(
            padded_title.normalized_title().map(|t| t.chars().count()),
            Some(MAX_TITLE_LEN as usize)
        );
    }

    #[test]
    fn test_title_limit_counts_characters() {
        let accented = CreateMovieRequestRequest {
            title: "é".repeat(MAX_TITLE_LEN as usize),
            message: None,
        };
        assert!(accented.validate().is_ok());
    }

    #[test]
    fn test_normalization() {
        let body = CreateMovieRequestRequest {
            title: "  Paprika ".into(),
            message: Some("   ".into()),
        };
        assert_eq!(body.normalized_title().as_deref(), Some("Paprika"));
        assert_eq!(body.normalized_message(), None);
    }

    #[test]
    fn test_limit_status_serializes_null_next_available() {
        let status = LimitStatusResponse {
            count: 0,
            limit: 2,
            can_request: true,
            next_available_at: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["canRequest"], true);
        assert!(json["nextAvailableAt"].is_null());
        assert!(json.as_object().unwrap().contains_key("nextAvailableAt"));
    }
}
