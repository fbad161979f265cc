//! Movie request entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::MovieRequestStatus;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Database row mapping for the movie_requests table.
#[derive(Debug, Clone, FromRow)]
pub struct MovieRequestEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Movie request joined with the requester's email, for the admin board.
#[derive(Debug, Clone, FromRow)]
pub struct MovieRequestWithEmailEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub title: String,
    pub message: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Requests inside a member's quota window.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct QuotaWindowEntity {
    pub count: i64,
    pub oldest: Option<DateTime<Utc>>,
}

fn parse_status(raw: &str) -> MovieRequestStatus {
    // The column carries a CHECK constraint, so this only falls back on
    // rows written before it existed.
    MovieRequestStatus::from_str(raw).unwrap_or(MovieRequestStatus::Pending)
}

impl From<MovieRequestEntity> for domain::models::MovieRequest {
    fn from(entity: MovieRequestEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            title: entity.title,
            message: entity.message,
            status: parse_status(&entity.status),
            created_at: entity.created_at,
        }
    }
}

impl From<MovieRequestWithEmailEntity> for domain::models::AdminMovieRequestItem {
    fn from(entity: MovieRequestWithEmailEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            user_email: entity.user_email,
            title: entity.title,
            message: entity.message,
            status: parse_status(&entity.status),
            created_at: entity.created_at,
        }
    }
}
