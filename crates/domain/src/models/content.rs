//! Content catalog, watchlist and recommendation models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Number of titles returned by the recommendations endpoint.
pub const RECOMMENDATION_LIMIT: i64 = 8;

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub thumbnail_path: Option<String>,
    pub video_1080_path: Option<String>,
    pub video_4k_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A catalog entry as shown to a member.
///
/// Video paths are only filled in for members with an active subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub thumbnail_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub can_access: bool,
    pub is_favorite: bool,
    pub video_1080_path: Option<String>,
    pub video_4k_path: Option<String>,
}

impl ContentItem {
    pub fn for_member(content: Content, can_access: bool, is_favorite: bool) -> Self {
        let (video_1080_path, video_4k_path) = if can_access {
            (content.video_1080_path, content.video_4k_path)
        } else {
            (None, None)
        };
        Self {
            id: content.id,
            title: content.title,
            description: content.description,
            category: content.category,
            thumbnail_path: content.thumbnail_path,
            created_at: content.created_at,
            can_access,
            is_favorite,
            video_1080_path,
            video_4k_path,
        }
    }
}

/// Response of `GET /api/content` and `GET /api/users/watchlist`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentListResponse {
    pub content: Vec<ContentItem>,
}

/// Response of `GET /api/content/categories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

/// Query string of `GET /api/content`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentFilter {
    pub category: Option<String>,
}

impl ContentFilter {
    /// Trimmed category; blank means no filter.
    pub fn category(&self) -> Option<String> {
        shared::validation::trim_optional(self.category.as_deref())
    }
}

/// Response of `GET /api/admin/content`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminContentResponse {
    pub content: Vec<Content>,
}

fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Title and category required".into());
        return Err(err);
    }
    Ok(())
}

/// Body of `POST /api/admin/content`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentRequest {
    #[serde(default, deserialize_with = "shared::validation::null_as_empty")]
    #[validate(custom(function = "validate_required"))]
    pub title: String,

    pub description: Option<String>,

    #[serde(default, deserialize_with = "shared::validation::null_as_empty")]
    #[validate(custom(function = "validate_required"))]
    pub category: String,

    pub thumbnail_path: Option<String>,
    pub video_1080_path: Option<String>,
    pub video_4k_path: Option<String>,
}

/// Response of `POST /api/admin/content`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContentResponse {
    pub id: Uuid,
}

/// Body of `PUT /api/admin/content/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub thumbnail_path: Option<String>,
    pub video_1080_path: Option<String>,
    pub video_4k_path: Option<String>,
}

impl UpdateContentRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.thumbnail_path.is_none()
            && self.video_1080_path.is_none()
            && self.video_4k_path.is_none()
    }

    /// Title and category may be changed but not blanked.
    pub fn check(&self) -> Result<(), String> {
        let blanked = [&self.title, &self.category]
            .into_iter()
            .flatten()
            .any(|value| value.trim().is_empty());
        if blanked {
            return Err("Title and category required".to_string());
        }
        Ok(())
    }
}

/// Body of `POST /api/users/watchlist`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToWatchlistRequest {
    pub content_id: Option<Uuid>,
}

/// A recommended title.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationItem {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub thumbnail_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Content> for RecommendationItem {
    fn from(content: Content) -> Self {
        Self {
            id: content.id,
            title: content.title,
            category: content.category,
            thumbnail_path: content.thumbnail_path,
            created_at: content.created_at,
        }
    }
}

/// Response of `GET /api/users/recommendations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub genre: Option<String>,
    pub content: Vec<RecommendationItem>,
}

fn validate_genre(genre: &str) -> Result<(), ValidationError> {
    if genre.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Genre required".into());
        return Err(err);
    }
    Ok(())
}

/// Body of `PUT /api/users/favorite-genre`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FavoriteGenreRequest {
    #[serde(default, deserialize_with = "shared::validation::null_as_empty")]
    #[validate(custom(function = "validate_genre"))]
    pub genre: String,
}

/// Response of `PUT /api/users/favorite-genre`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteGenreResponse {
    pub ok: bool,
    pub favorite_genre: String,
}
