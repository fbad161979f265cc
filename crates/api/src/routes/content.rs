//! Content catalog routes.
//!
//! Listing is open to any signed-in member; video paths are only returned
//! to members with an active subscription.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use domain::models::{
    CategoriesResponse, Content, ContentFilter, ContentItem, ContentListResponse,
};
use persistence::repositories::{ContentRepository, SubscriptionRepository};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;

/// Whether the member may watch catalog videos today.
pub(crate) async fn has_access(state: &AppState, user_id: Uuid) -> Result<bool, ApiError> {
    let today = Utc::now().date_naive();
    let current = SubscriptionRepository::new(state.pool.clone())
        .find_current(user_id, today)
        .await?;
    Ok(current.is_some())
}

/// GET /api/content
///
/// Catalog newest first, optionally filtered with `?category=`.
pub async fn list_content(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(filter): Query<ContentFilter>,
) -> Result<Json<ContentListResponse>, ApiError> {
    let can_access = has_access(&state, user.id).await?;
    let category = filter.category();

    let content = ContentRepository::new(state.pool.clone())
        .list_for_member(user.id, category.as_deref())
        .await?
        .into_iter()
        .map(|row| {
            ContentItem::for_member(Content::from(row.content), can_access, row.is_favorite)
        })
        .collect();

    Ok(Json(ContentListResponse { content }))
}

/// GET /api/content/categories
pub async fn categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = ContentRepository::new(state.pool.clone())
        .categories()
        .await?;
    Ok(Json(CategoriesResponse { categories }))
}

/// GET /api/content/:id
pub async fn get_content(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(content_id): Path<Uuid>,
) -> Result<Json<ContentItem>, ApiError> {
    let row = ContentRepository::new(state.pool.clone())
        .find_for_member(user.id, content_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Content not found".to_string()))?;
    let can_access = has_access(&state, user.id).await?;

    Ok(Json(ContentItem::for_member(
        Content::from(row.content),
        can_access,
        row.is_favorite,
    )))
}
