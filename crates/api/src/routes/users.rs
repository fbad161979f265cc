//! Member account endpoints: dashboard, deletion request, favorite genre,
//! recommendations and the watchlist.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use domain::models::{
    AccountStatus, AddToWatchlistRequest, Content, ContentItem, ContentListResponse,
    FavoriteGenreRequest, FavoriteGenreResponse, MemberDashboardResponse, MovieRequestStatus,
    RecommendationItem, RecommendationsResponse, Subscription, User, RECOMMENDATION_LIMIT,
};
use domain::services::Notification;
use persistence::repositories::{
    ContentRepository, MovieRequestRepository, SubscriptionRepository, UserRepository,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::routes::auth::OkResponse;
use crate::routes::content::has_access;

/// Flag the caller's account for deletion and alert the operator.
///
/// POST /api/users/request-delete
pub async fn request_delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<OkResponse>, ApiError> {
    let notification =
        Notification::deletion_requested(&state.config.email.operator_email, &user.email);

    UserRepository::new(state.pool.clone())
        .set_status(user.id, AccountStatus::PendingDeletion, Some(&notification))
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(user_id = %user.id, "Account deletion requested");
    Ok(Json(OkResponse { ok: true }))
}

/// Subscription, profile and request counters for the caller.
///
/// GET /api/users/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<MemberDashboardResponse>, ApiError> {
    let today = Utc::now().date_naive();

    let subscription = SubscriptionRepository::new(state.pool.clone())
        .find_current(user.id, today)
        .await?
        .map(Subscription::from);

    let requests = MovieRequestRepository::new(state.pool.clone());
    let approved_requests = requests
        .count_by_status(user.id, MovieRequestStatus::Approved)
        .await?;
    let rejected_requests = requests
        .count_by_status(user.id, MovieRequestStatus::Rejected)
        .await?;

    Ok(Json(build_dashboard(
        subscription.as_ref(),
        today,
        user,
        approved_requests,
        rejected_requests,
    )))
}

fn build_dashboard(
    subscription: Option<&Subscription>,
    today: chrono::NaiveDate,
    user: User,
    approved_requests: i64,
    rejected_requests: i64,
) -> MemberDashboardResponse {
    MemberDashboardResponse {
        has_subscription: subscription.is_some(),
        plan: subscription.map(|s| s.plan.clone()),
        start_date: subscription.map(|s| s.start_date),
        expiry_date: subscription.map(|s| s.expiry_date),
        remaining_days: subscription.map_or(0, |s| s.remaining_days(today)),
        full_name: Some(user.full_name).filter(|name| !name.is_empty()),
        telegram_username: user.telegram_username,
        favorite_genre: user.favorite_genre,
        approved_requests,
        rejected_requests,
    }
}

/// PUT /api/users/favorite-genre
pub async fn set_favorite_genre(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<FavoriteGenreRequest>,
) -> Result<Json<FavoriteGenreResponse>, ApiError> {
    request.validate()?;
    let genre = request.genre.trim();

    UserRepository::new(state.pool.clone())
        .set_favorite_genre(user.id, genre)
        .await?;

    info!(user_id = %user.id, genre, "Favorite genre set");
    Ok(Json(FavoriteGenreResponse {
        ok: true,
        favorite_genre: genre.to_string(),
    }))
}

/// Newest titles in the caller's favorite genre.
///
/// GET /api/users/recommendations
pub async fn recommendations(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    let Some(genre) = user.favorite_genre else {
        return Ok(Json(RecommendationsResponse {
            genre: None,
            content: Vec::new(),
        }));
    };

    let content = ContentRepository::new(state.pool.clone())
        .latest_in_category(&genre, RECOMMENDATION_LIMIT)
        .await?
        .into_iter()
        .map(|row| RecommendationItem::from(Content::from(row)))
        .collect();

    Ok(Json(RecommendationsResponse {
        genre: Some(genre),
        content,
    }))
}

/// GET /api/users/watchlist
pub async fn watchlist(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ContentListResponse>, ApiError> {
    let can_access = has_access(&state, user.id).await?;
    let content = ContentRepository::new(state.pool.clone())
        .watchlist(user.id)
        .await?
        .into_iter()
        .map(|row| ContentItem::for_member(Content::from(row), can_access, true))
        .collect();

    Ok(Json(ContentListResponse { content }))
}

/// POST /api/users/watchlist
pub async fn add_to_watchlist(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<AddToWatchlistRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let content_id = request
        .content_id
        .ok_or_else(|| ApiError::Validation("contentId required".to_string()))?;

    let found = ContentRepository::new(state.pool.clone())
        .add_to_watchlist(user.id, content_id)
        .await?;
    if !found {
        return Err(ApiError::NotFound("Content not found".to_string()));
    }

    Ok(Json(OkResponse { ok: true }))
}

/// DELETE /api/users/watchlist/:content_id
pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(content_id): Path<Uuid>,
) -> Result<Json<OkResponse>, ApiError> {
    ContentRepository::new(state.pool.clone())
        .remove_from_watchlist(user.id, content_id)
        .await?;
    Ok(Json(OkResponse { ok: true }))
}
