//! Admin board API routes.
//!
//! Every handler requires an authenticated admin session.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use domain::models::{
    expiry_date_for, ActiveSubscriptionItem, ActiveSubscriptionsResponse, AdminContentResponse,
    AdminGrantSubscriptionRequest, AdminMovieRequestItem, AdminMovieRequestsResponse,
    AdminUpdateSubscriptionRequest, AdminUserItem, AdminUsersResponse, Content,
    CreateContentRequest, CreateContentResponse, LoginHistoryItem, LoginHistoryResponse,
    SettingsResponse, SubscriptionSummary, UpdateContentRequest, UpdateMovieRequestStatusRequest,
    UpdateRequestLimitRequest, UpdateRequestLimitResponse,
};
use domain::services::Notification;
use persistence::repositories::{
    ContentChanges, ContentRepository, MovieRequestRepository, NewContent, NewSubscription,
    SubscriptionRepository, UserRepository,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminUser;
use crate::routes::auth::OkResponse;
use crate::services::settings::SettingsError;

/// Number of entries shown on the login board.
const LOGIN_HISTORY_LIMIT: i64 = 200;

impl From<SettingsError> for ApiError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::InvalidValue(msg) => ApiError::Validation(msg),
            SettingsError::Database(e) => ApiError::from(e),
        }
    }
}

/// Response of `POST /api/admin/subscriptions`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantSubscriptionResponse {
    pub ok: bool,
    pub subscription: SubscriptionSummary,
}

/// GET /api/admin/requests
///
/// All movie requests with the requester's email, newest first.
pub async fn list_requests(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<AdminMovieRequestsResponse>, ApiError> {
    let requests = MovieRequestRepository::new(state.pool.clone())
        .list_all()
        .await?
        .into_iter()
        .map(AdminMovieRequestItem::from)
        .collect();

    Ok(Json(AdminMovieRequestsResponse { requests }))
}

/// PUT /api/admin/requests/:id
pub async fn update_request_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(request_id): Path<Uuid>,
    Json(request): Json<UpdateMovieRequestStatusRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let status = request.parsed_status().map_err(ApiError::Validation)?;

    MovieRequestRepository::new(state.pool.clone())
        .update_status(request_id, status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))?;

    info!(
        admin_id = %admin.id,
        request_id = %request_id,
        status = %status,
        "Movie request status updated"
    );
    Ok(Json(OkResponse { ok: true }))
}

/// GET /api/admin/settings
pub async fn get_settings(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<SettingsResponse>, ApiError> {
    let settings = state.settings.all().await?;
    Ok(Json(SettingsResponse { settings }))
}

/// PUT /api/admin/settings/request-limit
///
/// The new value applies to the next quota check.
pub async fn update_request_limit(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<UpdateRequestLimitRequest>,
) -> Result<Json<UpdateRequestLimitResponse>, ApiError> {
    request.validate()?;

    let value = state.settings.set_request_limit(request.value).await?;
    info!(admin_id = %admin.id, value, "Request limit changed");

    Ok(Json(UpdateRequestLimitResponse { ok: true, value }))
}

/// GET /api/admin/subscriptions
///
/// Active, unexpired subscriptions, soonest expiry first.
pub async fn list_subscriptions(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<ActiveSubscriptionsResponse>, ApiError> {
    let today = Utc::now().date_naive();
    let subscriptions = SubscriptionRepository::new(state.pool.clone())
        .list_active(today)
        .await?
        .into_iter()
        .map(ActiveSubscriptionItem::from)
        .collect();

    Ok(Json(ActiveSubscriptionsResponse { subscriptions }))
}

/// POST /api/admin/subscriptions
///
/// Grants a plan to a member starting today, replacing any active one.
pub async fn grant_subscription(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<AdminGrantSubscriptionRequest>,
) -> Result<Json<GrantSubscriptionResponse>, ApiError> {
    request.validate()?;

    let member = UserRepository::new(state.pool.clone())
        .find_by_id(request.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let start_date = Utc::now().date_naive();
    let expiry_date = expiry_date_for(start_date, request.months)
        .ok_or_else(|| ApiError::Validation("Months must be 1-12".to_string()))?;
    let plan = request.plan.trim();

    let notification =
        Notification::subscription_activated(&member.email, plan, start_date, expiry_date);
    let entity = SubscriptionRepository::new(state.pool.clone())
        .activate(
            &NewSubscription {
                user_id: member.id,
                plan,
                start_date,
                expiry_date,
            },
            None,
            &[notification],
        )
        .await?;

    info!(
        admin_id = %admin.id,
        user_id = %member.id,
        plan = %entity.plan,
        expiry_date = %entity.expiry_date,
        "Subscription granted"
    );

    Ok(Json(GrantSubscriptionResponse {
        ok: true,
        subscription: SubscriptionSummary {
            plan: entity.plan,
            start_date: entity.start_date,
            expiry_date: entity.expiry_date,
        },
    }))
}

/// PUT /api/admin/subscriptions/:user_id
///
/// Overrides expiry and active flag of the member's current subscription.
pub async fn update_subscription(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
    Json(request): Json<AdminUpdateSubscriptionRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let updated = SubscriptionRepository::new(state.pool.clone())
        .update_active(user_id, request.expiry_date, request.is_active)
        .await?;

    if updated == 0 {
        return Err(ApiError::NotFound(
            "No active subscription for this user".to_string(),
        ));
    }

    info!(
        admin_id = %admin.id,
        user_id = %user_id,
        expiry_date = %request.expiry_date,
        is_active = request.is_active,
        "Subscription updated"
    );
    Ok(Json(OkResponse { ok: true }))
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<AdminUsersResponse>, ApiError> {
    let users = UserRepository::new(state.pool.clone())
        .list_members()
        .await?
        .into_iter()
        .map(AdminUserItem::from)
        .collect();

    Ok(Json(AdminUsersResponse { users }))
}

/// DELETE /api/admin/users/:id
///
/// Permanently removes a member and everything they own. Typically used to
/// act on an account in `pending_deletion`; admin accounts cannot be
/// removed this way.
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<OkResponse>, ApiError> {
    let deleted = UserRepository::new(state.pool.clone())
        .delete_member(user_id)
        .await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(admin_id = %admin.id, user_id = %user_id, "Member account deleted");
    Ok(Json(OkResponse { ok: true }))
}

/// GET /api/admin/content
pub async fn list_content(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<AdminContentResponse>, ApiError> {
    let content = ContentRepository::new(state.pool.clone())
        .list_all()
        .await?
        .into_iter()
        .map(Content::from)
        .collect();

    Ok(Json(AdminContentResponse { content }))
}

/// POST /api/admin/content
pub async fn create_content(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateContentRequest>,
) -> Result<Json<CreateContentResponse>, ApiError> {
    request.validate()?;

    let description = shared::validation::trim_optional(request.description.as_deref());
    let entity = ContentRepository::new(state.pool.clone())
        .create(NewContent {
            title: request.title.trim(),
            description: description.as_deref(),
            category: request.category.trim(),
            thumbnail_path: request.thumbnail_path.as_deref(),
            video_1080_path: request.video_1080_path.as_deref(),
            video_4k_path: request.video_4k_path.as_deref(),
        })
        .await?;

    info!(admin_id = %admin.id, content_id = %entity.id, "Content created");
    Ok(Json(CreateContentResponse { id: entity.id }))
}

/// PUT /api/admin/content/:id
///
/// Fields left out of the body keep their value.
pub async fn update_content(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(content_id): Path<Uuid>,
    Json(request): Json<UpdateContentRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    request.check().map_err(ApiError::Validation)?;

    let changes = ContentChanges {
        title: request.title.as_deref().map(str::trim),
        description: request.description.as_deref(),
        category: request.category.as_deref().map(str::trim),
        thumbnail_path: request.thumbnail_path.as_deref(),
        video_1080_path: request.video_1080_path.as_deref(),
        video_4k_path: request.video_4k_path.as_deref(),
    };
    ContentRepository::new(state.pool.clone())
        .update(content_id, changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("Content not found".to_string()))?;

    if !request.is_empty() {
        info!(admin_id = %admin.id, content_id = %content_id, "Content updated");
    }
    Ok(Json(OkResponse { ok: true }))
}

/// DELETE /api/admin/content/:id
pub async fn delete_content(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(content_id): Path<Uuid>,
) -> Result<Json<OkResponse>, ApiError> {
    let deleted = ContentRepository::new(state.pool.clone())
        .delete(content_id)
        .await?;
    if deleted > 0 {
        info!(admin_id = %admin.id, content_id = %content_id, "Content deleted");
    }
    Ok(Json(OkResponse { ok: true }))
}

/// GET /api/admin/logins
pub async fn list_logins(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<LoginHistoryResponse>, ApiError> {
    let logins = UserRepository::new(state.pool.clone())
        .list_logins(LOGIN_HISTORY_LIMIT)
        .await?
        .into_iter()
        .map(LoginHistoryItem::from)
        .collect();

    Ok(Json(LoginHistoryResponse { logins }))
}
