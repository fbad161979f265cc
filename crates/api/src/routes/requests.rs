//! Member movie request endpoints.

use axum::{extract::State, Json};
use chrono::Utc;
use domain::models::{
    CreateMovieRequestRequest, LimitStatusResponse, MovieRequest, MovieRequestItem,
    MyMovieRequestsResponse, SubmitMovieRequestResponse,
};
use persistence::repositories::MovieRequestRepository;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::services::requests::{MovieRequestService, RequestError};

fn request_service(state: &AppState) -> MovieRequestService {
    MovieRequestService::new(
        state.pool.clone(),
        state.settings.clone(),
        &state.config.email.operator_email,
    )
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::QuotaExceeded(snapshot) => ApiError::QuotaExceeded {
                count: snapshot.count,
                limit: snapshot.limit,
                next_available_at: snapshot.next_available_at,
            },
            RequestError::Settings(e) => ApiError::Internal(e.to_string()),
            RequestError::Database(e) => ApiError::from(e),
        }
    }
}

/// Current quota state for the caller. Read-only.
///
/// GET /api/requests/limit-status
pub async fn limit_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<LimitStatusResponse>, ApiError> {
    let snapshot = request_service(&state)
        .limit_status(user.id, Utc::now())
        .await?;
    Ok(Json(snapshot.into()))
}

/// Submit a movie request.
///
/// POST /api/requests
pub async fn create_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateMovieRequestRequest>,
) -> Result<Json<SubmitMovieRequestResponse>, ApiError> {
    request.validate()?;

    let title = request
        .normalized_title()
        .ok_or_else(|| ApiError::Validation("Title is required".to_string()))?;
    let message = request.normalized_message();

    let submission = request_service(&state)
        .submit(&user, &title, message.as_deref(), Utc::now())
        .await?;

    let snapshot = submission.snapshot;
    Ok(Json(SubmitMovieRequestResponse {
        ok: true,
        count: snapshot.count,
        limit: snapshot.limit,
        next_available_at: snapshot.next_available_at,
    }))
}

/// The caller's requests, newest first.
///
/// GET /api/requests/my
pub async fn my_requests(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<MyMovieRequestsResponse>, ApiError> {
    let requests = MovieRequestRepository::new(state.pool.clone())
        .list_for_user(user.id)
        .await?
        .into_iter()
        .map(|entity| MovieRequestItem::from(MovieRequest::from(entity)))
        .collect();

    Ok(Json(MyMovieRequestsResponse { requests }))
}
