//! Session authentication extractors.
//!
//! The session token is read from the `token` cookie, falling back to an
//! `Authorization: Bearer` header. The account is loaded on every request so
//! role and status changes take effect without waiting for token expiry.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use domain::models::User;
use persistence::repositories::UserRepository;
use shared::jwt::extract_user_id;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::cookies::extract_session_token;

/// Session token from the cookie or the Bearer header.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    extract_session_token(headers).or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    })
}

/// An authenticated account in good standing.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = session_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        let claims = state
            .jwt
            .validate_token(token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;
        let user_id = extract_user_id(&claims)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        let user = UserRepository::new(state.pool.clone())
            .find_by_id(user_id)
            .await?
            .map(User::from)
            .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

        if !user.is_active() {
            return Err(ApiError::Forbidden("Account pending deletion".to_string()));
        }

        let auth = AuthUser(user);
        parts.extensions.insert(auth.clone());
        Ok(auth)
    }
}

/// An authenticated administrator.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }
        Ok(AdminUser(user))
    }
}
