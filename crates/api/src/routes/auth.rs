//! Authentication routes: registration, login, account recovery, logout and
//! the current user.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use domain::models::UserProfile;
use persistence::repositories::LoginContext;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationError};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ClientInfo};
use crate::services::auth::{AuthError, AuthResult, AuthService};

fn validate_email_address(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Email is required".into());
        return Err(err);
    }
    if !email.trim().validate_email() {
        let mut err = ValidationError::new("email");
        err.message = Some("Invalid email format".into());
        return Err(err);
    }
    Ok(())
}

fn validate_full_name(full_name: &str) -> Result<(), ValidationError> {
    if full_name.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Full name is required".into());
        return Err(err);
    }
    if full_name.trim().chars().count() > 100 {
        let mut err = ValidationError::new("length");
        err.message = Some("Full name must be at most 100 characters".into());
        return Err(err);
    }
    Ok(())
}

/// Request body for member registration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_email_address"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[serde(default)]
    #[validate(custom(function = "validate_full_name"))]
    pub full_name: String,
}

/// Request body for member and admin login.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request body for `POST /api/auth/forgot-password` and
/// `POST /api/auth/request-otp`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmailOnlyRequest {
    #[serde(default, deserialize_with = "shared::validation::null_as_empty")]
    #[validate(custom(
        function = "shared::validation::validate_not_blank",
        message = "Email required"
    ))]
    pub email: String,
}

fn validate_code_fields(request: &VerifyOtpRequest) -> Result<(), ValidationError> {
    if request.email.trim().is_empty() || request.otp.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Email and code required".into());
        return Err(err);
    }
    Ok(())
}

/// Request body for `POST /api/auth/verify-otp`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_code_fields"))]
pub struct VerifyOtpRequest {
    #[serde(default, deserialize_with = "shared::validation::null_as_empty")]
    pub email: String,

    #[serde(default, deserialize_with = "shared::validation::null_as_empty")]
    pub otp: String,
}

fn validate_reset_fields(request: &ResetPasswordRequest) -> Result<(), ValidationError> {
    if request.token.trim().is_empty() || request.password.is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Token and password required".into());
        return Err(err);
    }
    Ok(())
}

/// Request body for `POST /api/auth/reset-password`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_reset_fields"))]
pub struct ResetPasswordRequest {
    #[serde(default, deserialize_with = "shared::validation::null_as_empty")]
    pub token: String,

    #[serde(default, deserialize_with = "shared::validation::null_as_empty")]
    pub password: String,
}

/// Response body for register and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

/// Response body for `GET /api/auth/me`.
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

fn auth_service(state: &AppState) -> Result<AuthService, ApiError> {
    AuthService::new(
        state.pool.clone(),
        &state.config.jwt,
        &state.config.email,
    )
    .map_err(|e| ApiError::Internal(format!("Failed to initialize auth service: {}", e)))
}

fn map_auth_error(err: AuthError) -> ApiError {
    match err {
        AuthError::EmailAlreadyExists => ApiError::Conflict("Email already registered".to_string()),
        AuthError::WeakPassword(msg) => ApiError::Validation(msg),
        AuthError::InvalidCredentials => ApiError::Unauthorized("Invalid credentials".to_string()),
        AuthError::NotAdmin => ApiError::Forbidden("Admin access required".to_string()),
        AuthError::InvalidResetToken => {
            ApiError::Validation("Invalid or expired token".to_string())
        }
        AuthError::InvalidLoginCode => ApiError::Validation("Invalid or expired code".to_string()),
        AuthError::DatabaseError(db_err) => ApiError::from(db_err),
        AuthError::PasswordError(e) => ApiError::Internal(format!("Password error: {}", e)),
        AuthError::TokenError(e) => ApiError::Internal(format!("Token error: {}", e)),
    }
}

fn session_response(state: &AppState, result: AuthResult) -> (HeaderMap, Json<AuthResponse>) {
    let mut headers = HeaderMap::new();
    state.cookies.add_session_cookie(&mut headers, &result.token);
    let body = AuthResponse {
        user: UserProfile::from(&result.user),
        token: result.token,
    };
    (headers, Json(body))
}

/// Register a new member.
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), ApiError> {
    request.validate()?;

    let result = auth_service(&state)?
        .register(&request.email, &request.password, &request.full_name)
        .await
        .map_err(map_auth_error)?;

    let (headers, body) = session_response(&state, result);
    Ok((StatusCode::CREATED, headers, body))
}

/// Member login.
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(request): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    request.validate()?;

    let context = LoginContext {
        ip: client.ip.as_deref(),
        user_agent: client.user_agent.as_deref(),
    };
    let result = auth_service(&state)?
        .login(&request.email, &request.password, context)
        .await
        .map_err(map_auth_error)?;

    Ok(session_response(&state, result))
}

/// Administrator login.
///
/// POST /api/auth/admin-login
pub async fn admin_login(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(request): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    request.validate()?;

    let context = LoginContext {
        ip: client.ip.as_deref(),
        user_agent: client.user_agent.as_deref(),
    };
    let result = auth_service(&state)?
        .admin_login(&request.email, &request.password, context)
        .await
        .map_err(map_auth_error)?;

    Ok(session_response(&state, result))
}

/// Email a password reset link. Always succeeds for a non-blank email.
///
/// POST /api/auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<EmailOnlyRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    request.validate()?;

    auth_service(&state)?
        .forgot_password(&request.email)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(OkResponse { ok: true }))
}

/// Set a new password with a reset token.
///
/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    request.validate()?;

    auth_service(&state)?
        .reset_password(&request.token, &request.password)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(OkResponse { ok: true }))
}

/// Email a one-time login code. Always succeeds for a non-blank email.
///
/// POST /api/auth/request-otp
pub async fn request_otp(
    State(state): State<AppState>,
    Json(request): Json<EmailOnlyRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    request.validate()?;

    auth_service(&state)?
        .request_login_code(&request.email)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(OkResponse { ok: true }))
}

/// Sign in with an emailed login code.
///
/// POST /api/auth/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    request.validate()?;

    let context = LoginContext {
        ip: client.ip.as_deref(),
        user_agent: client.user_agent.as_deref(),
    };
    let result = auth_service(&state)?
        .verify_login_code(&request.email, &request.otp, context)
        .await
        .map_err(map_auth_error)?;

    Ok(session_response(&state, result))
}

/// Clear the session cookie.
///
/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>) -> (HeaderMap, Json<OkResponse>) {
    let mut headers = HeaderMap::new();
    state.cookies.add_clear_cookie(&mut headers);
    (headers, Json(OkResponse { ok: true }))
}

/// Current account.
///
/// GET /api/auth/me
pub async fn me(AuthUser(user): AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: UserProfile::from(&user),
    })
}
