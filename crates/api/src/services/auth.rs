//! Authentication service for registration, login, account recovery and
//! session tokens.

use chrono::{Duration, Utc};
use domain::models::{User, UserRole};
use domain::services::Notification;
use persistence::repositories::{
    AccountRecoveryRepository, LoginContext, NewUser, UserRepository,
};
use shared::crypto::{generate_otp, generate_secure_token, sha256_hex};
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{check_password_policy, hash_password, verify_password, PasswordError};
use shared::validation::normalize_email;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{EmailConfig, JwtAuthConfig};

/// Lifetime of a password reset link.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Lifetime of an email login code.
pub const LOGIN_CODE_TTL_MINUTES: i64 = 5;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("{0}")]
    WeakPassword(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Admin access required")]
    NotAdmin,

    #[error("Invalid or expired token")]
    InvalidResetToken,

    #[error("Invalid or expired code")]
    InvalidLoginCode,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Result of a successful authentication.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub user: User,
    pub token: String,
}

/// Authentication service.
pub struct AuthService {
    users: UserRepository,
    recovery: AccountRecoveryRepository,
    jwt: JwtConfig,
    email: EmailConfig,
}

impl AuthService {
    pub fn new(
        pool: PgPool,
        jwt_config: &JwtAuthConfig,
        email: &EmailConfig,
    ) -> Result<Self, AuthError> {
        let jwt = JwtConfig::with_leeway(
            &jwt_config.secret,
            jwt_config.token_expiry_secs(),
            jwt_config.leeway_secs,
        )?;

        Ok(Self {
            users: UserRepository::new(pool.clone()),
            recovery: AccountRecoveryRepository::new(pool),
            jwt,
            email: email.clone(),
        })
    }

    /// Register a new member account.
    ///
    /// The operator signup notice is queued in the same transaction as the
    /// insert.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<AuthResult, AuthError> {
        check_password_policy(password).map_err(|e| AuthError::WeakPassword(e.to_string()))?;

        let email = normalize_email(email);
        let full_name = full_name.trim();

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(password)?;
        let notification =
            Notification::member_signup(&self.email.operator_email, &email, full_name);

        let created = self
            .users
            .create_user(
                NewUser {
                    email: &email,
                    password_hash: &password_hash,
                    full_name,
                    role: UserRole::User,
                },
                Some(&notification),
            )
            .await;

        // Concurrent registration with the same email.
        let entity = match created {
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
                return Err(AuthError::EmailAlreadyExists);
            }
            other => other?,
        };

        let user = User::from(entity);
        let (token, _) = self.jwt.generate_token(user.id)?;

        info!(user_id = %user.id, "Member registered");
        Ok(AuthResult { user, token })
    }

    /// Login with email and password.
    ///
    /// Records the login in the history and stamps `last_login_at`.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        context: LoginContext<'_>,
    ) -> Result<AuthResult, AuthError> {
        let entity = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &entity.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        self.users.record_login(&entity, now, context).await?;

        let mut user = User::from(entity);
        user.last_login_at = Some(now);
        let (token, _) = self.jwt.generate_token(user.id)?;

        info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok(AuthResult { user, token })
    }

    /// Login restricted to administrator accounts.
    ///
    /// The password is verified first so the role is never disclosed for
    /// bad credentials.
    pub async fn admin_login(
        &self,
        email: &str,
        password: &str,
        context: LoginContext<'_>,
    ) -> Result<AuthResult, AuthError> {
        let entity = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &entity.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        let mut user = User::from(entity.clone());
        if !user.is_admin() {
            return Err(AuthError::NotAdmin);
        }

        let now = Utc::now();
        self.users.record_login(&entity, now, context).await?;
        user.last_login_at = Some(now);
        let (token, _) = self.jwt.generate_token(user.id)?;

        info!(user_id = %user.id, "Admin logged in");
        Ok(AuthResult { user, token })
    }

    /// Emails a single-use reset link to the account, if it exists.
    ///
    /// Unknown addresses succeed silently so the endpoint does not reveal which
    /// addresses have accounts. Earlier links for the account stop working.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let Some(entity) = self.users.find_by_email(&normalize_email(email)).await? else {
            debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = generate_secure_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        let notification = Notification::password_reset(
            &entity.email,
            &self.email.reset_link(&token),
            RESET_TOKEN_TTL_MINUTES,
        );

        self.recovery
            .issue_password_reset(entity.id, &sha256_hex(&token), expires_at, &notification)
            .await?;

        info!(user_id = %entity.id, "Password reset issued");
        Ok(())
    }

    /// Sets a new password using a reset token. The token is consumed.
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), AuthError> {
        check_password_policy(password).map_err(|e| AuthError::WeakPassword(e.to_string()))?;

        let password_hash = hash_password(password)?;
        let user_id = self
            .recovery
            .consume_password_reset(&sha256_hex(token.trim()), &password_hash, Utc::now())
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        info!(user_id = %user_id, "Password reset completed");
        Ok(())
    }

    /// Emails a six digit login code to the account, if it exists.
    ///
    /// Like `forgot_password`, unknown addresses succeed silently.
    pub async fn request_login_code(&self, email: &str) -> Result<(), AuthError> {
        let Some(entity) = self.users.find_by_email(&normalize_email(email)).await? else {
            debug!("Login code requested for unknown email");
            return Ok(());
        };

        let code = generate_otp();
        let expires_at = Utc::now() + Duration::minutes(LOGIN_CODE_TTL_MINUTES);
        let notification =
            Notification::login_code(&entity.email, &code, LOGIN_CODE_TTL_MINUTES);

        self.recovery
            .issue_login_code(entity.id, &sha256_hex(&code), expires_at, &notification)
            .await?;

        info!(user_id = %entity.id, "Login code issued");
        Ok(())
    }

    /// Signs in with an emailed login code. The code is consumed and the
    /// login recorded like a password login.
    pub async fn verify_login_code(
        &self,
        email: &str,
        code: &str,
        context: LoginContext<'_>,
    ) -> Result<AuthResult, AuthError> {
        let entity = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidLoginCode)?;

        let now = Utc::now();
        if !self
            .recovery
            .consume_login_code(entity.id, &sha256_hex(code.trim()), now)
            .await?
        {
            return Err(AuthError::InvalidLoginCode);
        }

        self.users.record_login(&entity, now, context).await?;

        let mut user = User::from(entity);
        user.last_login_at = Some(now);
        let (token, _) = self.jwt.generate_token(user.id)?;

        info!(user_id = %user.id, role = %user.role, "User logged in with email code");
        Ok(AuthResult { user, token })
    }
}
