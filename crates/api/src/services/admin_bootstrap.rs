//! Admin bootstrap on startup.
//!
//! When `admin.email` and `admin.password` are configured, the account is
//! created as an active admin, or an existing account with that email is
//! promoted and its password reset. Running it on every boot keeps the
//! configured credentials authoritative.

use shared::password::{hash_password, PasswordError};
use shared::validation::normalize_email;
use sqlx::PgPool;
use tracing::{info, warn};

use persistence::repositories::UserRepository;

use crate::config::AdminBootstrapConfig;

/// Error types for admin bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),
}

/// Ensure the configured admin account exists with the configured password.
///
/// Returns `false` when bootstrap is not configured.
pub async fn bootstrap_admin(
    pool: &PgPool,
    config: &AdminBootstrapConfig,
) -> Result<bool, BootstrapError> {
    if config.email.trim().is_empty() {
        return Ok(false);
    }

    if !config.is_configured() {
        warn!("CP__ADMIN__EMAIL is set but CP__ADMIN__PASSWORD is empty - skipping bootstrap");
        return Ok(false);
    }

    let email = normalize_email(&config.email);
    let password_hash = hash_password(&config.password)?;

    let admin = UserRepository::new(pool.clone())
        .upsert_admin(&email, &password_hash, config.full_name.trim())
        .await?;

    info!(
        email = %admin.email,
        user_id = %admin.id,
        "Admin account ensured"
    );

    Ok(true)
}
