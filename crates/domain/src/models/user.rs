//! Member account domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::subscription::SubscriptionSummary;

/// Role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    PendingDeletion,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::PendingDeletion => "pending_deletion",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(AccountStatus::Active),
            "pending_deletion" => Ok(AccountStatus::PendingDeletion),
            _ => Err(format!("Invalid account status: {}", s)),
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A member or administrator account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub telegram_username: Option<String>,
    pub favorite_genre: Option<String>,
    pub role: UserRole,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// Public view of an account, returned by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub telegram_username: Option<String>,
    pub favorite_genre: Option<String>,
    pub role: UserRole,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            telegram_username: user.telegram_username.clone(),
            favorite_genre: user.favorite_genre.clone(),
            role: user.role,
            status: user.status,
            created_at: user.created_at,
        }
    }
}

/// A login event on the admin activity board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginHistoryItem {
    pub id: i64,
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response of `GET /api/admin/logins`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginHistoryResponse {
    pub logins: Vec<LoginHistoryItem>,
}

/// A member row on the admin user board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserItem {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub request_count: i64,
    pub subscription: Option<SubscriptionSummary>,
}

/// Response of `GET /api/admin/users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUsersResponse {
    pub users: Vec<AdminUserItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: SafeEmail().fake(),
            password_hash: "$argon2id$v=19$stub".to_string(),
            full_name: "Ada Member".to_string(),
            telegram_username: None,
            favorite_genre: None,
            role: UserRole::User,
            status: AccountStatus::Active,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_role_round_trip_strings() {
        assert_eq!(UserRole::from_str("ADMIN").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::User.to_string(), "user");
        assert!(UserRole::from_str("owner").is_err());
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(
            AccountStatus::from_str("pending_deletion").unwrap(),
            AccountStatus::PendingDeletion
        );
        assert_eq!(AccountStatus::PendingDeletion.as_str(), "pending_deletion");
        assert!(AccountStatus::from_str("banned").is_err());
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["fullName"], "Ada Member");
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn test_helpers() {
        let mut user = sample_user();
        assert!(!user.is_admin());
        assert!(user.is_active());
        user.role = UserRole::Admin;
        user.status = AccountStatus::PendingDeletion;
        assert!(user.is_admin());
        assert!(!user.is_active());
    }

    #[test]
    fn test_profile_from_user() {
        let user = sample_user();
        let profile = UserProfile::from(&user);
        assert_eq!(profile.id, user.id);
        assert_eq!(profile.email, user.email);
    }
}
