//! Subscription plan and lifecycle models.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

/// Shortest purchasable term.
pub const MIN_SUBSCRIPTION_MONTHS: u32 = 1;

/// Longest purchasable term.
pub const MAX_SUBSCRIPTION_MONTHS: u32 = 12;

/// Days before expiry at which members get a renewal reminder.
pub const EXPIRY_WARNING_DAYS: i64 = 3;

/// A purchasable plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub price: u32,
    pub name: String,
}

impl Plan {
    /// Catalog of plans on offer, keyed by plan name.
    pub fn catalog() -> BTreeMap<String, Plan> {
        let mut plans = BTreeMap::new();
        plans.insert(
            "Basic".to_string(),
            Plan {
                price: 10,
                name: "Basic".to_string(),
            },
        );
        plans
    }

    pub fn find(name: &str) -> Option<Plan> {
        Self::catalog().remove(name)
    }
}

/// Expiry date of a subscription starting on `start` and lasting `months`.
///
/// Month arithmetic clamps to the last day of shorter months
/// (Jan 31 + 1 month is Feb 28 or 29).
pub fn expiry_date_for(start: NaiveDate, months: u32) -> Option<NaiveDate> {
    start.checked_add_months(Months::new(months))
}

/// A subscription period belonging to a member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Whole days until expiry, never negative.
    pub fn remaining_days(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days().max(0)
    }
}

/// Response of `GET /api/payment/plans`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlansResponse {
    pub plans: BTreeMap<String, Plan>,
}

/// Body of `POST /api/payment/subscribe`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    #[validate(length(min = 1, message = "Plan is required"))]
    pub plan: String,

    #[validate(range(min = 1, max = 12, message = "Months must be 1-12"))]
    pub months: u32,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub full_name: String,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub telegram_username: String,
}

/// Subscription period as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSummary {
    pub plan: String,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

/// Response of `POST /api/payment/subscribe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeResponse {
    pub ok: bool,
    pub subscription: SubscriptionSummary,
    pub message: String,
}

/// Body of `POST /api/admin/subscriptions`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminGrantSubscriptionRequest {
    pub user_id: Uuid,

    #[validate(length(min = 1, message = "Plan is required"))]
    pub plan: String,

    #[validate(range(min = 1, max = 12, message = "Months must be 1-12"))]
    pub months: u32,
}

/// Body of `PUT /api/admin/subscriptions/:user_id`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateSubscriptionRequest {
    pub expiry_date: NaiveDate,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Active subscription row on the admin board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSubscriptionItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub plan: String,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

/// Response of `GET /api/admin/subscriptions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveSubscriptionsResponse {
    pub subscriptions: Vec<ActiveSubscriptionItem>,
}

/// Response of `GET /api/users/dashboard`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDashboardResponse {
    pub has_subscription: bool,
    pub plan: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub remaining_days: i64,
    pub full_name: Option<String>,
    pub telegram_username: Option<String>,
    pub favorite_genre: Option<String>,
    pub approved_requests: i64,
    pub rejected_requests: i64,
}
