//! Plan catalog and self-service checkout.
//!
//! There is no payment processor behind checkout: a valid submission
//! activates the subscription immediately.

use axum::{extract::State, Json};
use chrono::{NaiveDate, Utc};
use domain::models::{
    expiry_date_for, Plan, PlansResponse, SubscribeRequest, SubscribeResponse, SubscriptionSummary,
    User, UserRole,
};
use domain::services::Notification;
use persistence::repositories::{CheckoutProfile, NewSubscription, SubscriptionRepository};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;

const CHECKOUT_MESSAGE: &str = "Payment successful! Your subscription is now active.";

/// Plans on offer.
///
/// GET /api/payment/plans
pub async fn plans() -> Json<PlansResponse> {
    Json(PlansResponse {
        plans: Plan::catalog(),
    })
}

/// Buy a plan for 1 to 12 months.
///
/// POST /api/payment/subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<SubscribeRequest>,
) -> Result<Json<SubscribeResponse>, ApiError> {
    if user.role != UserRole::User {
        return Err(ApiError::Forbidden("Members only".to_string()));
    }
    let checkout = Checkout::prepare(&request, Utc::now().date_naive())?;

    let notifications = [
        Notification::subscription_activated(
            &user.email,
            &checkout.plan.name,
            checkout.start_date,
            checkout.expiry_date,
        ),
        Notification::subscription_purchased(
            &state.config.email.operator_email,
            &user.email,
            &checkout.plan.name,
            request.months,
            checkout.expiry_date,
        ),
    ];

    let profile = CheckoutProfile {
        full_name: request.full_name.trim(),
        telegram_username: request.telegram_username.trim(),
    };
    let entity = SubscriptionRepository::new(state.pool.clone())
        .activate(&checkout.new_subscription(&user), Some(profile), &notifications)
        .await?;

    info!(
        user_id = %user.id,
        plan = %entity.plan,
        months = request.months,
        expiry_date = %entity.expiry_date,
        "Subscription purchased"
    );

    Ok(Json(SubscribeResponse {
        ok: true,
        subscription: SubscriptionSummary {
            plan: entity.plan,
            start_date: entity.start_date,
            expiry_date: entity.expiry_date,
        },
        message: CHECKOUT_MESSAGE.to_string(),
    }))
}

/// A validated checkout with its computed period.
#[derive(Debug)]
struct Checkout {
    plan: Plan,
    start_date: NaiveDate,
    expiry_date: NaiveDate,
}

impl Checkout {
    fn prepare(request: &SubscribeRequest, today: NaiveDate) -> Result<Self, ApiError> {
        if request.validate().is_err() {
            return Err(checkout_error(request));
        }
        let plan = Plan::find(request.plan.trim())
            .ok_or_else(|| ApiError::Validation("Invalid plan".to_string()))?;
        let expiry_date = expiry_date_for(today, request.months)
            .ok_or_else(|| ApiError::Validation("Months must be 1-12".to_string()))?;

        Ok(Self {
            plan,
            start_date: today,
            expiry_date,
        })
    }

    fn new_subscription<'a>(&'a self, user: &User) -> NewSubscription<'a> {
        NewSubscription {
            user_id: user.id,
            plan: &self.plan.name,
            start_date: self.start_date,
            expiry_date: self.expiry_date,
        }
    }
}

fn checkout_error(request: &SubscribeRequest) -> ApiError {
    let message = if request.plan.trim().is_empty() {
        "Invalid plan"
    } else if !(1..=12).contains(&request.months) {
        "Months must be 1-12"
    } else {
        "Full name and Telegram username required"
    };
    ApiError::Validation(message.to_string())
}
