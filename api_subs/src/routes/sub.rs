use std::sync::Arc;

use actix_web::{Responder, get, web};
use common::{
    error::{AppError, Res},
    http::Success,
    jwt::JwtClaims,
    plan::PlanId,
};
use sqlx::PgPool;

use crate::dtos::sub::{SubscriptionPlansResponse, UserSubscriptionResponse};

/// Lists the plan catalogue with the limits of every tier.
///
/// # Output
/// - Success: Returns a JSON object containing the four plans
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/sub/plans');
///
/// if (response.ok) {
///   const data = await response.json();
///   // {
///   //   plans: [
///   //     {
///   //       id: "FREE",
///   //       name: "Free",
///   //       description: "For personal use",
///   //       price: 0,
///   //       features: { gscRequestsPerDay: 10, indexNowRequestsPerDay: 50, ... }
///   //     },
///   //     ...
///   //   ]
///   // }
/// }
/// ```
#[get("/plans")]
pub async fn get_plans() -> Res<impl Responder> {
    Success::ok(SubscriptionPlansResponse {
        plans: PlanId::ALL.iter().map(|plan| plan.info()).collect(),
    })
}

/// Returns the signed-in user's plan, billing status, limits and today's usage.
///
/// # Input
/// - `claims`: JWT claims of the authenticated user
/// - `pool`: Database pool
///
/// # Output
/// - Success: `{ plan, status, features, currentPeriodStart, currentPeriodEnd, hasBillingAccount, usage }`
/// - Error: Returns 404 Not Found if the user has no subscription record
#[get("/subscription")]
pub async fn get_subscription(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let sub = db::subscription::get_subscription_by_user_id(&***pool, claims.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))?;
    let usage = db::usage::load_or_create(&pool, claims.user_id).await?;

    Success::ok(UserSubscriptionResponse {
        plan: sub.plan,
        status: sub.status,
        features: sub.plan.features(),
        current_period_start: sub.current_period_start,
        current_period_end: sub.current_period_end,
        has_billing_account: sub.stripe_customer_id.is_some(),
        usage,
    })
}
