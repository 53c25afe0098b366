use chrono::{DateTime, Utc};
use common::{misc::SubscriptionStatus, plan::PlanId};
use uuid::Uuid;

/// State written when a checkout completes.
pub struct SubscriptionActivation {
    pub user_id: Uuid,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: String,
    pub stripe_price_id: Option<String>,
    pub plan: PlanId,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
}

/// State pushed by `customer.subscription.updated`.
pub struct SubscriptionUpdate {
    pub stripe_subscription_id: String,
    pub stripe_price_id: Option<String>,
    pub plan: PlanId,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
}
