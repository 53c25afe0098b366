use chrono::{DateTime, Utc};
use db::models::usage::Usage;
use common::{
    misc::SubscriptionStatus,
    plan::{FeatureSet, PlanId, PlanInfo},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub price_id: String,
}

#[derive(Debug, Serialize)]
pub struct SessionUrlResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionPlansResponse {
    pub plans: Vec<PlanInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSubscriptionResponse {
    pub plan: PlanId,
    pub status: SubscriptionStatus,
    pub features: &'static FeatureSet,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub has_billing_account: bool,
    pub usage: Usage,
}
