use chrono::{DateTime, Utc};
use common::{env_config::StripePrices, misc::SubscriptionStatus, plan::PlanId};

/// Maps a Stripe price id to the plan it sells.
///
/// An unknown price still belongs to a paying customer, so it falls back to
/// the cheapest paid plan instead of FREE.
pub fn plan_for_price(prices: &StripePrices, price_id: &str) -> PlanId {
    let matches = |configured: &Option<String>| configured.as_deref() == Some(price_id);

    if matches(&prices.agency) {
        PlanId::Agency
    } else if matches(&prices.pro) {
        PlanId::Pro
    } else if matches(&prices.starter) {
        PlanId::Starter
    } else {
        log::warn!("Unknown Stripe price id {}, assuming STARTER", price_id);
        PlanId::Starter
    }
}

/// Price id configured for a plan, if it is sold through Stripe.
pub fn price_for_plan(prices: &StripePrices, plan: PlanId) -> Option<&str> {
    match plan {
        PlanId::Free => None,
        PlanId::Starter => prices.starter.as_deref(),
        PlanId::Pro => prices.pro.as_deref(),
        PlanId::Agency => prices.agency.as_deref(),
    }
}

pub fn map_status(status: stripe::SubscriptionStatus) -> SubscriptionStatus {
    match status {
        stripe::SubscriptionStatus::Active => SubscriptionStatus::Active,
        stripe::SubscriptionStatus::Trialing => SubscriptionStatus::Trialing,
        stripe::SubscriptionStatus::PastDue | stripe::SubscriptionStatus::Unpaid => {
            SubscriptionStatus::PastDue
        }
        stripe::SubscriptionStatus::Canceled | stripe::SubscriptionStatus::IncompleteExpired => {
            SubscriptionStatus::Canceled
        }
        _ => SubscriptionStatus::Inactive,
    }
}

/// A subscription Stripe reports as finished drops back to FREE, whichever
/// event carried the status.
pub fn ends_subscription(status: stripe::SubscriptionStatus) -> bool {
    map_status(status) == SubscriptionStatus::Canceled
}

/// Stripe timestamps are unix seconds.
pub fn to_datetime(timestamp: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp, 0)
}
